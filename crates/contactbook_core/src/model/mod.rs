//! Domain model for the contact store.
//!
//! # Responsibility
//! - Define one record type per persisted table.
//! - Own field-level validation that must hold before any write.
//!
//! # Invariants
//! - Every record is identified by a non-nil v4 `Uuid`.
//! - Timestamps are Unix epoch milliseconds.
//! - Enum wire/storage values are SCREAMING_SNAKE_CASE.

pub mod activity;
pub mod contact;
pub mod email;
pub mod reminder;
pub mod tag;
pub mod user;

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unix epoch milliseconds.
pub type EpochMillis = i64;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("valid url regex"));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// Field-level validation failure shared by all models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Identifier field holds the nil UUID.
    NilId(&'static str),
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Email address does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// URL field is not an absolute http(s) URL.
    InvalidUrl { field: &'static str, value: String },
    /// Tag color is not a `#RRGGBB` hex string.
    InvalidColor(String),
    /// Engagement timestamp is earlier than the email send time.
    TimestampBeforeSent {
        field: &'static str,
        sent_at: EpochMillis,
        value: EpochMillis,
    },
    /// `completed` flag and `completed_at` disagree.
    CompletionMismatch { completed: bool },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(field) => write!(f, "{field} must not be the nil uuid"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::InvalidUrl { field, value } => {
                write!(f, "{field} must be an http(s) url, got `{value}`")
            }
            Self::InvalidColor(value) => write!(f, "color must be #RRGGBB, got `{value}`"),
            Self::TimestampBeforeSent {
                field,
                sent_at,
                value,
            } => write!(f, "{field} ({value}) must be >= sent_at ({sent_at})"),
            Self::CompletionMismatch { completed: true } => {
                write!(f, "completed reminder must carry completed_at")
            }
            Self::CompletionMismatch { completed: false } => {
                write!(f, "open reminder must not carry completed_at")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub type ValidationResult = Result<(), ModelValidationError>;

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EpochMillis)
        .unwrap_or(0)
}

pub(crate) fn ensure_id(field: &'static str, id: Uuid) -> ValidationResult {
    if id.is_nil() {
        return Err(ModelValidationError::NilId(field));
    }
    Ok(())
}

pub(crate) fn ensure_not_blank(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn ensure_email(value: &str) -> ValidationResult {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ModelValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}

pub(crate) fn ensure_http_url(field: &'static str, value: &str) -> ValidationResult {
    if !HTTP_URL_RE.is_match(value.trim()) {
        return Err(ModelValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_hex_color(value: &str) -> ValidationResult {
    if !HEX_COLOR_RE.is_match(value) {
        return Err(ModelValidationError::InvalidColor(value.to_string()));
    }
    Ok(())
}
