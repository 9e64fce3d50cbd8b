//! ContactBook command line entry point.
//!
//! # Responsibility
//! - Open (and migrate) a database file chosen by flag or environment.
//! - Expose maintenance commands: migrate, seed, stats, version.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contactbook_core::db::migrations::{current_user_version, latest_version};
use contactbook_core::repo::MAX_LIST_LIMIT;
use contactbook_core::{
    core_version, default_log_level, init_logging, open_db, seed_sample_data, ContactRepository,
    SqliteContactRepository, SqliteUserRepository, UserListQuery, UserRepository,
};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "contactbook", about = "ContactBook personal CRM storage tool")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "CONTACTBOOK_DB", default_value = "contactbook.db")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "CONTACTBOOK_LOG_LEVEL", default_value = default_log_level())]
    log_level: String,

    /// Directory for rolling log files; logging stays off when unset
    #[arg(long, env = "CONTACTBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or upgrade the schema
    Migrate,
    /// Load sample users, contacts and engagement history into an empty database
    Seed,
    /// Print per-user contact counts by priority
    Stats,
    /// Print the core version and supported schema version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = cli.log_dir.as_deref() {
        let dir = absolute_dir(dir)?;
        init_logging(&cli.log_level, &dir)
            .with_context(|| format!("failed to start logging in {}", dir.display()))?;
    }

    match cli.command {
        Command::Version => {
            println!("contactbook_core version={}", core_version());
            println!("schema version={}", latest_version());
        }
        Command::Migrate => {
            let conn = open(&cli.db)?;
            let version = current_user_version(&conn)?;
            println!("{}: schema version {version}", cli.db.display());
        }
        Command::Seed => {
            let conn = open(&cli.db)?;
            let summary = seed_sample_data(&conn).context("seeding failed")?;
            info!("event=cli_seed module=cli status=ok");
            println!(
                "seeded users={} contacts={} tags={} contact_tags={} emails={} activities={} reminders={}",
                summary.users,
                summary.contacts,
                summary.tags,
                summary.contact_tags,
                summary.emails,
                summary.activities,
                summary.reminders
            );
        }
        Command::Stats => {
            let conn = open(&cli.db)?;
            let users = SqliteUserRepository::try_new(&conn)?;
            let contacts = SqliteContactRepository::try_new(&conn)?;

            println!("users={}", users.count_users()?);
            let mut offset = 0;
            loop {
                let page = users.list_users(&UserListQuery {
                    limit: Some(MAX_LIST_LIMIT),
                    offset,
                })?;
                for user in &page {
                    let counts = contacts.count_by_priority(user.id)?;
                    let rendered = counts
                        .iter()
                        .map(|entry| format!("{}={}", entry.priority.as_str(), entry.count))
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("{} {rendered}", user.email);
                }
                if page.len() < MAX_LIST_LIMIT as usize {
                    break;
                }
                offset += MAX_LIST_LIMIT;
            }
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<Connection> {
    open_db(path).with_context(|| format!("failed to open database {}", path.display()))
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(dir))
}
