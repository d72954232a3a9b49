//! SQLite-backed bookkeeping: assignments, their asset directories, students, submissions and
//! the per-scene runs of each submission.
//!
//! Every function takes the connection explicitly, so the same code runs against a
//! `DatabaseConnection` or inside a `DatabaseTransaction`.

pub mod asset_directory;
pub mod assignment;
pub mod migrations;
pub mod student;
pub mod submission;
pub mod test_run;

use log::debug;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;

use migrations::Migrator;

/// Opens (creating if needed) the database file at `path` and brings the schema up to date.
pub async fn connect(path: &Path) -> Result<DatabaseConnection, DbErr> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| DbErr::Custom(e.to_string()))?;
    }
    let url = format!("sqlite://{}?mode=rwc", path.display());
    debug!("connecting to {url}");
    let db = Database::connect(&url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A private in-memory store with the full schema.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
