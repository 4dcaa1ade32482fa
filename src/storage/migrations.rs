//! Dictionary database schema creation and versioned migrations.
//!
//! Production dictionary files ship prebuilt; this module exists for the
//! tooling that assembles new dictionary files and for tests that build
//! databases from scratch.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::{info, warn};

/// Current database schema version.
const SCHEMA_VERSION: i32 = 1;

const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS entry (
    id INTEGER PRIMARY KEY,
    term TEXT NOT NULL,
    definition TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entry_term ON entry(term);
CREATE TABLE IF NOT EXISTS alt (
    term TEXT NOT NULL,
    entry_id INTEGER NOT NULL REFERENCES entry(id)
);
CREATE INDEX IF NOT EXISTS idx_alt_term ON alt(term)
"#;

/// Run all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current = current_version(pool).await?;
    for version in (current + 1)..=SCHEMA_VERSION {
        run_migration(pool, version).await?;
    }
    Ok(())
}

async fn current_version(pool: &SqlitePool) -> Result<i32, sqlx::Error> {
    let row = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await?;
    Ok(row
        .and_then(|r| r.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let (name, sql) = match version {
        1 => ("initial_schema", MIGRATION_V1),
        other => {
            warn!(version = other, "No migration registered for version");
            return Ok(());
        }
    };

    info!(version, name, "Applying migration");
    for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?1, ?2)")
        .bind(version)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}
