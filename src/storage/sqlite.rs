//! SQLite-backed dictionary storage, one database file per dictionary.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use super::{Definition, Result, Storage, StorageError};
use crate::core::dictionary::Dictionary;

pub struct SqliteStorage {
    pools: HashMap<Dictionary, SqlitePool>,
}

impl SqliteStorage {
    /// Open every dictionary database found under `data_dir`, read-only.
    /// Missing files are skipped; their dictionary stays unavailable.
    pub async fn open(data_dir: &Path, dictionaries: &[Dictionary]) -> Result<Self> {
        let mut pools = HashMap::new();
        for &dict in dictionaries {
            let path = data_dir.join(dict.db_file_name());
            if !path.exists() {
                warn!(dictionary = %dict, path = %path.display(), "Dictionary database missing");
                continue;
            }
            let options = SqliteConnectOptions::new()
                .filename(&path)
                .read_only(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(4)
                .connect_with(options)
                .await?;
            info!(dictionary = %dict, path = %path.display(), "Opened dictionary database");
            pools.insert(dict, pool);
        }
        Ok(Self { pools })
    }

    /// Wrap pre-opened pools. Used by tests and by dictionary build
    /// tooling, where the databases are writable.
    pub fn from_pools(pools: HashMap<Dictionary, SqlitePool>) -> Self {
        Self { pools }
    }

    /// Dictionaries with an opened database.
    pub fn available(&self) -> Vec<Dictionary> {
        Dictionary::ALL
            .into_iter()
            .filter(|d| self.pools.contains_key(d))
            .collect()
    }

    fn pool(&self, dict: Dictionary) -> Result<&SqlitePool> {
        self.pools
            .get(&dict)
            .ok_or(StorageError::UnknownDictionary(dict))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn find_by_term(&self, dict: Dictionary, term: &str) -> Result<Vec<Definition>> {
        let rows = sqlx::query_as::<_, Definition>(
            "SELECT id, term, definition FROM entry WHERE term = ?1 COLLATE NOCASE ORDER BY id",
        )
        .bind(term)
        .fetch_all(self.pool(dict)?)
        .await?;
        Ok(rows)
    }

    async fn find_by_alternate(&self, dict: Dictionary, alt: &str) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT entry_id FROM alt WHERE term = ?1 ORDER BY entry_id")
                .bind(alt)
                .fetch_all(self.pool(dict)?)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn find_by_ids(&self, dict: Dictionary, ids: &[i64]) -> Result<Vec<Definition>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder =
            sqlx::QueryBuilder::new("SELECT id, term, definition FROM entry WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        builder.push(" ORDER BY id");
        let rows = builder
            .build_query_as::<Definition>()
            .fetch_all(self.pool(dict)?)
            .await?;
        Ok(rows)
    }

    async fn list_terms(&self, dict: Dictionary) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT term FROM entry")
            .fetch_all(self.pool(dict)?)
            .await?;
        Ok(rows.into_iter().map(|(term,)| term).collect())
    }

    async fn list_alternates(&self, dict: Dictionary) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT term, entry_id FROM alt ORDER BY entry_id")
                .fetch_all(self.pool(dict)?)
                .await?;
        Ok(rows)
    }
}
