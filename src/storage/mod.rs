//! Storage contracts and backends for dictionary data.
//!
//! The resolver only ever sees the [`Storage`] trait: exact lookup by
//! term, two-step alternate resolution, and the two bulk listings the
//! startup cache consumes. [`SqliteStorage`] is the production backend;
//! [`MemoryStorage`] backs tests.

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::dictionary::Dictionary;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no database configured for dictionary '{0}'")]
    UnknownDictionary(Dictionary),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One definition entry: the canonical headword and its stored HTML
/// article. The body is opaque to the core; only the web layer rewrites
/// links inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Definition {
    pub id: i64,
    pub term: String,
    #[sqlx(rename = "definition")]
    pub body: String,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Exact, case-insensitive match against canonical terms.
    async fn find_by_term(&self, dict: Dictionary, term: &str) -> Result<Vec<Definition>>;

    /// Entry ids reachable via an alternate surface form (exact match).
    async fn find_by_alternate(&self, dict: Dictionary, alt: &str) -> Result<Vec<i64>>;

    /// Definitions for a batch of entry ids, in id order.
    async fn find_by_ids(&self, dict: Dictionary, ids: &[i64]) -> Result<Vec<Definition>>;

    /// All distinct canonical terms. Used once, by the cache build.
    async fn list_terms(&self, dict: Dictionary) -> Result<Vec<String>>;

    /// All (alternate term, entry id) pairs. Used once, by the cache build.
    async fn list_alternates(&self, dict: Dictionary) -> Result<Vec<(String, i64)>>;
}
