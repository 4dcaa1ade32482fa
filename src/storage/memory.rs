//! In-memory storage double with query counters.
//!
//! Backs unit and integration tests without a database file. The counters
//! let tests assert which storage queries a resolution actually issued,
//! which is how the cache's negative-filter behavior is verified.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{Definition, Result, Storage};
use crate::core::dictionary::Dictionary;

#[derive(Default)]
pub struct MemoryStorage {
    entries: HashMap<Dictionary, Vec<Definition>>,
    alternates: HashMap<Dictionary, Vec<(String, i64)>>,
    term_queries: AtomicUsize,
    alternate_queries: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entry(&mut self, dict: Dictionary, id: i64, term: &str, body: &str) {
        self.entries.entry(dict).or_default().push(Definition {
            id,
            term: term.to_string(),
            body: body.to_string(),
        });
    }

    pub fn insert_alternate(&mut self, dict: Dictionary, alt: &str, entry_id: i64) {
        self.alternates
            .entry(dict)
            .or_default()
            .push((alt.to_string(), entry_id));
    }

    /// Number of `find_by_term` calls served so far.
    pub fn term_queries(&self) -> usize {
        self.term_queries.load(Ordering::Relaxed)
    }

    /// Number of `find_by_alternate` calls served so far.
    pub fn alternate_queries(&self) -> usize {
        self.alternate_queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find_by_term(&self, dict: Dictionary, term: &str) -> Result<Vec<Definition>> {
        self.term_queries.fetch_add(1, Ordering::Relaxed);
        let folded = term.to_lowercase();
        Ok(self
            .entries
            .get(&dict)
            .map(|rows| {
                rows.iter()
                    .filter(|d| d.term.to_lowercase() == folded)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_alternate(&self, dict: Dictionary, alt: &str) -> Result<Vec<i64>> {
        self.alternate_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .alternates
            .get(&dict)
            .map(|rows| {
                rows.iter()
                    .filter(|(term, _)| term == alt)
                    .map(|(_, id)| *id)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_ids(&self, dict: Dictionary, ids: &[i64]) -> Result<Vec<Definition>> {
        Ok(self
            .entries
            .get(&dict)
            .map(|rows| {
                rows.iter()
                    .filter(|d| ids.contains(&d.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_terms(&self, dict: Dictionary) -> Result<Vec<String>> {
        let mut terms: Vec<String> = self
            .entries
            .get(&dict)
            .map(|rows| rows.iter().map(|d| d.term.clone()).collect())
            .unwrap_or_default();
        terms.sort_unstable();
        terms.dedup();
        Ok(terms)
    }

    async fn list_alternates(&self, dict: Dictionary) -> Result<Vec<(String, i64)>> {
        Ok(self.alternates.get(&dict).cloned().unwrap_or_default())
    }
}
