//! Startup-built snapshot of every dictionary's terms and alternates.
//!
//! Built once before any request is served and read-only afterward, so
//! lookups share it without locks. A rebuild constructs a whole new
//! snapshot and swaps the `Arc`; readers never observe partial state.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::core::dictionary::Dictionary;
use crate::storage::{Storage, StorageError};

/// One dictionary's known-term set and alternate-term index.
#[derive(Debug, Default)]
pub struct DictionarySnapshot {
    /// Case-folded terms for membership tests, matching the storage layer's
    /// case-insensitive exact lookup.
    folded_terms: HashSet<String>,
    /// Original-case terms in sorted order, for deterministic fuzzy scans.
    sorted_terms: Vec<String>,
    /// Alternate surface form (exact case) to entry ids.
    alternates: HashMap<String, Vec<i64>>,
}

impl DictionarySnapshot {
    /// Case-insensitive known-term membership. Agrees with the storage
    /// layer's exact lookup, so a miss here means the storage query can be
    /// skipped.
    pub fn contains_term(&self, term: &str) -> bool {
        self.folded_terms.contains(&term.to_lowercase())
    }

    pub fn alternate_ids(&self, alt: &str) -> Option<&[i64]> {
        self.alternates.get(alt).map(Vec::as_slice)
    }

    /// Known terms in sorted order.
    pub fn terms(&self) -> &[String] {
        &self.sorted_terms
    }

    pub fn term_count(&self) -> usize {
        self.sorted_terms.len()
    }
}

/// Per-dictionary snapshots keyed by dataset.
#[derive(Debug, Default)]
pub struct TermCache {
    snapshots: HashMap<Dictionary, DictionarySnapshot>,
}

impl TermCache {
    /// Load the term set and alternate index of every given dictionary.
    pub async fn build(
        storage: &dyn Storage,
        dictionaries: &[Dictionary],
    ) -> Result<Self, StorageError> {
        let mut snapshots = HashMap::new();
        for &dict in dictionaries {
            let mut sorted_terms = storage.list_terms(dict).await?;
            sorted_terms.sort_unstable();
            sorted_terms.dedup();

            let folded_terms: HashSet<String> =
                sorted_terms.iter().map(|t| t.to_lowercase()).collect();

            let mut alternates: HashMap<String, Vec<i64>> = HashMap::new();
            for (alt, entry_id) in storage.list_alternates(dict).await? {
                alternates.entry(alt).or_default().push(entry_id);
            }

            info!(
                dictionary = %dict,
                terms = sorted_terms.len(),
                alternates = alternates.len(),
                "Cached dictionary terms"
            );
            snapshots.insert(
                dict,
                DictionarySnapshot {
                    folded_terms,
                    sorted_terms,
                    alternates,
                },
            );
        }
        Ok(Self { snapshots })
    }

    pub fn snapshot(&self, dict: Dictionary) -> Option<&DictionarySnapshot> {
        self.snapshots.get(&dict)
    }
}
