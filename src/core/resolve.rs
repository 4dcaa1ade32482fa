//! Term resolution: ordered transforms against a dictionary's known terms
//! and alternates, with a similarity fallback.
//!
//! # Resolution order
//!
//! ```text
//! 1. Trim; reject words over the length cap
//! 2. For each transform in chain order:
//!      exact-term lookup, then alternate-term lookup
//!      first non-empty definition list wins
//! 3. Jaro scan over the full known-term set (once, cache required)
//! 4. NotFound
//! ```
//!
//! The similarity scan is the most expensive step and must never run when a
//! cheaper transform already succeeded; the short-circuit in step 2
//! guarantees that. When a cache snapshot is present its known-term set
//! also acts as a negative filter: a candidate absent from it skips the
//! storage query entirely.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use crate::core::cache::{DictionarySnapshot, TermCache};
use crate::core::dictionary::Dictionary;
use crate::core::normalize::Normalizer;
use crate::core::similarity::find_best_match;
use crate::storage::{Definition, Storage, StorageError};

/// Longest accepted query word, in characters, after trimming.
pub const MAX_WORD_LEN: usize = 60;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Trimmed input exceeded [`MAX_WORD_LEN`]. Rendered to the caller
    /// exactly like `NotFound`; kept separate for logs and tests.
    #[error("input of {length} characters exceeds the {MAX_WORD_LEN} character limit")]
    InputTooLong { length: usize },

    /// No transform, alternate lookup or similarity fallback produced a hit.
    #[error("no entry found for '{word}'")]
    NotFound { word: String },

    /// Storage failures propagate unchanged; the core never retries or
    /// suppresses them.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How the resolved term was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrigin {
    /// One of the deterministic transforms produced the hit.
    Transform(&'static str),
    /// The Jaro fallback picked the closest known term.
    Similarity,
}

/// Diagnostic record of what a resolution tried.
#[derive(Debug, Clone, Default)]
pub struct ResolutionTrace {
    /// Names of transforms whose candidates were looked up, in order.
    pub transforms_tried: Vec<&'static str>,
    pub used_similarity: bool,
    pub elapsed_ms: u64,
}

/// A successful resolution: the term that matched and its definitions.
///
/// `definitions` is never empty; an empty lookup result is a miss, not a
/// success.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub term: String,
    pub definitions: Vec<Definition>,
    pub origin: MatchOrigin,
    pub trace: ResolutionTrace,
}

/// Resolves raw user input to a known headword and its definitions.
///
/// Holds read-only shared state: the storage handle, the optional startup
/// cache snapshot and the transform chain. One resolver serves every
/// dictionary and every request.
pub struct TermResolver {
    storage: Arc<dyn Storage>,
    cache: Option<Arc<TermCache>>,
    chain: Vec<Box<dyn Normalizer>>,
}

impl TermResolver {
    pub fn new(
        storage: Arc<dyn Storage>,
        cache: Option<Arc<TermCache>>,
        chain: Vec<Box<dyn Normalizer>>,
    ) -> Self {
        Self {
            storage,
            cache,
            chain,
        }
    }

    /// Resolve `raw` against `dict`.
    ///
    /// Transforms run strictly in chain order and the pipeline halts on the
    /// first hit, so re-resolving a canonical headword short-circuits on
    /// the identity step. Candidates already looked up are not queried
    /// again when a later transform reproduces them.
    pub async fn resolve(&self, dict: Dictionary, raw: &str) -> Result<Resolved> {
        let started = Instant::now();
        let word = raw.trim();

        let length = word.chars().count();
        if length > MAX_WORD_LEN {
            return Err(ResolveError::InputTooLong { length });
        }
        if word.is_empty() {
            return Err(ResolveError::NotFound {
                word: String::new(),
            });
        }

        let mut trace = ResolutionTrace::default();
        let mut tried: Vec<String> = Vec::with_capacity(self.chain.len());

        for step in &self.chain {
            let Some(candidate) = step.apply(word) else {
                continue;
            };
            if tried.iter().any(|t| t == &candidate) {
                continue;
            }
            trace.transforms_tried.push(step.name());
            if let Some(definitions) = self.lookup(dict, &candidate).await? {
                trace.elapsed_ms = started.elapsed().as_millis() as u64;
                debug!(
                    dictionary = %dict,
                    word,
                    candidate = %candidate,
                    transform = step.name(),
                    "Resolved term"
                );
                return Ok(Resolved {
                    term: candidate,
                    definitions,
                    origin: MatchOrigin::Transform(step.name()),
                    trace,
                });
            }
            tried.push(candidate);
        }

        // Last resort: scan the known-term set for the closest headword.
        // Needs the cache snapshot; without one the deterministic chain is
        // all we run, and the scan never repeats within a request.
        if let Some(snapshot) = self.snapshot(dict) {
            trace.used_similarity = true;
            let folded = word.to_lowercase();
            let best =
                find_best_match(&folded, snapshot.terms().iter().map(String::as_str))
                    .map(str::to_string);
            if let Some(best) = best {
                if let Some(definitions) = self.lookup(dict, &best).await? {
                    trace.elapsed_ms = started.elapsed().as_millis() as u64;
                    debug!(
                        dictionary = %dict,
                        word,
                        candidate = %best,
                        "Resolved term via similarity fallback"
                    );
                    return Ok(Resolved {
                        term: best,
                        definitions,
                        origin: MatchOrigin::Similarity,
                        trace,
                    });
                }
            }
        }

        Err(ResolveError::NotFound {
            word: word.to_string(),
        })
    }

    fn snapshot(&self, dict: Dictionary) -> Option<&DictionarySnapshot> {
        self.cache.as_deref().and_then(|c| c.snapshot(dict))
    }

    /// Exact-term lookup, then alternate-term lookup. `Ok(None)` is a miss.
    async fn lookup(
        &self,
        dict: Dictionary,
        candidate: &str,
    ) -> Result<Option<Vec<Definition>>> {
        match self.snapshot(dict) {
            Some(snapshot) => {
                if snapshot.contains_term(candidate) {
                    let defs = self.storage.find_by_term(dict, candidate).await?;
                    if !defs.is_empty() {
                        return Ok(Some(defs));
                    }
                }
                if let Some(ids) = snapshot.alternate_ids(candidate) {
                    let defs = self.storage.find_by_ids(dict, ids).await?;
                    if !defs.is_empty() {
                        return Ok(Some(defs));
                    }
                }
                Ok(None)
            }
            None => {
                let defs = self.storage.find_by_term(dict, candidate).await?;
                if !defs.is_empty() {
                    return Ok(Some(defs));
                }
                let ids = self.storage.find_by_alternate(dict, candidate).await?;
                if !ids.is_empty() {
                    let defs = self.storage.find_by_ids(dict, &ids).await?;
                    if !defs.is_empty() {
                        return Ok(Some(defs));
                    }
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::{default_chain, Identity, Lowercase};
    use crate::core::morph::VerbFormIndex;
    use crate::core::spell::SpellCorrector;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DICT: Dictionary = Dictionary::NewOxfordAmerican;

    fn seeded_storage() -> crate::storage::MemoryStorage {
        let mut storage = crate::storage::MemoryStorage::new();
        storage.insert_entry(DICT, 1, "run", "<p>to move fast</p>");
        storage.insert_entry(DICT, 2, "hello", "<p>a greeting</p>");
        storage.insert_entry(DICT, 3, "help", "<p>assistance</p>");
        storage.insert_entry(DICT, 4, "Cat", "<p>a feline</p>");
        storage.insert_entry(DICT, 5, "color", "<p>a hue</p>");
        storage.insert_alternate(DICT, "colour", 5);
        storage
    }

    fn verbs() -> Arc<VerbFormIndex> {
        let table = "run\truns\tran\trun\trunning\n";
        Arc::new(VerbFormIndex::from_reader(Cursor::new(table.as_bytes())).unwrap())
    }

    async fn resolver_with_cache() -> (Arc<crate::storage::MemoryStorage>, TermResolver) {
        let storage = Arc::new(seeded_storage());
        let cache = Arc::new(TermCache::build(storage.as_ref(), &[DICT]).await.unwrap());
        let resolver = TermResolver::new(
            storage.clone(),
            Some(cache),
            default_chain(verbs(), Arc::new(SpellCorrector::new_empty())),
        );
        (storage, resolver)
    }

    fn resolver_without_cache() -> (Arc<crate::storage::MemoryStorage>, TermResolver) {
        let storage = Arc::new(seeded_storage());
        let resolver = TermResolver::new(
            storage.clone(),
            None,
            default_chain(verbs(), Arc::new(SpellCorrector::new_empty())),
        );
        (storage, resolver)
    }

    // -------------------------------------------------------------------------
    // Input validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_overlong_input_is_rejected_before_any_lookup() {
        let (storage, resolver) = resolver_without_cache();
        let word = "a".repeat(61);
        match resolver.resolve(DICT, &word).await {
            Err(ResolveError::InputTooLong { length }) => assert_eq!(length, 61),
            other => panic!("expected InputTooLong, got {other:?}"),
        }
        assert_eq!(storage.term_queries(), 0);
    }

    #[tokio::test]
    async fn test_sixty_characters_is_still_accepted() {
        let (_, resolver) = resolver_without_cache();
        let word = "a".repeat(60);
        match resolver.resolve(DICT, &word).await {
            Err(ResolveError::NotFound { .. }) => (),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_whitespace_only_input_is_not_found() {
        let (storage, resolver) = resolver_without_cache();
        match resolver.resolve(DICT, "   ").await {
            Err(ResolveError::NotFound { word }) => assert_eq!(word, ""),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(storage.term_queries(), 0);
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let (_, resolver) = resolver_without_cache();
        let resolved = resolver.resolve(DICT, "  run  ").await.unwrap();
        assert_eq!(resolved.term, "run");
    }

    // -------------------------------------------------------------------------
    // Transform chain
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_exact_headword_short_circuits_on_identity() {
        let (storage, resolver) = resolver_with_cache().await;
        let resolved = resolver.resolve(DICT, "run").await.unwrap();
        assert_eq!(resolved.term, "run");
        assert_eq!(resolved.origin, MatchOrigin::Transform("identity"));
        assert!(!resolved.trace.used_similarity);
        assert_eq!(storage.term_queries(), 1);
    }

    #[tokio::test]
    async fn test_case_mismatch_resolves() {
        let (_, resolver) = resolver_without_cache();
        let resolved = resolver.resolve(DICT, "cat").await.unwrap();
        assert_eq!(resolved.definitions[0].term, "Cat");
    }

    #[tokio::test]
    async fn test_verb_inflection_resolves_to_base_form() {
        let (_, resolver) = resolver_with_cache().await;
        let resolved = resolver.resolve(DICT, "running").await.unwrap();
        assert_eq!(resolved.term, "run");
        assert_eq!(resolved.origin, MatchOrigin::Transform("morphological-base"));
    }

    #[tokio::test]
    async fn test_plural_resolves_to_singular() {
        let (_, resolver) = resolver_with_cache().await;
        let resolved = resolver.resolve(DICT, "colors").await.unwrap();
        assert_eq!(resolved.term, "color");
    }

    #[tokio::test]
    async fn test_alternate_form_resolves() {
        let (_, resolver) = resolver_with_cache().await;
        let resolved = resolver.resolve(DICT, "colour").await.unwrap();
        assert_eq!(resolved.definitions.len(), 1);
        assert_eq!(resolved.definitions[0].term, "color");
    }

    #[tokio::test]
    async fn test_alternate_form_resolves_without_cache() {
        let (storage, resolver) = resolver_without_cache();
        let resolved = resolver.resolve(DICT, "colour").await.unwrap();
        assert_eq!(resolved.definitions[0].term, "color");
        assert!(storage.alternate_queries() > 0);
    }

    // -------------------------------------------------------------------------
    // Similarity fallback
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_similarity_fallback_picks_closest_headword() {
        let (_, resolver) = resolver_with_cache().await;
        let resolved = resolver.resolve(DICT, "helo").await.unwrap();
        assert_eq!(resolved.term, "hello");
        assert_eq!(resolved.origin, MatchOrigin::Similarity);
        assert!(resolved.trace.used_similarity);
    }

    #[tokio::test]
    async fn test_similarity_fallback_requires_cache() {
        let (_, resolver) = resolver_without_cache();
        match resolver.resolve(DICT, "helo").await {
            Err(ResolveError::NotFound { word }) => assert_eq!(word, "helo"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nothing_similar_is_not_found() {
        let (_, resolver) = resolver_with_cache().await;
        match resolver.resolve(DICT, "zzzz").await {
            Err(ResolveError::NotFound { word }) => assert_eq!(word, "zzzz"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Cache as negative filter
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_cache_miss_skips_storage_queries() {
        let (storage, resolver) = resolver_with_cache().await;
        let _ = resolver.resolve(DICT, "zzzz").await;
        // Every candidate missed the cached term set and alternate index,
        // so no storage query was ever issued.
        assert_eq!(storage.term_queries(), 0);
        assert_eq!(storage.alternate_queries(), 0);
    }

    // -------------------------------------------------------------------------
    // Short-circuit instrumentation
    // -------------------------------------------------------------------------

    struct CountingStep {
        calls: Arc<AtomicUsize>,
    }

    impl Normalizer for CountingStep {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn apply(&self, _word: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    #[tokio::test]
    async fn test_later_steps_never_run_after_a_hit() {
        let storage = Arc::new(seeded_storage());
        let cache = Arc::new(TermCache::build(storage.as_ref(), &[DICT]).await.unwrap());
        let calls = Arc::new(AtomicUsize::new(0));
        let chain: Vec<Box<dyn Normalizer>> = vec![
            Box::new(Identity),
            Box::new(Lowercase),
            Box::new(CountingStep {
                calls: calls.clone(),
            }),
        ];
        let resolver = TermResolver::new(storage, Some(cache), chain);

        let resolved = resolver.resolve(DICT, "run").await.unwrap();
        assert_eq!(resolved.origin, MatchOrigin::Transform("identity"));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(!resolved.trace.used_similarity);
    }

    #[tokio::test]
    async fn test_duplicate_candidates_are_looked_up_once() {
        let (storage, resolver) = resolver_without_cache();
        // "zebra" is already lowercase, so identity and lowercase produce
        // the same candidate; it must hit storage only once even though
        // both steps run.
        let _ = resolver.resolve(DICT, "zebra").await;
        assert_eq!(storage.term_queries(), 1);
        assert_eq!(storage.alternate_queries(), 1);
    }
}
