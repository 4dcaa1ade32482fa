//! Spelling correction backed by a frequency-weighted edit-distance
//! dictionary.
//!
//! Wraps a SymSpell engine loaded once at startup from a large precomputed
//! frequency table. The resolver treats this as a black box: one word in,
//! at most one suggestion out.

use std::path::Path;

use symspell::{SymSpell, UnicodeStringStrategy, Verbosity};
use tracing::{info, warn};

/// Maximum edit distance considered when searching for a suggestion.
pub const MAX_EDIT_DISTANCE: i64 = 2;

/// Prefix length of the engine's precomputed delete index.
pub const PREFIX_LENGTH: usize = 7;

/// Suggests the closest known word within [`MAX_EDIT_DISTANCE`], ranked by
/// edit distance then corpus frequency.
pub struct SpellCorrector {
    engine: SymSpell<UnicodeStringStrategy>,
    loaded: bool,
}

impl SpellCorrector {
    /// Load the frequency dictionary at `path` (term and count columns,
    /// space separated). A missing file yields an empty corrector whose
    /// suggestions never apply.
    pub fn from_dictionary(path: &Path) -> Self {
        let mut engine: SymSpell<UnicodeStringStrategy> = SymSpell::default();
        if path.exists() {
            engine.load_dictionary(path.to_string_lossy().as_ref(), 0, 1, " ");
            info!(path = %path.display(), "Loaded spelling frequency dictionary");
            Self { engine, loaded: true }
        } else {
            warn!(
                path = %path.display(),
                "Spelling dictionary missing, corrections disabled"
            );
            Self { engine, loaded: false }
        }
    }

    /// Corrector with no dictionary loaded. Useful for tests and for
    /// deployments that ship without the frequency table.
    pub fn new_empty() -> Self {
        Self {
            engine: SymSpell::default(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Closest known word, or `None` when nothing qualifies within the
    /// edit-distance bound or the best suggestion is the input itself.
    /// "No suggestion" is not an error; the caller moves on.
    pub fn correct(&self, word: &str) -> Option<String> {
        if !self.loaded {
            return None;
        }
        let suggestions = self.engine.lookup(word, Verbosity::Top, MAX_EDIT_DISTANCE);
        let top = suggestions.into_iter().next()?;
        if top.distance > 0 && top.term != word {
            Some(top.term)
        } else {
            None
        }
    }
}
