//! Deterministic term transforms, tried in a fixed priority order.
//!
//! The chain is data, not control flow: the resolver iterates an ordered
//! list of [`Normalizer`] steps and stops at the first one whose candidate
//! is a known term or alternate form.

use std::sync::Arc;

use crate::core::morph::{singular_noun, VerbFormIndex};
use crate::core::spell::SpellCorrector;

/// A single normalization step: maps a word to a candidate lookup term, or
/// `None` when the step does not apply to this word.
pub trait Normalizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, word: &str) -> Option<String>;
}

/// The input word, unchanged. Keeps an already-canonical headword from ever
/// reaching the more expensive steps.
pub struct Identity;

impl Normalizer for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn apply(&self, word: &str) -> Option<String> {
        Some(word.to_string())
    }
}

pub struct Lowercase;

impl Normalizer for Lowercase {
    fn name(&self) -> &'static str {
        "lowercase"
    }

    fn apply(&self, word: &str) -> Option<String> {
        Some(word.to_lowercase())
    }
}

/// Verb inflections back to their base form, then plural nouns back to
/// singular. Folds to lowercase first so capitalized inflections still
/// resolve.
pub struct MorphologicalBase {
    verbs: Arc<VerbFormIndex>,
}

impl MorphologicalBase {
    pub fn new(verbs: Arc<VerbFormIndex>) -> Self {
        Self { verbs }
    }
}

impl Normalizer for MorphologicalBase {
    fn name(&self) -> &'static str {
        "morphological-base"
    }

    fn apply(&self, word: &str) -> Option<String> {
        let folded = word.to_lowercase();
        if let Some(base) = self.verbs.base_form(&folded) {
            return Some(base.to_string());
        }
        singular_noun(&folded)
    }
}

pub struct SpellCorrected {
    corrector: Arc<SpellCorrector>,
}

impl SpellCorrected {
    pub fn new(corrector: Arc<SpellCorrector>) -> Self {
        Self { corrector }
    }
}

impl Normalizer for SpellCorrected {
    fn name(&self) -> &'static str {
        "spell-corrected"
    }

    fn apply(&self, word: &str) -> Option<String> {
        self.corrector.correct(word)
    }
}

/// Case-fold, then spell-correct. Applies only when folding changes the
/// word; otherwise the plain spell-corrected step already covered it.
pub struct LowercaseThenSpellCorrected {
    corrector: Arc<SpellCorrector>,
}

impl LowercaseThenSpellCorrected {
    pub fn new(corrector: Arc<SpellCorrector>) -> Self {
        Self { corrector }
    }
}

impl Normalizer for LowercaseThenSpellCorrected {
    fn name(&self) -> &'static str {
        "lowercase-spell-corrected"
    }

    fn apply(&self, word: &str) -> Option<String> {
        let folded = word.to_lowercase();
        if folded == word {
            return None;
        }
        self.corrector.correct(&folded)
    }
}

/// The canonical transform chain, in priority order.
pub fn default_chain(
    verbs: Arc<VerbFormIndex>,
    corrector: Arc<SpellCorrector>,
) -> Vec<Box<dyn Normalizer>> {
    vec![
        Box::new(Identity),
        Box::new(Lowercase),
        Box::new(MorphologicalBase::new(verbs)),
        Box::new(SpellCorrected::new(corrector.clone())),
        Box::new(LowercaseThenSpellCorrected::new(corrector)),
    ]
}
