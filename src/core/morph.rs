//! Inverse morphology: verb inflections back to base forms, plural nouns
//! back to singular.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MorphError {
    #[error("failed to read verb form table: {0}")]
    Io(#[from] std::io::Error),
}

/// Mapping from inflected verb forms to their base form.
///
/// Loaded once from a tab-separated table of
/// `(base, third-person, past, past-participle, present-participle)` rows.
/// Every base form also maps to itself, so lookups need no special case for
/// words already in base form.
#[derive(Debug, Default)]
pub struct VerbFormIndex {
    forms: HashMap<String, String>,
}

impl VerbFormIndex {
    pub fn load(path: &Path) -> Result<Self, MorphError> {
        let file = fs::File::open(path)?;
        let index = Self::from_reader(BufReader::new(file))?;
        info!(forms = index.len(), path = %path.display(), "Loaded verb form table");
        Ok(index)
    }

    /// Parse the tab-separated table. Rows without exactly five columns are
    /// skipped; the first mapping seen for a form wins.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, MorphError> {
        let mut forms: HashMap<String, String> = HashMap::new();
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() != 5 || cols[0].trim().is_empty() {
                skipped += 1;
                continue;
            }
            let base = cols[0].trim();
            for form in &cols[1..] {
                let form = form.trim();
                if !form.is_empty() {
                    forms
                        .entry(form.to_string())
                        .or_insert_with(|| base.to_string());
                }
            }
            forms
                .entry(base.to_string())
                .or_insert_with(|| base.to_string());
        }
        if skipped > 0 {
            warn!(skipped, "Skipped malformed verb table rows");
        }
        Ok(Self { forms })
    }

    /// Base form for an inflected verb, or the word itself when it already
    /// is a base form. `None` for words not in the table.
    pub fn base_form(&self, word: &str) -> Option<&str> {
        self.forms.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

/// Plurals that no suffix rule derives.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("calves", "calf"),
    ("children", "child"),
    ("echoes", "echo"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("halves", "half"),
    ("heroes", "hero"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lice", "louse"),
    ("lives", "life"),
    ("loaves", "loaf"),
    ("men", "man"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("people", "person"),
    ("potatoes", "potato"),
    ("scarves", "scarf"),
    ("shelves", "shelf"),
    ("teeth", "tooth"),
    ("thieves", "thief"),
    ("tomatoes", "tomato"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

/// Derive the singular of a recognized English plural.
///
/// Returns `None` when the word does not look like a plural: no trailing
/// `s`, or an ending (`-ss`, `-us`, `-is`) that trailing-`s` words keep in
/// the singular.
pub fn singular_noun(word: &str) -> Option<String> {
    if word.len() < 3 {
        return None;
    }

    for (plural, singular) in IRREGULAR_PLURALS {
        if word == *plural {
            return Some((*singular).to_string());
        }
    }

    // cities -> city, but dies/ties keep falling through to the plain
    // s-strip below.
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() >= 2 {
            return Some(format!("{stem}y"));
        }
    }

    // glasses -> glass, boxes -> box, quizzes -> quiz (close enough),
    // churches -> church, bushes -> bush.
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            let kept = &suffix[..suffix.len() - 2];
            return Some(format!("{stem}{kept}"));
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }

    word.strip_suffix('s').map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TABLE: &str = "run\truns\tran\trun\trunning\n\
                         be\tis\twas\tbeen\tbeing\n\
                         broken row without tabs\n\
                         go\tgoes\twent\tgone\tgoing\n";

    fn index() -> VerbFormIndex {
        VerbFormIndex::from_reader(Cursor::new(TABLE.as_bytes())).unwrap()
    }

    // -------------------------------------------------------------------------
    // Verb form index
    // -------------------------------------------------------------------------

    #[test]
    fn test_inflections_map_to_base() {
        let index = index();
        assert_eq!(index.base_form("running"), Some("run"));
        assert_eq!(index.base_form("ran"), Some("run"));
        assert_eq!(index.base_form("went"), Some("go"));
        assert_eq!(index.base_form("was"), Some("be"));
    }

    #[test]
    fn test_base_forms_are_reflexive() {
        let index = index();
        for base in ["run", "be", "go"] {
            assert_eq!(index.base_form(base), Some(base));
        }
    }

    #[test]
    fn test_unknown_word_is_none() {
        assert_eq!(index().base_form("sprinting"), None);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let index = index();
        assert_eq!(index.base_form("broken row without tabs"), None);
        // Three valid rows: 4 distinct forms each for run/go, 5 for be,
        // minus the shared self-mapped "run" past participle.
        assert!(index.len() >= 12);
    }

    #[test]
    fn test_first_mapping_wins() {
        let table = "lie\tlies\tlay\tlain\tlying\n\
                     lay\tlays\tlaid\tlaid\tlaying\n";
        let index = VerbFormIndex::from_reader(Cursor::new(table.as_bytes())).unwrap();
        // "lay" was first seen as the past tense of "lie".
        assert_eq!(index.base_form("lay"), Some("lie"));
        assert_eq!(index.base_form("laying"), Some("lay"));
    }

    #[test]
    fn test_empty_input() {
        let index = VerbFormIndex::from_reader(Cursor::new(b"" as &[u8])).unwrap();
        assert!(index.is_empty());
    }

    // -------------------------------------------------------------------------
    // Singular derivation
    // -------------------------------------------------------------------------

    #[test]
    fn test_regular_plurals() {
        assert_eq!(singular_noun("cats").as_deref(), Some("cat"));
        assert_eq!(singular_noun("houses").as_deref(), Some("house"));
        assert_eq!(singular_noun("gloves").as_deref(), Some("glove"));
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(singular_noun("cities").as_deref(), Some("city"));
        assert_eq!(singular_noun("ties").as_deref(), Some("tie"));
        assert_eq!(singular_noun("boxes").as_deref(), Some("box"));
        assert_eq!(singular_noun("glasses").as_deref(), Some("glass"));
        assert_eq!(singular_noun("churches").as_deref(), Some("church"));
        assert_eq!(singular_noun("bushes").as_deref(), Some("bush"));
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(singular_noun("mice").as_deref(), Some("mouse"));
        assert_eq!(singular_noun("children").as_deref(), Some("child"));
        assert_eq!(singular_noun("knives").as_deref(), Some("knife"));
        assert_eq!(singular_noun("wolves").as_deref(), Some("wolf"));
    }

    #[test]
    fn test_non_plurals_are_none() {
        assert_eq!(singular_noun("run"), None);
        assert_eq!(singular_noun("glass"), None);
        assert_eq!(singular_noun("status"), None);
        assert_eq!(singular_noun("analysis"), None);
        assert_eq!(singular_noun("ox"), None);
    }
}
