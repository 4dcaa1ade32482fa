//! The fixed set of dictionary datasets this server can serve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One offline dictionary dataset. Each dataset owns a known-term set and an
/// alternate-term index, both immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dictionary {
    ChineseEnglish,
    NewOxfordAmerican,
    SwedishEnglish,
}

impl Dictionary {
    /// Every configured dataset, in serving order.
    pub const ALL: [Dictionary; 3] = [
        Dictionary::ChineseEnglish,
        Dictionary::NewOxfordAmerican,
        Dictionary::SwedishEnglish,
    ];

    /// Route slug, also the stem of the dataset's database file name.
    pub fn slug(self) -> &'static str {
        match self {
            Dictionary::ChineseEnglish => "ChineseEnglishDictionary",
            Dictionary::NewOxfordAmerican => "NewOxfordAmericanDictionary",
            Dictionary::SwedishEnglish => "SwedishEnglishDictionary",
        }
    }

    /// Parse a route slug back into a dataset.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    /// Human-readable dataset name for page titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Dictionary::ChineseEnglish => "Chinese-English Dictionary",
            Dictionary::NewOxfordAmerican => "New Oxford American Dictionary",
            Dictionary::SwedishEnglish => "Swedish-English Dictionary",
        }
    }

    /// File name of the dataset's SQLite database.
    pub fn db_file_name(self) -> String {
        format!("{}.db", self.slug())
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
