use serde::{Deserialize, Serialize};
use std::fmt;

/// Musical era a work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicalPeriod {
    Gregorian,
    Medieval,
    Renaissance,
    Baroque,
    Classical,
    Romantic,
    Impressionist,
    Expressionist,
}

impl MusicalPeriod {
    pub const ALL: [MusicalPeriod; 8] = [
        MusicalPeriod::Gregorian,
        MusicalPeriod::Medieval,
        MusicalPeriod::Renaissance,
        MusicalPeriod::Baroque,
        MusicalPeriod::Classical,
        MusicalPeriod::Romantic,
        MusicalPeriod::Impressionist,
        MusicalPeriod::Expressionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MusicalPeriod::Gregorian => "gregorian",
            MusicalPeriod::Medieval => "medieval",
            MusicalPeriod::Renaissance => "renaissance",
            MusicalPeriod::Baroque => "baroque",
            MusicalPeriod::Classical => "classical",
            MusicalPeriod::Romantic => "romantic",
            MusicalPeriod::Impressionist => "impressionist",
            MusicalPeriod::Expressionist => "expressionist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s) || p.display_name() == s)
    }

    /// Name shown to learners.
    pub fn display_name(&self) -> &'static str {
        match self {
            MusicalPeriod::Gregorian => "Gregoriansk sång",
            MusicalPeriod::Medieval => "Medeltiden",
            MusicalPeriod::Renaissance => "Renässansen",
            MusicalPeriod::Baroque => "Barocken",
            MusicalPeriod::Classical => "Wienklassicismen",
            MusicalPeriod::Romantic => "Romantiken",
            MusicalPeriod::Impressionist => "Impressionismen",
            MusicalPeriod::Expressionist => "Expressionismen",
        }
    }
}

impl fmt::Display for MusicalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One work in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub id: String,
    pub title: String,
    pub composer: String,
    /// Negative years are BC.
    pub year: i32,
    pub period: MusicalPeriod,
    pub description: String,
    /// Canonical audio file name; the key under which local copies are stored.
    pub file_name: String,
    pub remote_url: String,
}

impl CatalogueEntry {
    pub fn display_year(&self) -> String {
        if self.year < 0 {
            format!("{} BC", self.year.unsigned_abs())
        } else {
            self.year.to_string()
        }
    }
}
