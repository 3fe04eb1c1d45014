//! Tri-state verdict for "related to the Portuguese-speaking world".
//!
//! On disk the verdict is a JSON boolean; `Unknown` is written as an absent
//! key, so fields holding a `Relation` use
//! `#[serde(default, skip_serializing_if = "Relation::is_unknown")]`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Relation {
    Related,
    Unrelated,
    #[default]
    Unknown,
}

impl Relation {
    pub fn from_bool(related: bool) -> Self {
        if related { Relation::Related } else { Relation::Unrelated }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Relation::Related   => Some(true),
            Relation::Unrelated => Some(false),
            Relation::Unknown   => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !self.is_unknown()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Relation::Unknown)
    }

    /// Combine two independent signals about the same entity.
    /// Any `Related` wins; otherwise any `Unrelated`; otherwise `Unknown`.
    pub fn either(self, other: Relation) -> Relation {
        match (self, other) {
            (Relation::Related, _) | (_, Relation::Related) => Relation::Related,
            (Relation::Unrelated, _) | (_, Relation::Unrelated) => Relation::Unrelated,
            _ => Relation::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Related   => "related",
            Relation::Unrelated => "unrelated",
            Relation::Unknown   => "unknown",
        }
    }
}

impl From<Option<bool>> for Relation {
    fn from(value: Option<bool>) -> Self {
        value.map(Relation::from_bool).unwrap_or_default()
    }
}

impl From<Relation> for Option<bool> {
    fn from(value: Relation) -> Self {
        value.as_bool()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
