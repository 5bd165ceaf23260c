use serde::{Deserialize, Serialize};

/// Helper verb used to build the Perfekt with a given participle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Auxiliary {
    Hat,
    Ist,
}

/// A verb card as produced by the enrichment step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbRecord {
    pub infinitive: String,
    pub auxiliary: Auxiliary,
    pub participle: String,
    pub translation: String,
}

impl VerbRecord {
    pub fn new(
        infinitive: impl Into<String>,
        auxiliary: Auxiliary,
        participle: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            infinitive: infinitive.into(),
            auxiliary,
            participle: participle.into(),
            translation: translation.into(),
        }
    }

    /// "ist gegangen", "hat geschlafen"
    pub fn perfect_form(&self) -> String {
        format!("{} {}", self.auxiliary, self.participle)
    }
}

/// Outcome of a single answered card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub verb: VerbRecord,
    pub known: bool,
}
