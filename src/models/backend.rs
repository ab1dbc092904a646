//! Model routes.
//!
//! A route names which generation capability and parameter set handle a
//! request. The set is closed: every route has exactly one parameter entry
//! and, in a correctly populated registry, exactly one model.

use serde::{Deserialize, Serialize};

/// Available generation routes.
///
/// Each route is backed by a different kind of model:
/// - **General**: broad-purpose music generation, the default fallback
/// - **Percussion**: drum and rhythm focused generation
/// - **Piano**: solo piano and piano-led classical/jazz
/// - **Hybrid**: an ensemble for dense multi-instrument arrangements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    /// General-purpose model, used when no routing rule matches.
    #[default]
    General,

    /// Percussion model for drum-heavy prompts.
    Percussion,

    /// Piano model for solo or piano-led prompts.
    Piano,

    /// Ensemble model for prompts with more than two instruments.
    Hybrid,
}

impl ModelId {
    /// All routes, in declaration order.
    pub const ALL: [ModelId; 4] = [
        ModelId::General,
        ModelId::Percussion,
        ModelId::Piano,
        ModelId::Hybrid,
    ];

    /// Returns the string representation of the route.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::General => "general",
            ModelId::Percussion => "percussion",
            ModelId::Piano => "piano",
            ModelId::Hybrid => "hybrid",
        }
    }

    /// Parses a route from a string.
    ///
    /// Matching ignores case and surrounding whitespace. Anything outside
    /// the closed set returns `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" => Some(ModelId::General),
            "percussion" => Some(ModelId::Percussion),
            "piano" => Some(ModelId::Piano),
            "hybrid" => Some(ModelId::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_parsing() {
        assert_eq!(ModelId::parse("general"), Some(ModelId::General));
        assert_eq!(ModelId::parse("Percussion"), Some(ModelId::Percussion));
        assert_eq!(ModelId::parse(" PIANO "), Some(ModelId::Piano));
        assert_eq!(ModelId::parse("hybrid"), Some(ModelId::Hybrid));
        assert_eq!(ModelId::parse("musicgen"), None);
        assert_eq!(ModelId::parse(""), None);
    }

    #[test]
    fn model_id_display_round_trips() {
        for id in ModelId::ALL {
            assert_eq!(ModelId::parse(&id.to_string()), Some(id));
        }
    }

    #[test]
    fn model_id_default() {
        assert_eq!(ModelId::default(), ModelId::General);
    }
}
