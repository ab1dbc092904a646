//! Model routing.
//!
//! An explicit, valid preference always wins. Otherwise the first matching
//! rule decides:
//!
//! 1. drums or percussion present -> `percussion`
//! 2. piano is the only instrument -> `piano`
//! 3. classical or jazz with piano -> `piano`
//! 4. more than two instruments -> `hybrid`
//! 5. anything else -> `general`

use tracing::{debug, warn};

use crate::models::ModelId;
use crate::types::CleanPrompt;

use super::analyzer::{Genre, Instrument, PromptAnalysis, PromptAnalyzer};

/// Selects a model route for a prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelRouter {
    analyzer: PromptAnalyzer,
}

impl ModelRouter {
    /// Creates a router using the given analyzer.
    pub fn new(analyzer: PromptAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Returns the analyzer.
    pub fn analyzer(&self) -> &PromptAnalyzer {
        &self.analyzer
    }

    /// Routes a prompt, analyzing it only when no valid preference is given.
    pub fn route(&self, prompt: &CleanPrompt, preference: Option<&str>) -> ModelId {
        if let Some(model) = parse_preference(preference) {
            debug!("Preference '{}' overrides routing", model);
            return model;
        }
        apply_rules(&self.analyzer.analyze(prompt))
    }

    /// Selects a route from an existing analysis.
    pub fn select(
        &self,
        prompt: &CleanPrompt,
        analysis: &PromptAnalysis,
        preference: Option<&str>,
    ) -> ModelId {
        let model = parse_preference(preference).unwrap_or_else(|| apply_rules(analysis));
        debug!("Routed '{}' to {}", prompt, model);
        model
    }
}

fn parse_preference(preference: Option<&str>) -> Option<ModelId> {
    let raw = preference?;
    let model = ModelId::parse(raw);
    if model.is_none() {
        warn!("Ignoring unknown model preference '{}'", raw);
    }
    model
}

/// Applies the routing rules to an analysis.
pub fn apply_rules(analysis: &PromptAnalysis) -> ModelId {
    let instruments = &analysis.instruments;
    let has_piano = analysis.has(Instrument::Piano);

    if analysis.has(Instrument::Drums) || analysis.has(Instrument::Percussion) {
        ModelId::Percussion
    } else if has_piano && instruments.len() == 1 {
        ModelId::Piano
    } else if has_piano && matches!(analysis.genre, Some(Genre::Classical | Genre::Jazz)) {
        ModelId::Piano
    } else if instruments.len() > 2 {
        ModelId::Hybrid
    } else {
        ModelId::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn route(text: &str, preference: Option<&str>) -> ModelId {
        ModelRouter::default().route(&CleanPrompt::sanitize(text).unwrap(), preference)
    }

    fn analysis(instruments: &[Instrument], genre: Option<Genre>) -> PromptAnalysis {
        PromptAnalysis {
            instruments: instruments.iter().copied().collect::<BTreeSet<_>>(),
            genre,
            tempo_bpm: None,
        }
    }

    #[test]
    fn drums_route_to_percussion() {
        assert_eq!(route("fast drums and bass", None), ModelId::Percussion);
        assert_eq!(route("tabla groove", None), ModelId::Percussion);
    }

    #[test]
    fn solo_piano_routes_to_piano() {
        assert_eq!(route("solo piano", None), ModelId::Piano);
    }

    #[test]
    fn piano_led_jazz_routes_to_piano() {
        assert_eq!(route("jazz piano with bass", None), ModelId::Piano);
        assert_eq!(route("classical piano with strings", None), ModelId::Piano);
    }

    #[test]
    fn accompanied_piano_without_genre_routes_to_general() {
        assert_eq!(route("piano with strings", None), ModelId::General);
        assert_eq!(route("piano over a bass line", None), ModelId::General);
        assert_eq!(route("rock piano with bass", None), ModelId::General);
    }

    #[test]
    fn piano_in_a_trio_routes_to_hybrid() {
        assert_eq!(route("piano with strings and bass", None), ModelId::Hybrid);
        assert_eq!(route("synth, bass and piano", None), ModelId::Hybrid);
    }

    #[test]
    fn dense_arrangement_routes_to_hybrid() {
        assert_eq!(route("guitar, bass and strings", None), ModelId::Hybrid);
    }

    #[test]
    fn percussion_rule_precedes_hybrid() {
        assert_eq!(route("guitar, bass, strings and drums", None), ModelId::Percussion);
    }

    #[test]
    fn no_keywords_routes_to_general() {
        assert_eq!(route("a quiet evening", None), ModelId::General);
        assert_eq!(apply_rules(&PromptAnalysis::default()), ModelId::General);
    }

    #[test]
    fn preference_always_wins() {
        assert_eq!(route("fast drums", Some("piano")), ModelId::Piano);
        assert_eq!(route("solo piano", Some("HYBRID")), ModelId::Hybrid);
    }

    #[test]
    fn invalid_preference_is_ignored() {
        assert_eq!(route("solo piano", Some("violin")), ModelId::Piano);
    }

    #[test]
    fn select_uses_supplied_analysis() {
        let router = ModelRouter::default();
        let prompt = CleanPrompt::sanitize("anything").unwrap();
        let a = analysis(&[Instrument::Piano], Some(Genre::Classical));

        assert_eq!(router.select(&prompt, &a, None), ModelId::Piano);
        assert_eq!(router.select(&prompt, &a, Some("general")), ModelId::General);
        // Deterministic
        assert_eq!(router.select(&prompt, &a, None), router.select(&prompt, &a, None));
    }

    #[test]
    fn two_instruments_without_piano_stay_general() {
        let a = analysis(&[Instrument::Guitar, Instrument::Bass], None);
        assert_eq!(apply_rules(&a), ModelId::General);
    }
}
