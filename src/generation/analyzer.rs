//! Rule-based prompt analysis.
//!
//! Extracts instruments, genre and tempo from a sanitized prompt by
//! case-insensitive substring matching against static keyword tables.
//! Analysis is pure: the same prompt always yields the same result.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::CleanPrompt;

/// Instruments the analyzer can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Piano,
    Guitar,
    Drums,
    Percussion,
    Bass,
    Strings,
    Synth,
}

impl Instrument {
    /// Returns the string representation of the instrument.
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Guitar => "guitar",
            Instrument::Drums => "drums",
            Instrument::Percussion => "percussion",
            Instrument::Bass => "bass",
            Instrument::Strings => "strings",
            Instrument::Synth => "synth",
        }
    }
}

/// Genres the analyzer can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Rock,
    Jazz,
    Classical,
    Electronic,
    HipHop,
    Ambient,
}

impl Genre {
    /// Returns the string representation of the genre.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
            Genre::Classical => "classical",
            Genre::Electronic => "electronic",
            Genre::HipHop => "hip hop",
            Genre::Ambient => "ambient",
        }
    }
}

/// Instrument -> trigger keywords.
pub type InstrumentTable = [(Instrument, &'static [&'static str])];

/// Genres in precedence order with the keyword that triggers each.
pub type GenreTable = [(Genre, &'static str)];

/// Tempo words in precedence order with their BPM.
pub type TempoTable = [(&'static str, u32)];

/// Built-in instrument keywords.
///
/// Beyond piano, guitar and drums the table knows percussion, bass, strings
/// and synth. Piano with accompaniment outside classical or jazz therefore
/// routes to general, and three or more instruments route to hybrid.
pub static INSTRUMENTS: &InstrumentTable = &[
    (Instrument::Piano, &["piano", "keyboard", "keys"]),
    (Instrument::Guitar, &["guitar", "acoustic", "electric guitar"]),
    (Instrument::Drums, &["drums", "percussion", "beat", "rhythm"]),
    (Instrument::Percussion, &["conga", "bongo", "tabla", "shaker"]),
    (Instrument::Bass, &["bass"]),
    (Instrument::Strings, &["strings", "violin", "cello"]),
    (Instrument::Synth, &["synth"]),
];

/// Built-in genres. Earlier entries win when several match.
pub static GENRES: &GenreTable = &[
    (Genre::Rock, "rock"),
    (Genre::Jazz, "jazz"),
    (Genre::Classical, "classical"),
    (Genre::Electronic, "electronic"),
    (Genre::HipHop, "hip hop"),
    (Genre::Ambient, "ambient"),
];

/// Built-in tempo words. Earlier entries win when several match.
pub static TEMPOS: &TempoTable = &[("slow", 60), ("moderate", 100), ("fast", 140), ("upbeat", 120)];

/// Structured signals extracted from a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptAnalysis {
    pub instruments: BTreeSet<Instrument>,
    pub genre: Option<Genre>,
    pub tempo_bpm: Option<u32>,
}

impl PromptAnalysis {
    /// Returns true if the instrument was detected.
    pub fn has(&self, instrument: Instrument) -> bool {
        self.instruments.contains(&instrument)
    }
}

/// Keyword-table analyzer.
#[derive(Debug, Clone, Copy)]
pub struct PromptAnalyzer {
    instruments: &'static InstrumentTable,
    genres: &'static GenreTable,
    tempos: &'static TempoTable,
}

impl PromptAnalyzer {
    /// Creates an analyzer over custom tables.
    pub fn new(
        instruments: &'static InstrumentTable,
        genres: &'static GenreTable,
        tempos: &'static TempoTable,
    ) -> Self {
        Self {
            instruments,
            genres,
            tempos,
        }
    }

    /// Analyzes a sanitized prompt.
    pub fn analyze(&self, prompt: &CleanPrompt) -> PromptAnalysis {
        let text = prompt.to_lowercase();

        let instruments = self
            .instruments
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(instrument, _)| *instrument)
            .collect();

        let genre = self
            .genres
            .iter()
            .find(|(_, keyword)| text.contains(keyword))
            .map(|(genre, _)| *genre);

        let tempo_bpm = self
            .tempos
            .iter()
            .find(|(word, _)| text.contains(word))
            .map(|(_, bpm)| *bpm);

        PromptAnalysis {
            instruments,
            genre,
            tempo_bpm,
        }
    }
}

impl Default for PromptAnalyzer {
    fn default() -> Self {
        Self::new(INSTRUMENTS, GENRES, TEMPOS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> PromptAnalysis {
        PromptAnalyzer::default().analyze(&CleanPrompt::sanitize(text).unwrap())
    }

    #[test]
    fn detects_multiple_instruments() {
        let analysis = analyze("Fast drums and bass");
        assert!(analysis.has(Instrument::Drums));
        assert!(analysis.has(Instrument::Bass));
        assert_eq!(analysis.instruments.len(), 2);
        assert_eq!(analysis.tempo_bpm, Some(140));
    }

    #[test]
    fn keywords_collapse_to_one_instrument() {
        let analysis = analyze("piano on the keyboard, soft keys");
        assert_eq!(analysis.instruments, BTreeSet::from([Instrument::Piano]));
    }

    #[test]
    fn genre_follows_table_order_not_text_position() {
        let analysis = analyze("ambient jazz with a hint of rock");
        assert_eq!(analysis.genre, Some(Genre::Rock));
    }

    #[test]
    fn multi_word_genre() {
        assert_eq!(analyze("chill HIP HOP loop").genre, Some(Genre::HipHop));
    }

    #[test]
    fn tempo_follows_table_order() {
        assert_eq!(analyze("upbeat but slow").tempo_bpm, Some(60));
        assert_eq!(analyze("upbeat").tempo_bpm, Some(120));
    }

    #[test]
    fn no_keywords_yields_empty_analysis() {
        assert_eq!(analyze("something calm for the evening"), PromptAnalysis::default());
    }

    #[test]
    fn analysis_is_deterministic() {
        assert_eq!(analyze("slow jazz piano"), analyze("slow jazz piano"));
    }

    #[test]
    fn custom_tables() {
        static ONLY_SYNTH: &InstrumentTable = &[(Instrument::Synth, &["moog"])];
        let analyzer = PromptAnalyzer::new(ONLY_SYNTH, &[], &[]);
        let analysis = analyzer.analyze(&CleanPrompt::sanitize("moog and piano").unwrap());
        assert_eq!(analysis.instruments, BTreeSet::from([Instrument::Synth]));
        assert_eq!(analysis.genre, None);
    }
}
