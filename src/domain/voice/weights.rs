use crate::domain::story::Theme;
use std::collections::HashMap;

/// Weight used when a theme/voice-type pair has no table entry
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Per-theme, per-voice-type score multipliers.
///
/// Immutable once built; the recommender receives it through its config so
/// tests can swap in their own table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeWeights {
    entries: HashMap<(Theme, String), f64>,
}

impl ThemeWeights {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Builder-style insert; voice types are matched case-insensitively
    pub fn with(mut self, theme: Theme, voice_type: &str, weight: f64) -> Self {
        self.entries
            .insert((theme, voice_type.trim().to_lowercase()), weight);
        self
    }

    /// Table entry for the pair, if any
    pub fn get(&self, theme: Theme, voice_type: &str) -> Option<f64> {
        self.entries
            .get(&(theme, voice_type.trim().to_lowercase()))
            .copied()
    }

    /// Table entry or the neutral weight
    pub fn weight_for(&self, theme: Theme, voice_type: &str) -> f64 {
        self.get(theme, voice_type).unwrap_or(NEUTRAL_WEIGHT)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ThemeWeights {
    /// Stock table for the five built-in narration voices
    fn default() -> Self {
        const TABLE: [(Theme, [(&str, f64); 5]); 5] = [
            (
                Theme::Fantasy,
                [("rachel", 1.3), ("antoni", 1.0), ("domi", 0.9), ("bella", 1.2), ("elli", 1.1)],
            ),
            (
                Theme::Romance,
                [("rachel", 1.2), ("antoni", 1.1), ("domi", 0.8), ("bella", 1.4), ("elli", 1.0)],
            ),
            (
                Theme::SciFi,
                [("rachel", 1.0), ("antoni", 1.3), ("domi", 1.2), ("bella", 0.9), ("elli", 1.0)],
            ),
            (
                Theme::Horror,
                [("rachel", 0.8), ("antoni", 1.5), ("domi", 1.1), ("bella", 0.7), ("elli", 0.9)],
            ),
            (
                Theme::Comedy,
                [("rachel", 1.0), ("antoni", 0.9), ("domi", 1.3), ("bella", 1.0), ("elli", 1.5)],
            ),
        ];

        TABLE
            .iter()
            .fold(Self::empty(), |weights, (theme, row)| {
                row.iter().fold(weights, |weights, (voice_type, weight)| {
                    weights.with(*theme, voice_type, *weight)
                })
            })
    }
}
