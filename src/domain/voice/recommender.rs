use super::catalog::{CatalogVoice, VoiceId};
use super::profile::VoiceProfile;
use super::weights::ThemeWeights;
use crate::domain::story::Theme;

/// Score for voices tagged "custom", regardless of theme
pub const CUSTOM_VOICE_SCORE: f64 = 0.8;

/// Score for voices whose metadata can't be scored
pub const FALLBACK_VOICE_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    pub weights: ThemeWeights,
    pub custom_score: f64,
    pub fallback_score: f64,
    /// Share of the score driven by profile similarity, 0.0 to 1.0.
    /// At 0.0 only theme and voice type matter.
    pub profile_weight: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            weights: ThemeWeights::default(),
            custom_score: CUSTOM_VOICE_SCORE,
            fallback_score: FALLBACK_VOICE_SCORE,
            profile_weight: 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum ScoringError {
    #[error("voice {0} has no voice type")]
    MissingVoiceType(VoiceId),
    #[error("voice id {0} is reserved")]
    ReservedId(VoiceId),
    #[error("weight {weight} for {voice_type} is not a positive number")]
    InvalidWeight { voice_type: String, weight: f64 },
}

/// Picks the narration voice that best suits a theme
#[derive(Debug, Clone, Default)]
pub struct VoiceRecommender {
    config: RecommenderConfig,
}

impl VoiceRecommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Highest-scoring voice in the catalog, `VoiceId::NONE` for an empty one.
    ///
    /// Ties go to the voice listed first. Never fails: voices that can't be
    /// scored get the fallback score instead.
    pub fn recommend(
        &self,
        theme: Theme,
        target: &VoiceProfile,
        catalog: &[CatalogVoice],
    ) -> VoiceId {
        let mut best: Option<(VoiceId, f64)> = None;

        for voice in catalog {
            let score = match self.score_voice(theme, target, voice) {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!(
                        voice_id = %voice.id,
                        error = %e,
                        fallback_score = self.config.fallback_score,
                        "Voice could not be scored"
                    );
                    self.config.fallback_score
                }
            };

            tracing::debug!(
                voice_id = %voice.id,
                voice_type = %voice.voice_type,
                score,
                "Voice scored"
            );

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((voice.id, score)),
            }
        }

        match best {
            Some((voice_id, score)) => {
                tracing::info!(
                    theme = %theme,
                    voice_id = %voice_id,
                    score,
                    candidates = catalog.len(),
                    "Voice recommended"
                );
                voice_id
            }
            None => {
                tracing::warn!(theme = %theme, "Voice catalog is empty, no voice recommended");
                VoiceId::NONE
            }
        }
    }

    fn score_voice(
        &self,
        theme: Theme,
        target: &VoiceProfile,
        voice: &CatalogVoice,
    ) -> Result<f64, ScoringError> {
        if voice.id.is_none() {
            return Err(ScoringError::ReservedId(voice.id));
        }

        let voice_type = voice.voice_type_key();
        if voice_type.is_empty() {
            return Err(ScoringError::MissingVoiceType(voice.id));
        }

        let base = if voice.is_custom() {
            self.config.custom_score
        } else {
            self.config.weights.weight_for(theme, &voice_type)
        };

        if !base.is_finite() || base <= 0.0 {
            return Err(ScoringError::InvalidWeight {
                voice_type,
                weight: base,
            });
        }

        let profile_weight = self.config.profile_weight.clamp(0.0, 1.0);
        if profile_weight == 0.0 {
            return Ok(base);
        }

        Ok(match &voice.profile {
            Some(profile) => {
                base * ((1.0 - profile_weight) + profile_weight * target.similarity(profile))
            }
            None => base,
        })
    }
}
