use crate::domain::voice::VoiceId;
use serde::Serialize;

pub const DEFAULT_STABILITY: f32 = 0.5;
pub const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;

/// Fixed provider parameters sent with every synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: DEFAULT_STABILITY,
            similarity_boost: DEFAULT_SIMILARITY_BOOST,
        }
    }
}

/// Narration audio for one story. `audio` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationArtifact {
    pub voice_id: VoiceId,
    pub audio: Vec<u8>,
    /// Estimated from the narrated text, 0 when there is no text
    pub duration_ms: u64,
}
