use super::profile::VoiceProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Stable catalog key of a narration voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(pub i64);

impl VoiceId {
    /// Returned by the recommender when there is nothing to choose from
    pub const NONE: VoiceId = VoiceId(0);

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Voice-type tag given to user-recorded voices
pub const CUSTOM_VOICE_TYPE: &str = "custom";

/// One narration voice available for selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVoice {
    pub id: VoiceId,
    pub title: String,
    /// Key into the theme weight table ("rachel", "antoni", ..., "custom")
    pub voice_type: String,
    /// Speech provider voice id, when the voice carries one explicitly
    pub provider_voice_id: Option<String>,
    /// Reference profile, used only when profile similarity is enabled
    pub profile: Option<VoiceProfile>,
}

impl CatalogVoice {
    /// Normalized voice-type key used for weight lookups
    pub fn voice_type_key(&self) -> String {
        self.voice_type.trim().to_lowercase()
    }

    /// Cloned and recorded voices are tagged "custom" or "custom_<suffix>"
    pub fn is_custom(&self) -> bool {
        let key = self.voice_type_key();
        key == CUSTOM_VOICE_TYPE || key.starts_with("custom_")
    }
}

/// Read-only source of narration voices, shared across concurrent pipeline runs
#[async_trait]
pub trait VoiceCatalogRepository: Send + Sync {
    /// All voices in stable catalog order
    async fn list_all(&self) -> Result<Vec<CatalogVoice>, String>;
}
