use crate::domain::narration::VoiceSettings;
use async_trait::async_trait;

/// Repository for narration synthesis.
/// Abstracts the underlying speech provider (ElevenLabs today).
///
/// Implementations make exactly one provider call per invocation and report
/// transport failures, non-success statuses and timeouts as `Err`.
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize `text` with the provider-specific voice
    ///
    /// Returns MP3 audio; may be empty if the provider sent no body.
    async fn synthesize(
        &self,
        text: &str,
        provider_voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, String>;
}
