use super::model::{NarrationArtifact, VoiceSettings};
use crate::domain::voice::{CatalogVoice, VoiceId};
use crate::infrastructure::repositories::SpeechRepository;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

const CHARACTERS_PER_MINUTE: u64 = 1000;

/// Filler audio is this many bytes plus one byte per ten characters
pub const FILLER_BASE_BYTES: usize = 1000;

/// Rachel, used whenever no better provider voice is known
pub const DEFAULT_PROVIDER_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

const STOCK_PROVIDER_VOICES: [(i64, &str); 5] = [
    (1, "21m00Tcm4TlvDq8ikWAM"), // Rachel
    (2, "AZnzlk1XvdvUeBnXmlld"), // Domi
    (3, "EXAVITQu4vr4xnSDxMaL"), // Bella
    (4, "ErXwobaYiN019PkySvjV"), // Antoni
    (5, "MF3mGyEYCl7XYWbV9V6O"), // Elli
];

/// Provider voice for a catalog voice.
///
/// An explicit provider id on the catalog entry wins, then the stock id
/// table, then the default voice. The sentinel id resolves to the default.
pub fn resolve_provider_voice_id(voice_id: VoiceId, catalog: &[CatalogVoice]) -> String {
    let explicit = catalog
        .iter()
        .find(|voice| voice.id == voice_id)
        .and_then(|voice| voice.provider_voice_id.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty());

    if let Some(provider_voice_id) = explicit {
        return provider_voice_id.to_string();
    }

    STOCK_PROVIDER_VOICES
        .iter()
        .find(|(id, _)| *id == voice_id.0)
        .map(|(_, provider_voice_id)| *provider_voice_id)
        .unwrap_or(DEFAULT_PROVIDER_VOICE_ID)
        .to_string()
}

/// Number of filler bytes for a text of `text_length` characters
pub fn filler_length(text_length: usize) -> usize {
    FILLER_BASE_BYTES + text_length / 10
}

/// Pseudo-random bytes standing in for audio the provider didn't deliver
pub fn filler_audio(text_length: usize) -> Vec<u8> {
    let mut audio = vec![0u8; filler_length(text_length)];
    rand::thread_rng().fill(&mut audio[..]);
    audio
}

/// Reading time at a fixed characters-per-minute rate
pub fn estimate_duration_ms(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars * 60_000 / CHARACTERS_PER_MINUTE
}

pub struct NarrationService {
    speech_repo: Arc<dyn SpeechRepository>,
    settings: VoiceSettings,
}

impl NarrationService {
    pub fn new(speech_repo: Arc<dyn SpeechRepository>) -> Self {
        Self {
            speech_repo,
            settings: VoiceSettings::default(),
        }
    }

    /// Narrate `text` with the chosen voice. Never fails and never returns empty audio.
    ///
    /// Provider errors and empty payloads are replaced with filler audio of
    /// `1000 + chars / 10` bytes; callers get no signal that this happened.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: VoiceId,
        catalog: &[CatalogVoice],
    ) -> NarrationArtifact {
        let provider_voice_id = resolve_provider_voice_id(voice_id, catalog);
        let text_length = text.chars().count();
        let started = Instant::now();

        let audio = self.call_provider(text, &provider_voice_id).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let audio = if audio.is_empty() {
            let filler = filler_audio(text_length);
            tracing::warn!(
                voice_id = %voice_id,
                provider_voice_id = %provider_voice_id,
                text_length,
                filler_size = filler.len(),
                latency_ms,
                "No narration audio received, using filler audio"
            );
            filler
        } else {
            tracing::info!(
                voice_id = %voice_id,
                provider_voice_id = %provider_voice_id,
                text_length,
                audio_size = audio.len(),
                latency_ms,
                "Narration synthesized"
            );
            audio
        };

        NarrationArtifact {
            voice_id,
            audio,
            duration_ms: estimate_duration_ms(text),
        }
    }

    /// Provider call with errors folded into an empty payload
    async fn call_provider(&self, text: &str, provider_voice_id: &str) -> Vec<u8> {
        self.speech_repo
            .synthesize(text, provider_voice_id, &self.settings)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(
                    provider_voice_id = %provider_voice_id,
                    error = %e,
                    "Speech provider call failed"
                );
                Vec::new()
            })
    }
}
