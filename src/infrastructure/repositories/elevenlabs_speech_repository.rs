use super::speech_repository::SpeechRepository;
use crate::domain::narration::VoiceSettings;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SpeechRequestBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// ElevenLabs text-to-speech implementation of the speech repository
pub struct ElevenLabsSpeechRepository {
    api_key: String,
    base_url: String,
    model_id: String,
    http_client: reqwest::Client,
}

impl ElevenLabsSpeechRepository {
    pub fn new(
        api_key: String,
        base_url: String,
        model_id: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_id,
            http_client,
        })
    }

    fn endpoint(&self, provider_voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, provider_voice_id)
    }
}

#[async_trait]
impl SpeechRepository for ElevenLabsSpeechRepository {
    async fn synthesize(
        &self,
        text: &str,
        provider_voice_id: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            provider_voice_id = provider_voice_id,
            model_id = %self.model_id,
            text_length = text.len(),
            "Calling ElevenLabs text-to-speech"
        );

        let body = SpeechRequestBody {
            text,
            model_id: &self.model_id,
            voice_settings: settings,
        };

        let response = self
            .http_client
            .post(self.endpoint(provider_voice_id))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("ElevenLabs request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!(
                "ElevenLabs returned {}: {}",
                status.as_u16(),
                error_text
            ));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read ElevenLabs audio: {}", e))?
            .to_vec();

        tracing::info!(
            provider = "elevenlabs",
            provider_voice_id = provider_voice_id,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio.len(),
            "Speech synthesis completed"
        );

        Ok(audio)
    }
}
