use super::generation_repository::GenerationRepository;
use crate::domain::story::GenerationRequest;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateChatCompletionRequest, CreateChatCompletionResponse},
    Client,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// OpenAI vision chat implementation of the generation repository
pub struct OpenAiGenerationRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    max_tokens: u32,
}

impl OpenAiGenerationRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    /// One user message with the instruction text and the image as a data URL
    fn build_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<CreateChatCompletionRequest, String> {
        let payload = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": request.instruction() },
                        { "type": "image_url", "image_url": { "url": request.image_data_url() } }
                    ]
                }
            ]
        });

        serde_json::from_value(payload).map_err(|e| format!("Invalid generation request: {}", e))
    }
}

/// Text of the first choice; a choice without content is an empty reply
fn first_choice_text(response: CreateChatCompletionResponse) -> Result<String, String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| "Generation response has no choices".to_string())?;

    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl GenerationRepository for OpenAiGenerationRepository {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, String> {
        let start_time = std::time::Instant::now();
        let (width, height) = request.dimensions();

        tracing::info!(
            model = %self.model,
            theme = %request.theme(),
            image_width = width,
            image_height = height,
            image_size = request.image_jpeg().len(),
            "Calling OpenAI chat completion"
        );

        let chat_request = self.build_request(request)?;
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    latency_ms = start_time.elapsed().as_millis(),
                    "OpenAI chat completion failed"
                );
                format!("OpenAI generation error: {}", e)
            })?;

        let usage = response.usage.clone();
        let text = first_choice_text(response)?;

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            response_length = text.len(),
            prompt_tokens = usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = usage.as_ref().map(|u| u.completion_tokens),
            "Generation completed"
        );

        Ok(text)
    }
}
