use crate::domain::story::GenerationRequest;
use async_trait::async_trait;

/// Repository for story generation.
/// Abstracts the vision-and-text provider (OpenAI chat completions today).
#[async_trait]
pub trait GenerationRepository: Send + Sync {
    /// Send the instruction and image, return the raw text of the reply
    ///
    /// The reply is free-form and may or may not contain the requested object.
    ///
    /// # Errors
    /// Transport, authentication, quota and provider failures
    async fn generate(&self, request: &GenerationRequest) -> Result<String, String>;
}
