use crate::domain::story::{StoredStory, StoryArtifact};
use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage collaborator for finished stories.
///
/// Shared by every in-flight pipeline run, so implementations must be safe
/// for concurrent use.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Persist a complete artifact and return its id
    async fn persist_artifact(&self, artifact: &StoryArtifact) -> AppResult<Uuid>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StoredStory>>;

    /// Narration audio of a stored story
    async fn find_audio(&self, id: Uuid) -> AppResult<Option<Vec<u8>>>;

    /// Readiness check
    async fn check_connection(&self) -> AppResult<()>;
}
