use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StoryServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("story not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for StoryServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) | AppError::PayloadTooLarge(msg) => {
                StoryServiceError::Validation(msg)
            }
            AppError::NotFound(_) => StoryServiceError::NotFound,
            AppError::ExternalService(msg) => StoryServiceError::Generation(msg),
            _ => StoryServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<StoryServiceError> for AppError {
    fn from(err: StoryServiceError) -> Self {
        match err {
            StoryServiceError::Validation(msg) => AppError::BadRequest(msg),
            StoryServiceError::NotFound => AppError::NotFound("Story not found".to_string()),
            StoryServiceError::Generation(msg) => AppError::ExternalService(msg),
            StoryServiceError::Dependency(msg) => AppError::Internal(msg),
            StoryServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
