pub mod error;
pub mod model;
pub mod prompt;
pub mod repair;
pub mod service;

pub use error::StoryServiceError;
pub use model::{
    CreatedStory, DefaultedFields, GenerationRequest, NarrativeResult, RepairSource,
    StoredStory, StoryArtifact, Theme,
};
pub use service::{PipelineStage, StoryService, StoryServiceApi};
