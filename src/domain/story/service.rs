use super::error::StoryServiceError;
use super::model::{CreatedStory, GenerationRequest, StoredStory, StoryArtifact, Theme};
use super::{prompt, repair};
use crate::domain::narration::NarrationService;
use crate::domain::voice::{CatalogVoice, VoiceCatalogRepository, VoiceRecommender};
use crate::infrastructure::repositories::{GenerationRepository, SpeechRepository, StoryRepository};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Smallest accepted width and height of an uploaded image
pub const MIN_IMAGE_DIMENSION: u32 = 100;

/// Largest accepted width or height of an uploaded image, before downscaling
pub const MAX_UPLOAD_DIMENSION: u32 = 4096;

/// Fixed sequence a run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Prompting,
    Generating,
    Repairing,
    Recommending,
    Synthesizing,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Prompting => "prompting",
            PipelineStage::Generating => "generating",
            PipelineStage::Repairing => "repairing",
            PipelineStage::Recommending => "recommending",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn enter_stage(run_id: Uuid, stage: PipelineStage) {
    tracing::debug!(run_id = %run_id, stage = %stage, "Pipeline stage started");
}

/// Decode the upload and check its dimensions
pub fn validate_image(bytes: &[u8]) -> Result<DynamicImage, StoryServiceError> {
    if bytes.is_empty() {
        return Err(StoryServiceError::Validation("Image cannot be empty".to_string()));
    }

    let image = image::load_from_memory(bytes).map_err(|e| {
        tracing::warn!(error = %e, size = bytes.len(), "Image could not be decoded");
        StoryServiceError::Validation("Image could not be decoded".to_string())
    })?;

    let (width, height) = image.dimensions();
    if width < MIN_IMAGE_DIMENSION || height < MIN_IMAGE_DIMENSION {
        return Err(StoryServiceError::Validation(format!(
            "Image must be at least {}x{} pixels, got {}x{}",
            MIN_IMAGE_DIMENSION, MIN_IMAGE_DIMENSION, width, height
        )));
    }
    if width > MAX_UPLOAD_DIMENSION || height > MAX_UPLOAD_DIMENSION {
        return Err(StoryServiceError::Validation(format!(
            "Image must be at most {}x{} pixels, got {}x{}",
            MAX_UPLOAD_DIMENSION, MAX_UPLOAD_DIMENSION, width, height
        )));
    }

    Ok(image)
}

pub struct StoryService {
    generation_repo: Arc<dyn GenerationRepository>,
    catalog_repo: Arc<dyn VoiceCatalogRepository>,
    story_repo: Arc<dyn StoryRepository>,
    narration: NarrationService,
    recommender: VoiceRecommender,
    generation_timeout: Duration,
}

impl StoryService {
    pub fn new(
        generation_repo: Arc<dyn GenerationRepository>,
        catalog_repo: Arc<dyn VoiceCatalogRepository>,
        speech_repo: Arc<dyn SpeechRepository>,
        story_repo: Arc<dyn StoryRepository>,
        recommender: VoiceRecommender,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            generation_repo,
            catalog_repo,
            story_repo,
            narration: NarrationService::new(speech_repo),
            recommender,
            generation_timeout,
        }
    }
}

#[async_trait]
pub trait StoryServiceApi: Send + Sync {
    /// Run the whole pipeline for one upload
    ///
    /// This operation:
    /// - Validates the image (decodable, 100x100 up to 4096x4096)
    /// - Builds the themed instruction and calls the generation service once
    /// - Repairs the reply, picks a narration voice, synthesizes narration
    /// - Persists the finished artifact exactly once
    ///
    /// Only validation, generation and storage failures are returned as errors.
    async fn create_story(
        &self,
        theme: &str,
        image: Vec<u8>,
    ) -> Result<CreatedStory, StoryServiceError>;

    async fn get_story(&self, id: Uuid) -> Result<StoredStory, StoryServiceError>;

    async fn get_audio(&self, id: Uuid) -> Result<Vec<u8>, StoryServiceError>;
}

#[async_trait]
impl StoryServiceApi for StoryService {
    async fn create_story(
        &self,
        theme: &str,
        image: Vec<u8>,
    ) -> Result<CreatedStory, StoryServiceError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let theme = Theme::resolve(theme);

        tracing::info!(
            run_id = %run_id,
            theme = %theme,
            image_size = image.len(),
            "Story pipeline started"
        );

        // 1. Validate and build the request off the async workers
        let request = self.prepare_request(run_id, theme, image).await?;

        // 2. Single generation attempt, bounded by the timeout
        enter_stage(run_id, PipelineStage::Generating);
        let raw = self.generate(&request).await?;

        // 3. Repair never fails
        enter_stage(run_id, PipelineStage::Repairing);
        let narrative = repair::repair(&raw);
        tracing::info!(
            run_id = %run_id,
            source = narrative.source.as_str(),
            title = %narrative.title,
            body_length = narrative.body.chars().count(),
            defaulted = ?narrative.defaulted,
            "Generation response repaired"
        );

        // 4. Recommend from whatever the catalog offers
        enter_stage(run_id, PipelineStage::Recommending);
        let catalog = self.list_catalog().await;
        let voice_id = self
            .recommender
            .recommend(theme, &narrative.voice_profile, &catalog);

        // 5. Narration always yields audio
        enter_stage(run_id, PipelineStage::Synthesizing);
        let narration = self
            .narration
            .synthesize(&narrative.body, voice_id, &catalog)
            .await;

        let artifact = StoryArtifact {
            theme,
            narrative,
            narration,
            image_jpeg: request.image_jpeg().to_vec(),
        };

        let id = self
            .story_repo
            .persist_artifact(&artifact)
            .await
            .map_err(|e| StoryServiceError::Dependency(e.to_string()))?;

        enter_stage(run_id, PipelineStage::Done);
        tracing::info!(
            run_id = %run_id,
            story_id = %id,
            voice_id = %artifact.narration.voice_id,
            latency_ms = started.elapsed().as_millis(),
            "Story pipeline completed"
        );

        Ok(CreatedStory {
            id,
            title: artifact.narrative.title,
            theme,
            voice_id: artifact.narration.voice_id,
            duration_ms: artifact.narration.duration_ms,
            audio_size_bytes: artifact.narration.audio.len(),
            repair_source: artifact.narrative.source,
            defaulted: artifact.narrative.defaulted,
        })
    }

    async fn get_story(&self, id: Uuid) -> Result<StoredStory, StoryServiceError> {
        self.story_repo
            .find_by_id(id)
            .await
            .map_err(|e| StoryServiceError::Dependency(e.to_string()))?
            .ok_or(StoryServiceError::NotFound)
    }

    async fn get_audio(&self, id: Uuid) -> Result<Vec<u8>, StoryServiceError> {
        self.story_repo
            .find_audio(id)
            .await
            .map_err(|e| StoryServiceError::Dependency(e.to_string()))?
            .ok_or(StoryServiceError::NotFound)
    }
}

impl StoryService {
    async fn prepare_request(
        &self,
        run_id: Uuid,
        theme: Theme,
        image: Vec<u8>,
    ) -> Result<GenerationRequest, StoryServiceError> {
        tokio::task::spawn_blocking(move || {
            let decoded = validate_image(&image)?;
            enter_stage(run_id, PipelineStage::Prompting);
            prompt::build(theme, decoded).map_err(|e| {
                StoryServiceError::Other(anyhow::anyhow!("Failed to encode image: {}", e))
            })
        })
        .await
        .map_err(|e| StoryServiceError::Other(anyhow::anyhow!("Image task failed: {}", e)))?
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, StoryServiceError> {
        match tokio::time::timeout(self.generation_timeout, self.generation_repo.generate(request))
            .await
        {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(StoryServiceError::Generation(e)),
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.generation_timeout.as_secs_f64(),
                    "Generation timed out"
                );
                Err(StoryServiceError::Generation(format!(
                    "Generation timed out after {:?}",
                    self.generation_timeout
                )))
            }
        }
    }

    /// A catalog that can't be listed counts as empty
    async fn list_catalog(&self) -> Vec<CatalogVoice> {
        self.catalog_repo.list_all().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Voice catalog unavailable, treating as empty");
            Vec::new()
        })
    }
}
