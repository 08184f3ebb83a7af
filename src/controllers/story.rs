use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::story::{CreatedStory, StoredStory, StoryServiceApi},
    error::{AppError, AppResult},
};

/// Request for POST /api/stories
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStoryRequest {
    pub theme: String,
    /// Base64 image, optionally as a `data:` URL
    pub image: String,
}

pub struct StoryController {
    story_service: Arc<dyn StoryServiceApi>,
    max_image_bytes: usize,
}

impl StoryController {
    pub fn new(story_service: Arc<dyn StoryServiceApi>, max_image_bytes: usize) -> Self {
        Self {
            story_service,
            max_image_bytes,
        }
    }

    /// POST /api/stories - Generate, narrate and store a story for an image
    pub async fn create_story(
        State(controller): State<Arc<StoryController>>,
        Json(request): Json<CreateStoryRequest>,
    ) -> AppResult<(StatusCode, Json<CreatedStory>)> {
        let image = decode_image(&request.image)?;

        if image.len() > controller.max_image_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image must be {} bytes or less",
                controller.max_image_bytes
            )));
        }

        let created = controller
            .story_service
            .create_story(&request.theme, image)
            .await?;

        Ok((StatusCode::CREATED, Json(created)))
    }

    /// GET /api/stories/:id
    pub async fn get_story(
        State(controller): State<Arc<StoryController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<Json<StoredStory>> {
        let story = controller.story_service.get_story(id).await?;
        Ok(Json(story))
    }

    /// GET /api/stories/:id/audio - Narration as MP3
    pub async fn get_audio(
        State(controller): State<Arc<StoryController>>,
        Path(id): Path<Uuid>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let audio = controller.story_service.get_audio(id).await?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));

        Ok((StatusCode::OK, headers, Body::from(audio)))
    }
}

fn decode_image(encoded: &str) -> AppResult<Vec<u8>> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(AppError::BadRequest("Image cannot be empty".to_string()));
    }

    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    BASE64
        .decode(payload)
        .map_err(|e| AppError::BadRequest(format!("Image is not valid base64: {}", e)))
}
