use super::story_repository::StoryRepository;
use crate::domain::story::{RepairSource, StoredStory, StoryArtifact, Theme};
use crate::domain::voice::{VoiceId, VoiceProfile};
use crate::error::AppResult;
use crate::infrastructure::db::{self, DbPool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct StoryRow {
    id: Uuid,
    title: String,
    theme: String,
    voice_id: i64,
    body: String,
    voice_profile: Json<VoiceProfile>,
    duration_ms: i64,
    audio_size_bytes: i64,
    repair_source: String,
    created_at: DateTime<Utc>,
}

impl From<StoryRow> for StoredStory {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            theme: Theme::resolve(&row.theme),
            voice_id: VoiceId(row.voice_id),
            body: row.body,
            voice_profile: row.voice_profile.0,
            duration_ms: row.duration_ms.max(0) as u64,
            audio_size_bytes: row.audio_size_bytes.max(0) as usize,
            repair_source: RepairSource::parse(&row.repair_source)
                .unwrap_or(RepairSource::PlainText),
            created_at: row.created_at,
        }
    }
}

/// Postgres implementation of the story storage
pub struct PgStoryRepository {
    pool: Arc<DbPool>,
}

impl PgStoryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn persist_artifact(&self, artifact: &StoryArtifact) -> AppResult<Uuid> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();
        let narrative = &artifact.narrative;
        let narration = &artifact.narration;

        sqlx::query(
            r#"
            INSERT INTO stories (
                id, title, theme, voice_id, body, raw_text, image_jpeg, audio,
                duration_ms, voice_profile, repair_source, defaulted_fields, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(&narrative.title)
        .bind(artifact.theme.as_str())
        .bind(narration.voice_id.0)
        .bind(&narrative.body)
        .bind(&narrative.raw_text)
        .bind(&artifact.image_jpeg)
        .bind(&narration.audio)
        .bind(narration.duration_ms as i64)
        .bind(Json(&narrative.voice_profile))
        .bind(narrative.source.as_str())
        .bind(Json(&narrative.defaulted))
        .bind(now)
        .execute(pool)
        .await?;

        tracing::info!(
            story_id = %id,
            audio_size = narration.audio.len(),
            image_size = artifact.image_jpeg.len(),
            "Story persisted"
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StoredStory>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT id, title, theme, voice_id, body, voice_profile, duration_ms,
                   octet_length(audio)::BIGINT AS audio_size_bytes, repair_source, created_at
            FROM stories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(StoredStory::from))
    }

    async fn find_audio(&self, id: Uuid) -> AppResult<Option<Vec<u8>>> {
        let pool = self.pool.as_ref();
        let audio = sqlx::query_scalar::<_, Vec<u8>>(
            r#"
            SELECT audio
            FROM stories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(audio)
    }

    async fn check_connection(&self) -> AppResult<()> {
        db::check_connection(self.pool.as_ref()).await?;
        Ok(())
    }
}
