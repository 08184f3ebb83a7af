use crate::domain::voice::{CatalogVoice, VoiceCatalogRepository, VoiceId, VoiceProfile};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

fn stock_voice(
    id: i64,
    title: &str,
    provider_voice_id: &str,
    average_pitch: f64,
    pitch_std_dev: f64,
) -> CatalogVoice {
    CatalogVoice {
        id: VoiceId(id),
        title: title.to_string(),
        voice_type: title.to_lowercase(),
        provider_voice_id: Some(provider_voice_id.to_string()),
        profile: Some(VoiceProfile::new(
            average_pitch,
            pitch_std_dev,
            vec![VoiceProfile::zero_vector()],
        )),
    }
}

static STOCK_VOICES: LazyLock<Vec<CatalogVoice>> = LazyLock::new(|| {
    vec![
        stock_voice(1, "Rachel", "21m00Tcm4TlvDq8ikWAM", 165.0, 15.0),
        stock_voice(2, "Domi", "AZnzlk1XvdvUeBnXmlld", 170.0, 18.0),
        stock_voice(3, "Bella", "EXAVITQu4vr4xnSDxMaL", 155.0, 14.0),
        stock_voice(4, "Antoni", "ErXwobaYiN019PkySvjV", 110.0, 12.0),
        stock_voice(5, "Elli", "MF3mGyEYCl7XYWbV9V6O", 160.0, 16.0),
    ]
});

/// The five stock narration voices, always available
pub struct BuiltinVoiceCatalogRepository;

impl BuiltinVoiceCatalogRepository {
    pub fn new() -> Self {
        debug_assert_eq!(STOCK_VOICES.len(), 5, "Must have exactly 5 stock voices");
        debug_assert_eq!(
            STOCK_VOICES.iter().map(|v| v.id).collect::<HashSet<_>>().len(),
            STOCK_VOICES.len(),
            "Stock voice ids must be unique"
        );

        Self
    }
}

impl Default for BuiltinVoiceCatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceCatalogRepository for BuiltinVoiceCatalogRepository {
    async fn list_all(&self) -> Result<Vec<CatalogVoice>, String> {
        Ok(STOCK_VOICES.clone())
    }
}

#[derive(Debug, FromRow)]
struct VoiceRow {
    id: i64,
    title: String,
    voice_type: String,
    provider_voice_id: Option<String>,
    /// Decoded per row so one bad profile can't fail the whole listing
    profile: Option<Json<serde_json::Value>>,
}

impl From<VoiceRow> for CatalogVoice {
    fn from(row: VoiceRow) -> Self {
        let profile = row.profile.and_then(|Json(value)| {
            serde_json::from_value::<VoiceProfile>(value)
                .map_err(|e| {
                    tracing::warn!(
                        voice_id = row.id,
                        error = %e,
                        "Stored voice profile is malformed, listing voice without it"
                    );
                })
                .ok()
        });

        Self {
            id: VoiceId(row.id),
            title: row.title,
            voice_type: row.voice_type,
            provider_voice_id: row.provider_voice_id,
            profile,
        }
    }
}

/// Voices stored in the `voices` table, including recorded custom voices
pub struct PgVoiceCatalogRepository {
    pool: Arc<DbPool>,
}

impl PgVoiceCatalogRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoiceCatalogRepository for PgVoiceCatalogRepository {
    async fn list_all(&self) -> Result<Vec<CatalogVoice>, String> {
        let pool = self.pool.as_ref();
        let rows = sqlx::query_as::<_, VoiceRow>(
            r#"
            SELECT id, title, voice_type, provider_voice_id, profile
            FROM voices
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| format!("Failed to list voices: {}", e))?;

        Ok(rows.into_iter().map(CatalogVoice::from).collect())
    }
}
