use crate::domain::narration::NarrationArtifact;
use crate::domain::voice::{VoiceId, VoiceProfile};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Narrative genre chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "fantasy")]
    Fantasy,
    #[serde(rename = "romance")]
    Romance,
    #[serde(rename = "sci-fi")]
    SciFi,
    #[serde(rename = "horror")]
    Horror,
    #[serde(rename = "comedy")]
    Comedy,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Fantasy,
        Theme::Romance,
        Theme::SciFi,
        Theme::Horror,
        Theme::Comedy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Fantasy => "fantasy",
            Theme::Romance => "romance",
            Theme::SciFi => "sci-fi",
            Theme::Horror => "horror",
            Theme::Comedy => "comedy",
        }
    }

    /// Parse an English theme id or one of the Korean UI labels
    pub fn from_label(label: &str) -> Option<Theme> {
        let label = label.trim();
        match label.to_lowercase().as_str() {
            "fantasy" | "판타지" => Some(Theme::Fantasy),
            "romance" | "love" | "사랑" => Some(Theme::Romance),
            "sci-fi" | "scifi" | "sf" => Some(Theme::SciFi),
            "horror" | "공포" => Some(Theme::Horror),
            "comedy" | "코미디" => Some(Theme::Comedy),
            _ => None,
        }
    }

    /// Like `from_label`, but unrecognized labels fall back to fantasy
    pub fn resolve(label: &str) -> Theme {
        Self::from_label(label).unwrap_or_else(|| {
            tracing::warn!(theme = label, "Unrecognized theme, using fantasy");
            Theme::Fantasy
        })
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the generation service needs for one run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    theme: Theme,
    instruction: String,
    image_jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

impl GenerationRequest {
    pub(crate) fn new(
        theme: Theme,
        instruction: String,
        image_jpeg: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            theme,
            instruction,
            image_jpeg,
            width,
            height,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// JPEG bytes of the preprocessed image
    pub fn image_jpeg(&self) -> &[u8] {
        &self.image_jpeg
    }

    /// Dimensions of the preprocessed image
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn encoded_image(&self) -> String {
        BASE64.encode(&self.image_jpeg)
    }

    pub fn image_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.encoded_image())
    }
}

/// Which branch of the repair chain produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairSource {
    /// "**Story: title**" marker at the start of the text
    LegacyDelimiter,
    /// Well-formed object decoded against the expected schema
    StrictObject,
    /// Object decoded with type coercion or regex field extraction
    PermissiveObject,
    /// No usable object; the whole text became the body
    PlainText,
    /// Nothing to work with
    Empty,
}

impl RepairSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairSource::LegacyDelimiter => "legacy_delimiter",
            RepairSource::StrictObject => "strict_object",
            RepairSource::PermissiveObject => "permissive_object",
            RepairSource::PlainText => "plain_text",
            RepairSource::Empty => "empty",
        }
    }

    pub fn parse(value: &str) -> Option<RepairSource> {
        match value {
            "legacy_delimiter" => Some(RepairSource::LegacyDelimiter),
            "strict_object" => Some(RepairSource::StrictObject),
            "permissive_object" => Some(RepairSource::PermissiveObject),
            "plain_text" => Some(RepairSource::PlainText),
            "empty" => Some(RepairSource::Empty),
            _ => None,
        }
    }
}

/// Per-field record of what was substituted with a documented default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultedFields {
    pub title: bool,
    pub body: bool,
    pub average_pitch: bool,
    pub pitch_std_dev: bool,
    pub mfcc_values: bool,
}

impl DefaultedFields {
    pub fn all_voice_fields(title: bool, body: bool) -> Self {
        Self {
            title,
            body,
            average_pitch: true,
            pitch_std_dev: true,
            mfcc_values: true,
        }
    }
}

/// Story recovered from a generation response
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeResult {
    pub title: String,
    pub body: String,
    /// Untouched generation output, kept for diagnostics
    pub raw_text: String,
    pub voice_profile: VoiceProfile,
    pub source: RepairSource,
    pub defaulted: DefaultedFields,
}

/// What the pipeline hands back to the caller after persisting
#[derive(Debug, Clone, Serialize)]
pub struct CreatedStory {
    pub id: Uuid,
    pub title: String,
    pub theme: Theme,
    pub voice_id: VoiceId,
    pub duration_ms: u64,
    pub audio_size_bytes: usize,
    pub repair_source: RepairSource,
    pub defaulted: DefaultedFields,
}

/// Complete output of a successful run, handed to storage exactly once
#[derive(Debug, Clone)]
pub struct StoryArtifact {
    pub theme: Theme,
    pub narrative: NarrativeResult,
    pub narration: NarrationArtifact,
    /// Preprocessed JPEG that was sent for generation
    pub image_jpeg: Vec<u8>,
}

/// A persisted story as read back from storage, without the audio bytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredStory {
    pub id: Uuid,
    pub title: String,
    pub theme: Theme,
    pub voice_id: VoiceId,
    pub body: String,
    pub voice_profile: VoiceProfile,
    pub duration_ms: u64,
    pub audio_size_bytes: usize,
    pub repair_source: RepairSource,
    pub created_at: DateTime<Utc>,
}
