use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Generation (OpenAI vision chat)
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub generation_model: String,
    pub generation_max_tokens: u32,
    pub generation_timeout_secs: u64,
    // Speech (ElevenLabs)
    pub elevenlabs_api_key: String,
    pub elevenlabs_base_url: String,
    pub elevenlabs_model_id: String,
    pub speech_timeout_secs: u64,
    // Voices
    pub voice_catalog: VoiceCatalogSource,
    // Uploads
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Where narration voices are listed from
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceCatalogSource {
    Builtin,
    Database,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_key: env::var("OPENAI_API_KEY")?,
            openai_api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            generation_model: env::var("GENERATION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            generation_max_tokens: env::var("GENERATION_MAX_TOKENS")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()?,
            generation_timeout_secs: env::var("GENERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()?,
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY")?,
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            elevenlabs_model_id: env::var("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            speech_timeout_secs: env::var("SPEECH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            voice_catalog: match env::var("VOICE_CATALOG")
                .unwrap_or_else(|_| "builtin".to_string())
                .to_lowercase()
                .as_str()
            {
                "database" => VoiceCatalogSource::Database,
                _ => VoiceCatalogSource::Builtin,
            },
            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .unwrap_or_else(|_| (15 * 1024 * 1024).to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "imagestory_backend=debug,tower_http=debug"
        } else {
            "imagestory_backend=info,tower_http=info"
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_secs(self.speech_timeout_secs)
    }
}
