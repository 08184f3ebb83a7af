use async_openai::{config::OpenAIConfig, Client};
use imagestory_backend::controllers::story::StoryController;
use imagestory_backend::domain::story::StoryService;
use imagestory_backend::domain::voice::{VoiceCatalogRepository, VoiceRecommender};
use imagestory_backend::infrastructure::config::{Config, LogFormat, VoiceCatalogSource};
use imagestory_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use imagestory_backend::infrastructure::http::{build_app, start_http_server};
use imagestory_backend::infrastructure::repositories::{
    BuiltinVoiceCatalogRepository, ElevenLabsSpeechRepository, OpenAiGenerationRepository,
    PgStoryRepository, PgVoiceCatalogRepository, StoryRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting ImageStory Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database connection verified and migrations applied");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Provider clients and repositories
    tracing::info!(
        model = %config.generation_model,
        api_base = %config.openai_api_base,
        "Instantiating generation client"
    );
    let openai_client = Arc::new(Client::with_config(
        OpenAIConfig::new()
            .with_api_key(config.openai_api_key.clone())
            .with_api_base(config.openai_api_base.clone()),
    ));
    let generation_repo = Arc::new(OpenAiGenerationRepository::new(
        openai_client,
        config.generation_model.clone(),
        config.generation_max_tokens,
    ));
    let speech_repo = Arc::new(ElevenLabsSpeechRepository::new(
        config.elevenlabs_api_key.clone(),
        config.elevenlabs_base_url.clone(),
        config.elevenlabs_model_id.clone(),
        config.speech_timeout(),
    )?);
    let catalog_repo: Arc<dyn VoiceCatalogRepository> = match config.voice_catalog {
        VoiceCatalogSource::Builtin => Arc::new(BuiltinVoiceCatalogRepository::new()),
        VoiceCatalogSource::Database => Arc::new(PgVoiceCatalogRepository::new(pool.clone())),
    };
    tracing::info!(source = ?config.voice_catalog, "Voice catalog configured");
    let story_repo: Arc<dyn StoryRepository> = Arc::new(PgStoryRepository::new(pool.clone()));

    // 2. Services
    tracing::info!("Instantiating services...");
    let story_service = Arc::new(StoryService::new(
        generation_repo,
        catalog_repo,
        speech_repo,
        story_repo.clone(),
        VoiceRecommender::default(),
        config.generation_timeout(),
    ));

    // 3. Controllers
    tracing::info!("Instantiating controllers...");
    let story_controller = Arc::new(StoryController::new(story_service, config.max_image_bytes));

    let app = build_app(story_controller, story_repo, config.max_image_bytes);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
