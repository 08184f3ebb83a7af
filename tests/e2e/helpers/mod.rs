use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use imagestory_backend::controllers::story::StoryController;
use imagestory_backend::domain::story::StoryService;
use imagestory_backend::domain::voice::{VoiceCatalogRepository, VoiceRecommender};
use imagestory_backend::infrastructure::http::build_app;
use imagestory_backend::infrastructure::repositories::{
    BuiltinVoiceCatalogRepository, PgStoryRepository, PgVoiceCatalogRepository, StoryRepository,
};
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio::net::TcpListener;

pub mod api_client;
pub mod db_pool;

use api_client::TestClient;
use db_pool::{DatabasePool, LeasedDatabase};
use fakes::{
    GenerationReply, MemoryStoryRepository, ScriptedGeneration, ScriptedSpeech, SpeechReply,
};

/// Upload limit used by the test server
pub const TEST_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Generation call bound used by the test server
pub const TEST_GENERATION_TIMEOUT: Duration = Duration::from_millis(500);

/// A valid 640x480 PNG, base64-encoded
pub static PHOTO_BASE64: Lazy<String> = Lazy::new(|| BASE64.encode(png(640, 480)));

/// Audio returned by the scripted speech provider
pub const NARRATION_AUDIO: [u8; 5] = [0x49, 0x44, 0x33, 0x04, 0x00];

// Docker client for test containers
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

// Shared PostgreSQL container for the storage tests
static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(SharedContainer::new);

static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

pub fn story_reply(title: &str, text: &str) -> String {
    serde_json::json!({
        "title": title,
        "text": text,
        "averagePitch": 150.5,
        "pitchStdDev": 20.0,
        "mfccValues": [[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]]
    })
    .to_string()
}

fn scripted_providers() -> (Arc<ScriptedGeneration>, Arc<ScriptedSpeech>) {
    let generation = Arc::new(ScriptedGeneration::new(GenerationReply::Text(
        story_reply("숲속 모험", "옛날 옛적에 작은 숲에 여우가 살았어요."),
    )));
    let speech = Arc::new(ScriptedSpeech::new(SpeechReply::Audio(
        NARRATION_AUDIO.to_vec(),
    )));
    (generation, speech)
}

fn create_app(
    generation: Arc<ScriptedGeneration>,
    speech: Arc<ScriptedSpeech>,
    catalog: Arc<dyn VoiceCatalogRepository>,
    stories: Arc<dyn StoryRepository>,
) -> Router {
    let story_service = Arc::new(StoryService::new(
        generation,
        catalog,
        speech,
        stories.clone(),
        VoiceRecommender::default(),
        TEST_GENERATION_TIMEOUT,
    ));
    let story_controller = Arc::new(StoryController::new(
        story_service,
        TEST_MAX_IMAGE_BYTES,
    ));
    build_app(story_controller, stories, TEST_MAX_IMAGE_BYTES)
}

/// Serve the app on an ephemeral port and return its base URL
async fn spawn_app(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{}", addr)
}

/// Server wired with scripted providers and in-memory storage
pub struct TestContext {
    pub client: TestClient,
    pub generation: Arc<ScriptedGeneration>,
    pub speech: Arc<ScriptedSpeech>,
    pub stories: Arc<MemoryStoryRepository>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let (generation, speech) = scripted_providers();
            let stories = Arc::new(MemoryStoryRepository::new());

            let app = create_app(
                generation.clone(),
                speech.clone(),
                Arc::new(BuiltinVoiceCatalogRepository::new()),
                stories.clone(),
            );
            let base_url = spawn_app(app).await;

            Self {
                client: TestClient::new(&base_url),
                generation,
                speech,
                stories,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // In-memory collaborators are dropped with the context
        }
    }
}

/// Server backed by a migrated Postgres database, with the voice catalog
/// read from the `voices` table
pub struct PgTestContext {
    pub client: TestClient,
    pub pool: PgPool,
    pub stories: Arc<PgStoryRepository>,
    pub catalog: Arc<PgVoiceCatalogRepository>,
    pub generation: Arc<ScriptedGeneration>,
    pub speech: Arc<ScriptedSpeech>,
    _db: LeasedDatabase,
}

impl AsyncTestContext for PgTestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let leased_db = DB_POOL
                .lease()
                .await
                .expect("Failed to get database from pool");

            let shared_pool = Arc::new(leased_db.pool.clone());
            let stories = Arc::new(PgStoryRepository::new(shared_pool.clone()));
            let catalog = Arc::new(PgVoiceCatalogRepository::new(shared_pool));
            let (generation, speech) = scripted_providers();

            let app = create_app(
                generation.clone(),
                speech.clone(),
                catalog.clone(),
                stories.clone(),
            );
            let base_url = spawn_app(app).await;

            Self {
                client: TestClient::new(&base_url),
                pool: leased_db.pool.clone(),
                stories,
                catalog,
                generation,
                speech,
                _db: leased_db,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Database cleanup happens via Drop on LeasedDatabase
        }
    }
}
