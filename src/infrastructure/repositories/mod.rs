pub mod elevenlabs_speech_repository;
pub mod generation_repository;
pub mod openai_generation_repository;
pub mod pg_story_repository;
pub mod speech_repository;
pub mod story_repository;
pub mod voice_catalog_repository;

pub use elevenlabs_speech_repository::ElevenLabsSpeechRepository;
pub use generation_repository::GenerationRepository;
pub use openai_generation_repository::OpenAiGenerationRepository;
pub use pg_story_repository::PgStoryRepository;
pub use speech_repository::SpeechRepository;
pub use story_repository::StoryRepository;
pub use voice_catalog_repository::{BuiltinVoiceCatalogRepository, PgVoiceCatalogRepository};
