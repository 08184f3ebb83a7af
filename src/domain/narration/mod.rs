pub mod model;
pub mod service;

pub use model::{NarrationArtifact, VoiceSettings};
pub use service::{resolve_provider_voice_id, NarrationService};
