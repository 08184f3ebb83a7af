pub mod catalog;
pub mod profile;
pub mod recommender;
pub mod weights;

pub use catalog::{CatalogVoice, VoiceCatalogRepository, VoiceId, CUSTOM_VOICE_TYPE};
pub use profile::{VoiceProfile, MFCC_LENGTH};
pub use recommender::{RecommenderConfig, VoiceRecommender};
pub use weights::ThemeWeights;
