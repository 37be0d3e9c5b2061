pub mod config;
pub mod scoring;

pub use config::ScoringConfig;
pub use scoring::{engagement_fingerprint, engagement_score, EngagementSignals};
