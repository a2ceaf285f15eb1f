// Library interface for moodrs modules
// The binary and integration tests both go through these exports

pub mod affinity;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod ranking;
pub mod scoring;
pub mod service;
pub mod snapshot;
pub mod statistics;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::AppConfig;
pub use engine::{EngineConfig, RecommendationEngine, RecommendationRequest};
pub use error::{ImportError, MoodRsError, Result, SnapshotError};
pub use import::{CsvImporter, ImportFormat, ImportManager};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use scoring::{MoodProfile, RecommendationScorer, ScoringStrategy};
pub use service::MoodService;
pub use snapshot::{MoodDataSource, SnapshotDocument, SnapshotStore};
pub use statistics::{compute_statistics, StatisticsAggregator};
pub use validation::{MoodEntryValidator, ValidationReport};
