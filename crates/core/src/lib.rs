pub mod config;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod segmentation;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use domain::customer::{CustomerRecord, NumericCell, RawCustomerRecord};
pub use domain::profile::{CustomerProfile, MatchedPattern, PatternId, RecommendedAction};
pub use domain::segment::{
    BcgSegment, LifecycleStage, PotentialLevel, Priority, RiskLevel, SalesSegment, TimeHorizon,
};
pub use errors::{ApplicationError, DomainError};
pub use ingest::{filter_by_manager, load_records, load_records_file, InputFormat, IngestError};
pub use segmentation::{
    classify, classify_batch, generate_comment, BatchEvaluator, BatchReport, Classifier,
    CommentContext, ProfileCache, Recommendation, SegmentationCriteria, SegmentationStats,
};
