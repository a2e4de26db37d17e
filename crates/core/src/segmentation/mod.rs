//! Customer segmentation engine
//!
//! Classifies a customer's monthly sales snapshot into a sales tier, a BCG
//! quadrant and a lifecycle stage, matches behavioural patterns, and derives
//! a potential score, a risk level and prioritized actions.

mod batch;
mod cache;
mod classifier;
mod comment;
mod criteria;
mod patterns;
mod stats;

pub use batch::{BatchEvaluator, BatchReport, RecordFailure, DEFAULT_MIN_PARALLEL_LEN};
pub use cache::{ProfileCache, DEFAULT_CACHE_ENTRIES};
pub use classifier::{assess_risk, derive_rates, growth_rate, sales_stability, Classifier, DerivedRates};
pub use comment::{generate_comment, lifecycle_comment, CommentContext, CommentSource, Recommendation};
pub use criteria::{
    BcgCriteria, LifecycleCriteria, SalesBreakpoints, SegmentationCriteria, DEFAULT_CRITERIA,
};
pub use patterns::{match_patterns, pattern_comment, AiPattern, PatternFacts, AI_PATTERNS};
pub use stats::{RiskCustomer, SegmentationStats, TopPerformer, TOP_PERFORMER_MIN_SCORE};

use crate::domain::customer::CustomerRecord;
use crate::domain::profile::CustomerProfile;

/// Classify one record with the default thresholds.
pub fn classify(record: &CustomerRecord) -> CustomerProfile {
    Classifier::default().classify(record)
}

/// Classify records with the default thresholds; output order matches input.
pub fn classify_batch(records: &[CustomerRecord]) -> Vec<CustomerProfile> {
    batch::classify_batch(records)
}
