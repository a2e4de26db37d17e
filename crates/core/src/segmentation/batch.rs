//! Order-preserving batch evaluation

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::customer::{CustomerRecord, RawCustomerRecord};
use crate::domain::profile::CustomerProfile;
use crate::errors::DomainError;

use super::cache::ProfileCache;
use super::classifier::Classifier;

/// Batches shorter than this are evaluated on the calling thread.
pub const DEFAULT_MIN_PARALLEL_LEN: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub account_code: String,
    pub reason: String,
    #[serde(skip)]
    pub error: DomainError,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub entries: Vec<Result<CustomerProfile, RecordFailure>>,
    pub evaluated_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn profiles(&self) -> impl Iterator<Item = &CustomerProfile> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordFailure> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    pub fn into_profiles(self) -> Vec<CustomerProfile> {
        self.entries.into_iter().filter_map(Result::ok).collect()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchEvaluator<'a> {
    classifier: &'a Classifier,
    cache: Option<&'a ProfileCache>,
    parallel: bool,
    min_parallel_len: usize,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self { classifier, cache: None, parallel: true, min_parallel_len: DEFAULT_MIN_PARALLEL_LEN }
    }

    pub fn with_cache(mut self, cache: &'a ProfileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_parallelism(mut self, parallel: bool, min_parallel_len: usize) -> Self {
        self.parallel = parallel;
        self.min_parallel_len = min_parallel_len;
        self
    }

    pub fn classify_batch(&self, records: &[CustomerRecord]) -> Vec<CustomerProfile> {
        let profiles: Vec<CustomerProfile> = if self.runs_parallel(records.len()) {
            records.par_iter().map(|record| self.evaluate(record)).collect()
        } else {
            records.iter().map(|record| self.evaluate(record)).collect()
        };

        debug!(
            event_name = "engine.batch.completed",
            records = records.len(),
            parallel = self.runs_parallel(records.len()),
            "batch classification completed"
        );
        profiles
    }

    /// Validate and classify raw rows. Rejected rows are reported in place
    /// and never stop the rest of the batch.
    pub fn evaluate_raw(&self, records: Vec<RawCustomerRecord>) -> BatchReport {
        let total = records.len();
        let parallel = self.runs_parallel(total);
        let run = |(index, raw): (usize, RawCustomerRecord)| self.evaluate_one(index, raw);

        let entries: Vec<Result<CustomerProfile, RecordFailure>> = if parallel {
            records.into_par_iter().enumerate().map(run).collect()
        } else {
            records.into_iter().enumerate().map(run).collect()
        };

        let report = BatchReport { entries, evaluated_at: Utc::now() };
        debug!(
            event_name = "engine.batch.completed",
            records = total,
            rejected = report.failure_count(),
            parallel,
            "raw batch evaluation completed"
        );
        report
    }

    fn evaluate_one(
        &self,
        index: usize,
        raw: RawCustomerRecord,
    ) -> Result<CustomerProfile, RecordFailure> {
        let account_code = raw.account_code.trim().to_owned();
        match CustomerRecord::try_from(raw) {
            Ok(record) => Ok(self.evaluate(&record)),
            Err(error) => {
                warn!(
                    event_name = "engine.batch.record_rejected",
                    index,
                    account_code = %account_code,
                    error = %error,
                    "customer record rejected"
                );
                Err(RecordFailure { index, account_code, reason: error.to_string(), error })
            }
        }
    }

    fn evaluate(&self, record: &CustomerRecord) -> CustomerProfile {
        match self.cache {
            Some(cache) => cache.get_or_classify(self.classifier, record),
            None => self.classifier.classify(record),
        }
    }

    fn runs_parallel(&self, len: usize) -> bool {
        self.parallel && len >= self.min_parallel_len.max(2)
    }
}

/// Classify every record with the default thresholds, preserving order.
pub fn classify_batch(records: &[CustomerRecord]) -> Vec<CustomerProfile> {
    BatchEvaluator::new(&Classifier::default()).classify_batch(records)
}
