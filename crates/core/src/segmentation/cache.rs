//! Injected memo of computed profiles
//!
//! Purely an optimization: an entry is only served when its stored input
//! and the criteria that produced it both match the request, so results are
//! identical with or without the cache.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::domain::customer::CustomerRecord;
use crate::domain::profile::CustomerProfile;

use super::classifier::Classifier;
use super::criteria::SegmentationCriteria;

pub const DEFAULT_CACHE_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct CachedProfile {
    criteria: SegmentationCriteria,
    profile: CustomerProfile,
}

#[derive(Debug)]
pub struct ProfileCache {
    entries: RwLock<HashMap<String, CachedProfile>>,
    max_entries: usize,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self { entries: RwLock::new(HashMap::new()), max_entries }
    }

    pub fn get_or_classify(&self, classifier: &Classifier, record: &CustomerRecord) -> CustomerProfile {
        if let Some(profile) = self.lookup(classifier, record) {
            return profile;
        }

        let profile = classifier.classify(record);
        self.store(classifier, &profile);
        profile
    }

    pub fn get(&self, account_code: &str) -> Option<CustomerProfile> {
        let entries = self.entries.read().ok()?;
        entries.get(account_code).map(|cached| cached.profile.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn lookup(&self, classifier: &Classifier, record: &CustomerRecord) -> Option<CustomerProfile> {
        let entries = self.entries.read().ok()?;
        entries
            .get(&record.account_code)
            .filter(|cached| {
                cached.criteria == *classifier.criteria() && cached.profile.record == *record
            })
            .map(|cached| cached.profile.clone())
    }

    fn store(&self, classifier: &Classifier, profile: &CustomerProfile) {
        // A poisoned lock only costs us memoization.
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        let code = profile.account_code();
        if !entries.contains_key(code) && entries.len() >= self.max_entries {
            debug!(
                event_name = "engine.cache.capacity_reached",
                account_code = code,
                max_entries = self.max_entries,
                "profile cache full, skipping insert"
            );
            return;
        }
        entries.insert(
            code.to_owned(),
            CachedProfile { criteria: *classifier.criteria(), profile: profile.clone() },
        );
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new()
    }
}
