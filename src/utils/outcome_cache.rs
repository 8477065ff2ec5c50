use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache;

use crate::attendance::normalizer::{AttendanceOutcome, AttendancePolicy, normalize_with};

/// Memoized normalizer outcomes keyed by the raw punch string.
///
/// Normalization is pure, so a cached outcome is valid for as long as the
/// policy stays the same; each cache is bound to one policy.
#[derive(Clone)]
pub struct OutcomeCache {
    policy: AttendancePolicy,
    cache: Cache<String, AttendanceOutcome>,
}

impl OutcomeCache {
    pub fn new(policy: AttendancePolicy, capacity: u64) -> Self {
        Self {
            policy,
            cache: Cache::builder()
                .max_capacity(capacity) // tune based on distinct punch strings per report
                .time_to_idle(Duration::from_secs(3600))
                .build(),
        }
    }

    pub fn policy(&self) -> &AttendancePolicy {
        &self.policy
    }

    /// Outcome for a single punch string
    pub async fn outcome(&self, fingerprints: &str) -> AttendanceOutcome {
        let policy = self.policy;
        self.cache
            .get_with(fingerprints.to_string(), async move {
                normalize_with(&policy, fingerprints)
            })
            .await
    }

    /// Outcomes in input order, looked up concurrently
    pub async fn outcomes(&self, fingerprints: &[&str]) -> Vec<AttendanceOutcome> {
        let lookups: Vec<_> = fingerprints.iter().map(|raw| self.outcome(raw)).collect();

        join_all(lookups).await
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
