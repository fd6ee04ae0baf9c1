use chrono::{DateTime, TimeZone};
use std::time::Duration;

/// Sliding expiry window for the swiped-ids set.
pub const SWIPE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key builder for the per-user exclusion sets.
///
/// The `allrandomuser` / `allrandomid` segments are shared with sibling
/// services reading the same cache; do not change them.
#[derive(Debug, Clone)]
pub struct CacheKey {
    namespace: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Key of the candidates already shown to `user_id` today.
    pub fn shown(&self, user_id: &str) -> String {
        format!("{}:allrandomuser:{}", self.namespace, user_id)
    }

    /// Key of the candidates `user_id` already swiped today.
    pub fn swiped(&self, user_id: &str) -> String {
        format!("{}:allrandomid:{}", self.namespace, user_id)
    }
}

/// Ordered set of candidate ids tracked for one user and one day-cycle.
///
/// The wire encoding is the comma-joined id list already present in the
/// cache; this type layers ordered-set semantics (append-only, no
/// duplicates) over it without changing the stored format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: Vec<String>,
}

impl ExclusionSet {
    /// Parse a cached value. Empty segments are dropped, so both the empty
    /// string and an absent key parse to the empty set.
    pub fn parse(value: &str) -> Self {
        let ids = value
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    pub fn encode(&self) -> String {
        self.ids.join(",")
    }

    /// Append an id unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|v| v == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

/// Remaining time until 23:59:59 local, so a set written at any point during
/// the day expires at the same day boundary. Never less than one second.
pub fn ttl_until_end_of_day<Tz: TimeZone>(now: DateTime<Tz>) -> Duration {
    let remaining = now
        .date_naive()
        .and_hms_opt(23, 59, 59)
        .map(|end| end - now.naive_local())
        .unwrap_or_else(chrono::TimeDelta::zero);

    remaining
        .to_std()
        .unwrap_or(Duration::from_secs(1))
        .max(Duration::from_secs(1))
}
