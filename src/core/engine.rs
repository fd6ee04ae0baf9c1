use chrono::Local;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::exclusion::{ttl_until_end_of_day, CacheKey, ExclusionSet, SWIPE_WINDOW};
use crate::core::quota;
use crate::core::traits::{CacheError, ExclusionCache, ProfileReader, StoreError};
use crate::models::{has_premium, CandidateProfile, SwipeInput};

/// Bounded retries for the compare-and-swap append; conflicts only occur
/// under concurrent requests for the same user.
const CAS_ATTEMPTS: usize = 3;

/// Errors surfaced by [`MatchingEngine`]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("no user found, please wait for tomorrow")]
    NoCandidate,

    #[error("daily swipe limit reached, purchase the premium package to keep swiping")]
    QuotaExceeded,

    #[error("already swiped")]
    AlreadySwiped,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Orchestrates the candidate store and the exclusion cache: answers "who
/// should this user see next" and "record that this user swiped id X",
/// enforcing the per-day exclusion and quota invariants.
pub struct MatchingEngine<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    keys: CacheKey,
}

impl<S, C> Clone for MatchingEngine<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            keys: self.keys.clone(),
        }
    }
}

impl<S, C> MatchingEngine<S, C>
where
    S: ProfileReader,
    C: ExclusionCache,
{
    pub fn new(store: Arc<S>, cache: Arc<C>, keys: CacheKey) -> Self {
        Self { store, cache, keys }
    }

    /// Pick one random candidate the user has not been shown today.
    ///
    /// The shown set is read best-effort (a miss or a failed read degrades to
    /// the empty set), the user's own id is always excluded, and on success
    /// the candidate id is appended to the set with an expiry at the end of
    /// the current calendar day. A `NoCandidate` outcome writes nothing.
    pub async fn next_candidate(&self, user_id: &str) -> Result<CandidateProfile, EngineError> {
        let key = self.keys.shown(user_id);
        let mut cached = self.read_best_effort(&key).await;

        let mut exclude = ExclusionSet::parse(cached.as_deref().unwrap_or_default()).into_vec();
        exclude.push(user_id.to_string());

        let profile = match self.store.random_profile(&exclude).await {
            Ok(profile) => profile,
            Err(StoreError::NotFound(_)) => return Err(EngineError::NoCandidate),
            Err(e) => return Err(e.into()),
        };

        debug!("picked candidate {} for user {}", profile.id, user_id);

        // Append under compare-and-swap so concurrent fetches by the same
        // user cannot drop each other's ids.
        for attempt in 0..CAS_ATTEMPTS {
            let mut set = ExclusionSet::parse(cached.as_deref().unwrap_or_default());
            set.insert(&profile.id);
            let ttl = ttl_until_end_of_day(Local::now());
            if self
                .cache
                .set_if_unchanged(&key, cached.as_deref(), &set.encode(), ttl)
                .await?
            {
                return Ok(profile);
            }
            debug!("shown-set conflict for user {} (attempt {})", user_id, attempt + 1);
            cached = self.read(&key).await?;
        }

        Err(CacheError::Backend("exclusion set contention".to_string()).into())
    }

    /// Record a swipe, enforcing the daily quota and the duplicate guard.
    ///
    /// The first tracked entry of the day is the user's own id; it marks the
    /// set as started and is never a candidate id. Quota and duplicate
    /// checks run only once the set exists, counting that sentinel, and the
    /// set expires a fixed 24 hours after the last write.
    pub async fn record_swipe(&self, user_id: &str, input: &SwipeInput) -> Result<(), EngineError> {
        if input.target_id.is_empty() {
            return Err(EngineError::Validation("id_swipe is required".to_string()));
        }

        let key = self.keys.swiped(user_id);
        let mut cached = self.read_best_effort(&key).await;

        let packages = self.store.owned_packages(user_id).await?;
        let premium = has_premium(&packages);

        for attempt in 0..CAS_ATTEMPTS {
            let existing = cached.as_deref().unwrap_or_default();
            let set = ExclusionSet::parse(existing);

            if !set.is_empty() {
                if !quota::swipe_allowed(set.len(), premium) {
                    return Err(EngineError::QuotaExceeded);
                }
                if set.contains(&input.target_id) {
                    return Err(EngineError::AlreadySwiped);
                }
            }

            let next = if set.len() > 1 {
                format!("{},{}", existing, input.target_id)
            } else {
                format!("{},{}", user_id, input.target_id)
            };

            if self
                .cache
                .set_if_unchanged(&key, cached.as_deref(), &next, SWIPE_WINDOW)
                .await?
            {
                debug!(
                    "recorded {:?} swipe {} -> {}",
                    input.direction, user_id, input.target_id
                );
                return Ok(());
            }
            debug!("swiped-set conflict for user {} (attempt {})", user_id, attempt + 1);
            cached = self.read(&key).await?;
        }

        Err(CacheError::Backend("exclusion set contention".to_string()).into())
    }

    /// Cache-miss is a valid steady state, and so is a transient read
    /// failure on the initial lookup: both degrade to the empty set.
    async fn read_best_effort(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("cache read failed for {}, treating as empty: {}", key, e);
                None
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Option<String>, EngineError> {
        Ok(self
            .cache
            .get(key)
            .await?
            .filter(|v| !v.is_empty()))
    }
}
