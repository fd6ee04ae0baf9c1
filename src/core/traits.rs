use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CandidateProfile, Package};

/// Errors surfaced by the user/package store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("store error: {0}")]
    Backend(String),
}

/// Errors surfaced by the exclusion cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache operation timed out")]
    Timeout,

    #[error("cache error: {0}")]
    Backend(String),
}

/// Read-only profile and entitlement lookups the matching engine depends on.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    /// Fetch a single profile by id.
    async fn get_profile(&self, id: &str) -> Result<CandidateProfile, StoreError>;

    /// Fetch one profile uniformly at random, excluding the given ids.
    /// Returns `NotFound` when no eligible profile exists.
    async fn random_profile(&self, exclude_ids: &[String])
        -> Result<CandidateProfile, StoreError>;

    /// Packages owned by the given user. `NotFound` if the user does not exist.
    async fn owned_packages(&self, user_id: &str) -> Result<Vec<Package>, StoreError>;
}

/// Per-key expiring string cache backing the daily exclusion sets.
///
/// Keys are independent; correctness of the day-scoped invariants rides on
/// the backend's atomic per-key operations, not on any engine-side locking.
#[async_trait]
pub trait ExclusionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Atomically replace `key` only if its current value still equals `prev`
    /// (`None` meaning the key must be absent). Returns `false` when another
    /// writer got there first.
    async fn set_if_unchanged(
        &self,
        key: &str,
        prev: Option<&str>,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;
}

/// Package catalog reads and owned-set writes used by the purchase flow.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Owned package ids for a user. `NotFound` if the user does not exist.
    async fn owned_package_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Resolve a package in the reference data.
    async fn get_package(&self, id: &str) -> Result<Package, StoreError>;

    /// List the full package catalog.
    async fn list_packages(&self) -> Result<Vec<Package>, StoreError>;

    /// Persist the full owned set (not a delta) back to the user document.
    async fn set_owned_packages(
        &self,
        user_id: &str,
        package_ids: &[String],
    ) -> Result<(), StoreError>;
}
