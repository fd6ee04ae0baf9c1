use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::core::traits::{PackageStore, StoreError};
use crate::models::Package;

/// Errors surfaced by [`PackageService::purchase`]
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("package already purchased")]
    AlreadyOwned,

    #[error("package not found")]
    PackageNotFound,

    #[error(transparent)]
    Store(StoreError),
}

/// Tracks which packages a user owns. Purchase is a no-payment unlock that
/// appends to the owned set; the premium entitlement consumed by the swipe
/// quota is derived from this set.
pub struct PackageService<S> {
    store: Arc<S>,
}

impl<S> Clone for PackageService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: PackageStore> PackageService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Unlock a package for a user.
    ///
    /// Rejects a repeat purchase and an id that does not resolve in the
    /// package reference data. The updated owned set is written back whole;
    /// the two reads and the write are not transactional (see DESIGN.md).
    pub async fn purchase(&self, user_id: &str, package_id: &str) -> Result<(), PurchaseError> {
        let mut owned = self
            .store
            .owned_package_ids(user_id)
            .await
            .map_err(PurchaseError::Store)?;

        if owned.iter().any(|id| id == package_id) {
            return Err(PurchaseError::AlreadyOwned);
        }

        match self.store.get_package(package_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Err(PurchaseError::PackageNotFound),
            Err(e) => return Err(PurchaseError::Store(e)),
        }

        owned.push(package_id.to_string());

        self.store
            .set_owned_packages(user_id, &owned)
            .await
            .map_err(PurchaseError::Store)?;

        info!("user {} unlocked package {}", user_id, package_id);
        Ok(())
    }

    /// Full package catalog.
    pub async fn list(&self) -> Result<Vec<Package>, StoreError> {
        self.store.list_packages().await
    }

    /// Single package lookup.
    pub async fn get(&self, package_id: &str) -> Result<Package, StoreError> {
        self.store.get_package(package_id).await
    }
}
