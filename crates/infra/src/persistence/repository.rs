use std::sync::Arc;

use thiserror::Error;

use brandstock_core::{BrandId, ExpectedVersion};
use brandstock_inventory::TenantStore;

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors: the
/// in-memory tenant the caller holds is still valid, it just could not be read
/// or written.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not be reached, read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes exist but do not decode into a tenant.
    #[error("stored tenant is corrupt: {0}")]
    Corrupt(String),

    /// Optimistic concurrency check failed (someone saved a newer version).
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),
}

/// Whole-tenant persistence contract.
///
/// ## Load Semantics
///
/// `load()` returns `Ok(None)` when nothing has ever been stored for the brand.
/// The caller decides what an empty tenant looks like (e.g. which default users
/// it is seeded with).
///
/// ## Save Semantics
///
/// `save()` writes catalog, ledger, queue, users and counters in one
/// all-or-nothing step. Implementations must:
/// - check `expected` against the currently stored version (0 when absent)
/// - never leave a partially written tenant behind on failure
/// - keep brands isolated (one brand's save never touches another's data)
pub trait TenantRepository: Send + Sync {
    fn load(&self, brand: &BrandId) -> Result<Option<TenantStore>, StorageError>;

    fn save(&self, store: &TenantStore, expected: ExpectedVersion) -> Result<(), StorageError>;
}

impl<R> TenantRepository for Arc<R>
where
    R: TenantRepository + ?Sized,
{
    fn load(&self, brand: &BrandId) -> Result<Option<TenantStore>, StorageError> {
        (**self).load(brand)
    }

    fn save(&self, store: &TenantStore, expected: ExpectedVersion) -> Result<(), StorageError> {
        (**self).save(store, expected)
    }
}

pub(crate) fn check_version(
    brand: &BrandId,
    expected: ExpectedVersion,
    stored: u64,
) -> Result<(), StorageError> {
    if expected.matches(stored) {
        Ok(())
    } else {
        Err(StorageError::Conflict(format!(
            "brand '{brand}': expected {expected:?}, found {stored}"
        )))
    }
}
