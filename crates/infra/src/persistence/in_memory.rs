use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use brandstock_core::{AggregateRoot, BrandId, ExpectedVersion};
use brandstock_inventory::{TenantData, TenantStore};

use super::repository::{check_version, StorageError, TenantRepository};

/// In-memory tenant repository.
///
/// Intended for tests/dev. Stores a full copy per brand, so a saved tenant can
/// not be changed behind the repository's back.
#[derive(Debug, Default)]
pub struct InMemoryTenantRepository {
    tenants: RwLock<HashMap<BrandId, TenantData>>,
    unavailable: AtomicBool,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every load/save fails with `Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory repository marked unavailable".to_string()));
        }
        Ok(())
    }
}

impl TenantRepository for InMemoryTenantRepository {
    fn load(&self, brand: &BrandId) -> Result<Option<TenantStore>, StorageError> {
        self.ensure_available()?;
        let tenants = self
            .tenants
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;

        Ok(tenants
            .get(brand)
            .cloned()
            .map(|data| TenantStore::from_data(brand.clone(), data)))
    }

    fn save(&self, store: &TenantStore, expected: ExpectedVersion) -> Result<(), StorageError> {
        self.ensure_available()?;
        let mut tenants = self
            .tenants
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;

        let stored = tenants.get(store.brand()).map(|d| d.version).unwrap_or(0);
        check_version(store.brand(), expected, stored)?;
        if store.version() < stored {
            return Err(StorageError::Conflict(format!(
                "brand '{}': refusing to replace version {stored} with older version {}",
                store.brand(),
                store.version()
            )));
        }

        tenants.insert(store.brand().clone(), store.data().clone());
        Ok(())
    }
}
