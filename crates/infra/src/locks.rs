//! Per-brand serialization of load-mutate-save cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use brandstock_core::BrandId;

/// Lazily created mutex per brand. Different brands never contend.
#[derive(Debug, Default)]
pub struct BrandLocks {
    locks: Mutex<HashMap<BrandId, Arc<Mutex<()>>>>,
}

impl BrandLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared lock handle for `brand`. Callers hold `handle.lock()` for the
    /// whole load-mutate-save cycle.
    pub fn handle(&self, brand: &BrandId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(brand.clone()).or_default().clone()
    }
}

/// Acquire a brand lock. A poisoned lock only means an earlier holder
/// panicked; the guarded state lives in the repository, so it is still usable.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_brand_shares_one_lock() {
        let locks = BrandLocks::new();
        let a = BrandId::parse("gulavit").unwrap();
        let b = BrandId::parse("takokak").unwrap();

        assert!(Arc::ptr_eq(&locks.handle(&a), &locks.handle(&a)));
        assert!(!Arc::ptr_eq(&locks.handle(&a), &locks.handle(&b)));
    }

    #[test]
    fn other_brand_is_free_while_one_is_held() {
        let locks = BrandLocks::new();
        let a = locks.handle(&BrandId::parse("gulavit").unwrap());
        let b = locks.handle(&BrandId::parse("takokak").unwrap());

        let _held = acquire(&a);
        assert!(b.try_lock().is_ok());
        assert!(a.try_lock().is_err());
    }
}
