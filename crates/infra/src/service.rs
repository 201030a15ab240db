//! Caller-facing inventory operations (application-level orchestration).
//!
//! `InventoryService` is the only entry point external callers (CLI, UI) use. It
//! composes a `TenantRepository`, a `Clock` and the per-brand lock map, and
//! keeps the domain crate free of IO.
//!
//! ## Mutation Flow
//!
//! ```text
//! operation(brand, username, ..)
//!   ↓
//! 1. Validate brand against the configured allow-list
//!   ↓
//! 2. Acquire the brand lock
//!   ↓
//! 3. Load the tenant (or seed an empty one with the default users)
//!   ↓
//! 4. Resolve username → Actor, check permission
//!   ↓
//! 5. Mutate the in-memory TenantStore (all-or-nothing in the domain)
//!   ↓
//! 6. Save the whole tenant with ExpectedVersion::Exact(loaded version)
//! ```
//!
//! A failure at any step drops the in-memory copy, so persisted state is either
//! the old tenant or the fully mutated one. Views skip steps 2 and 6.

use thiserror::Error;

use brandstock_auth::{authorize, Actor, AuthzError, Permission};
use brandstock_core::{AggregateRoot, BrandId, DomainError, ExpectedVersion, RequestId};
use brandstock_inventory::{HistoryEntry, Item, NewItem, PendingRequest, RequestDraft, TenantStore};

use crate::clock::{Clock, SystemClock};
use crate::config::InventoryConfig;
use crate::locks::{acquire, BrandLocks};
use crate::persistence::{StorageError, TenantRepository};
use crate::projections::{Dashboard, LedgerQuery, MonthlyAggregate, ReorderForecast, ReorderParams, StockCard};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Any repository failure, not only an outage; the message is the storage error's own.
    #[error(transparent)]
    StorageUnavailable(#[from] StorageError),

    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthzError),

    #[error("unknown brand '{0}'")]
    UnknownBrand(String),
}

impl ServiceError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of one id in a batch approve/reject.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: RequestId,
    pub result: Result<HistoryEntry, ServiceError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Inventory application service.
///
/// ## Generic Parameters
///
/// - `R`: tenant repository (`InMemoryTenantRepository`, `JsonFileRepository`, ...)
/// - `C`: clock, `SystemClock` outside tests
#[derive(Debug)]
pub struct InventoryService<R, C = SystemClock> {
    repo: R,
    clock: C,
    config: InventoryConfig,
    locks: BrandLocks,
}

impl<R> InventoryService<R, SystemClock>
where
    R: TenantRepository,
{
    pub fn new(repo: R, config: InventoryConfig) -> Self {
        Self::with_clock(repo, config, SystemClock)
    }
}

impl<R, C> InventoryService<R, C>
where
    R: TenantRepository,
    C: Clock,
{
    pub fn with_clock(repo: R, config: InventoryConfig, clock: C) -> Self {
        Self {
            repo,
            clock,
            config,
            locks: BrandLocks::new(),
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Parse and allow-list a brand name.
    pub fn brand(&self, raw: &str) -> Result<BrandId, ServiceError> {
        let brand = BrandId::parse(raw).map_err(|_| ServiceError::UnknownBrand(raw.to_string()))?;
        if !self.config.allows(&brand) {
            return Err(ServiceError::UnknownBrand(raw.to_string()));
        }
        Ok(brand)
    }

    // ---- mutations ----

    /// Add a master item (admin only).
    pub fn add_item(&self, brand: &str, username: &str, item: NewItem) -> Result<Item, ServiceError> {
        self.mutate(brand, username, Permission::ManageCatalog, "add_item", |store, actor, now| {
            let item = store.add_item(item, &actor.username, now)?;
            tracing::info!(
                brand = %store.brand(),
                item_code = %item.code,
                quantity = item.quantity,
                "item added"
            );
            Ok(item)
        })
    }

    /// Queue a request. The requester is always the acting user.
    pub fn submit(&self, brand: &str, username: &str, draft: RequestDraft) -> Result<PendingRequest, ServiceError> {
        self.mutate(brand, username, Permission::SubmitRequest, "submit", |store, actor, now| {
            let draft = draft.with_requested_by(actor.username.clone());
            let request = store.submit(&draft, now)?;
            tracing::info!(
                brand = %store.brand(),
                request_id = %request.id,
                item_code = %request.item_code,
                kind = %request.kind(),
                quantity = request.quantity,
                "request submitted"
            );
            Ok(request)
        })
    }

    pub fn approve(&self, brand: &str, username: &str, id: RequestId) -> Result<HistoryEntry, ServiceError> {
        self.mutate(brand, username, Permission::ManageRequests, "approve", |store, actor, now| {
            let entry = store.approve(id, &actor.username, now)?;
            tracing::info!(
                brand = %store.brand(),
                request_id = %id,
                item_code = %entry.item_code,
                action = %entry.action,
                resulting_stock = entry.resulting_stock,
                "request approved"
            );
            Ok(entry)
        })
    }

    pub fn reject(&self, brand: &str, username: &str, id: RequestId) -> Result<HistoryEntry, ServiceError> {
        self.mutate(brand, username, Permission::ManageRequests, "reject", |store, actor, now| {
            let entry = store.reject(id, &actor.username, now)?;
            tracing::info!(
                brand = %store.brand(),
                request_id = %id,
                item_code = %entry.item_code,
                action = %entry.action,
                "request rejected"
            );
            Ok(entry)
        })
    }

    /// Approve ids in order. Each id is its own load-mutate-save; one failure
    /// does not stop or undo the others.
    pub fn approve_batch(&self, brand: &str, username: &str, ids: &[RequestId]) -> Vec<BatchOutcome> {
        ids.iter()
            .map(|&id| BatchOutcome {
                id,
                result: self.approve(brand, username, id),
            })
            .collect()
    }

    pub fn reject_batch(&self, brand: &str, username: &str, ids: &[RequestId]) -> Vec<BatchOutcome> {
        ids.iter()
            .map(|&id| BatchOutcome {
                id,
                result: self.reject(brand, username, id),
            })
            .collect()
    }

    /// Clear catalog, queue, ledger and item counter; users survive.
    pub fn reset_tenant(&self, brand: &str, username: &str) -> Result<(), ServiceError> {
        self.mutate(brand, username, Permission::ResetTenant, "reset_tenant", |store, actor, _now| {
            store.reset();
            tracing::warn!(brand = %store.brand(), actor = %actor.username, "tenant reset");
            Ok(())
        })
    }

    // ---- views ----

    /// Pending requests: all of them for admins, the caller's own otherwise.
    pub fn list_pending(&self, brand: &str, username: &str) -> Result<Vec<PendingRequest>, ServiceError> {
        self.view(brand, username, Permission::SubmitRequest, |store, actor| {
            let filter = (!actor.is_admin()).then_some(actor.username.as_str());
            Ok(store.queue().list(filter))
        })
    }

    /// Current catalog in code order.
    pub fn items(&self, brand: &str, username: &str) -> Result<Vec<Item>, ServiceError> {
        self.view(brand, username, Permission::ViewReports, |store, _| {
            Ok(store.catalog().iter().cloned().collect())
        })
    }

    pub fn stock_card(&self, brand: &str, username: &str, item: &str) -> Result<StockCard, ServiceError> {
        self.view(brand, username, Permission::ViewReports, |store, _| {
            let card = StockCard::build(store, item)?;
            tracing::debug!(brand = %store.brand(), item_code = %card.item_code(), rows = card.len(), "stock card built");
            Ok(card)
        })
    }

    /// Monthly movement matrix ending with the current month (default 3 months).
    pub fn monthly_aggregate(
        &self,
        brand: &str,
        username: &str,
        months_back: Option<u32>,
    ) -> Result<MonthlyAggregate, ServiceError> {
        let as_of = self.clock.now().date_naive();
        self.view(brand, username, Permission::ViewReports, |store, _| {
            let agg = MonthlyAggregate::build(store, months_back.unwrap_or(3), as_of)?;
            tracing::debug!(brand = %store.brand(), months = agg.months.len(), "monthly aggregate built");
            Ok(agg)
        })
    }

    /// Reorder forecast as of today; `target_days` overrides the configured cover.
    pub fn reorder_forecast(
        &self,
        brand: &str,
        username: &str,
        target_days: Option<u32>,
    ) -> Result<ReorderForecast, ServiceError> {
        let params = ReorderParams {
            lookback_months: self.config.reorder_lookback_months,
            target_days_of_cover: target_days.unwrap_or(self.config.target_days_of_cover),
            as_of: self.clock.now().date_naive(),
        };
        self.view(brand, username, Permission::ViewReports, |store, _| {
            let forecast = ReorderForecast::build(store, params)?;
            tracing::debug!(brand = %store.brand(), rows = forecast.rows.len(), "reorder forecast built");
            Ok(forecast)
        })
    }

    pub fn history(&self, brand: &str, username: &str, query: &LedgerQuery) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.view(brand, username, Permission::ViewReports, |store, _| Ok(query.run(store.ledger())))
    }

    pub fn dashboard(&self, brand: &str, username: &str) -> Result<Dashboard, ServiceError> {
        self.view(brand, username, Permission::ViewReports, |store, _| Ok(Dashboard::build(store)))
    }

    // ---- plumbing ----

    fn load(&self, brand: &BrandId) -> Result<TenantStore, ServiceError> {
        let store = match self.repo.load(brand)? {
            Some(store) => store,
            None => TenantStore::new(brand.clone(), self.config.default_users()),
        };

        for breach in store.conservation_breaches() {
            tracing::warn!(
                brand = %brand,
                item_code = %breach.item_code,
                catalog_quantity = breach.catalog_quantity,
                ledger_quantity = breach.ledger_quantity,
                "catalog quantity disagrees with ledger replay"
            );
        }
        Ok(store)
    }

    fn view<T, F>(&self, brand: &str, username: &str, permission: Permission, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&TenantStore, &Actor) -> Result<T, DomainError>,
    {
        let brand = self.brand(brand)?;
        let store = self.load(&brand)?;
        let actor = store.users().actor(username)?;
        authorize(&actor, permission)?;
        Ok(f(&store, &actor)?)
    }

    fn mutate<T, F>(
        &self,
        brand: &str,
        username: &str,
        permission: Permission,
        operation: &'static str,
        f: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut TenantStore, &Actor, chrono::DateTime<chrono::Utc>) -> Result<T, DomainError>,
    {
        let brand = self.brand(brand)?;
        let handle = self.locks.handle(&brand);
        let _guard = acquire(&handle);

        let result = self.mutate_locked(&brand, username, permission, f);
        if let Err(err) = &result {
            tracing::warn!(brand = %brand, operation, user = username, error = %err, "operation rejected");
        }
        result
    }

    fn mutate_locked<T, F>(&self, brand: &BrandId, username: &str, permission: Permission, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut TenantStore, &Actor, chrono::DateTime<chrono::Utc>) -> Result<T, DomainError>,
    {
        let mut store = self.load(brand)?;
        let expected = ExpectedVersion::Exact(store.version());

        let actor = store.users().actor(username)?;
        authorize(&actor, permission)?;

        let value = f(&mut store, &actor, self.clock.now())?;
        self.repo.save(&store, expected)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use brandstock_auth::{Role, UserAccount};
    use brandstock_inventory::TransactionType;
    use chrono::{TimeZone, Utc};

    use crate::clock::FixedClock;
    use crate::persistence::InMemoryTenantRepository;

    type Service = InventoryService<Arc<InMemoryTenantRepository>, FixedClock>;

    fn service() -> (Service, Arc<InMemoryTenantRepository>) {
        let repo = Arc::new(InMemoryTenantRepository::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap());
        (InventoryService::with_clock(repo.clone(), InventoryConfig::default(), clock), repo)
    }

    fn add_user(repo: &InMemoryTenantRepository, brand: &str, name: &str) {
        let brand = BrandId::parse(brand).unwrap();
        let mut store = repo
            .load(&brand)
            .unwrap()
            .unwrap_or_else(|| TenantStore::new(brand.clone(), InventoryConfig::default().default_users()));
        let mut data = store.clone().into_data();
        data.users.insert(name, UserAccount::new("pw", Role::User));
        data.version += 1;
        store = TenantStore::from_data(brand, data);
        repo.save(&store, ExpectedVersion::Any).unwrap();
    }

    #[test]
    fn unknown_brand_is_refused() {
        let (svc, _) = service();
        assert!(matches!(svc.dashboard("kopiku", "admin"), Err(ServiceError::UnknownBrand(_))));
        assert!(matches!(svc.dashboard("Not A Brand", "admin"), Err(ServiceError::UnknownBrand(_))));
    }

    #[test]
    fn first_touch_seeds_default_admin() {
        let (svc, repo) = service();
        svc.add_item("gulavit", "admin", NewItem::new("GV-1", "Gula", "kg", 5)).unwrap();

        let stored = repo.load(&BrandId::parse("gulavit").unwrap()).unwrap().unwrap();
        assert!(stored.users().get("admin").is_some());
        assert_eq!(stored.version(), 1);
    }

    #[test]
    fn regular_user_can_submit_but_not_approve() {
        let (svc, repo) = service();
        svc.add_item("gulavit", "admin", NewItem::new("GV-1", "Gula", "kg", 5)).unwrap();
        add_user(&repo, "gulavit", "sari");

        let request = svc
            .submit("gulavit", "sari", RequestDraft::stock_in("GV-1", 3, "kg", "DO-7"))
            .unwrap();
        assert_eq!(request.requested_by, "sari");

        assert!(matches!(
            svc.approve("gulavit", "sari", request.id),
            Err(ServiceError::Unauthorized(AuthzError::Forbidden { .. }))
        ));
        assert!(matches!(
            svc.add_item("gulavit", "sari", NewItem::auto_code("Kopi", "kg", 1)),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.dashboard("gulavit", "mallory"),
            Err(ServiceError::Unauthorized(AuthzError::UnknownUser(_)))
        ));
    }

    #[test]
    fn users_only_see_their_own_pending_requests() {
        let (svc, repo) = service();
        svc.add_item("gulavit", "admin", NewItem::new("GV-1", "Gula", "kg", 50)).unwrap();
        add_user(&repo, "gulavit", "sari");
        add_user(&repo, "gulavit", "budi");

        svc.submit("gulavit", "sari", RequestDraft::stock_in("GV-1", 1, "kg", "DO-1")).unwrap();
        svc.submit(
            "gulavit",
            "budi",
            RequestDraft::stock_out("GV-1", 2, "kg", TransactionType::Sale, "Fair"),
        )
        .unwrap();

        assert_eq!(svc.list_pending("gulavit", "sari").unwrap().len(), 1);
        assert_eq!(svc.list_pending("gulavit", "admin").unwrap().len(), 2);
    }

    #[test]
    fn domain_failure_does_not_save() {
        let (svc, repo) = service();
        svc.add_item("gulavit", "admin", NewItem::new("GV-1", "Gula", "kg", 5)).unwrap();
        let request = svc
            .submit(
                "gulavit",
                "admin",
                RequestDraft::stock_out("GV-1", 9, "kg", TransactionType::Support, "Fair"),
            )
            .unwrap();
        let before = repo.load(&BrandId::parse("gulavit").unwrap()).unwrap();

        let err = svc.approve("gulavit", "admin", request.id).unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InsufficientStock { .. })));
        assert_eq!(repo.load(&BrandId::parse("gulavit").unwrap()).unwrap(), before);
    }

    #[test]
    fn storage_failure_keeps_the_repository_message() {
        let (svc, repo) = service();
        repo.set_unavailable(true);

        let err = svc.items("gulavit", "admin").unwrap_err();
        assert!(matches!(err, ServiceError::StorageUnavailable(StorageError::Unavailable(_))));
        assert!(err.to_string().starts_with("storage unavailable:"), "{err}");
    }

}
