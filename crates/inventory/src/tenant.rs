//! Brand-scoped container binding one catalog, one ledger and one request queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brandstock_auth::Users;
use brandstock_core::{AggregateRoot, BrandId, DomainError, DomainResult, ItemCode, RequestId};

use crate::catalog::{Catalog, Item, NewItem};
use crate::ledger::{HistoryEntry, Ledger};
use crate::request::{PendingRequest, RequestDraft, RequestQueue};

/// Persisted shape of a tenant.
///
/// Field names follow the legacy per-brand record (`users`, `inventory`,
/// `itemCounter`, `pendingRequests`, `history`); `version` was added for
/// optimistic concurrency and defaults to 0 for old records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
    #[serde(default)]
    pub users: Users,
    #[serde(default)]
    pub inventory: Catalog,
    #[serde(default)]
    pub item_counter: u64,
    #[serde(default)]
    pub pending_requests: RequestQueue,
    #[serde(default)]
    pub history: Ledger,
    #[serde(default)]
    pub version: u64,
}

/// Item whose catalog quantity disagrees with its ledger replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConservationBreach {
    pub item_code: ItemCode,
    pub catalog_quantity: i64,
    pub ledger_quantity: i64,
}

/// The full inventory state of one brand.
///
/// Every mutating operation either succeeds completely or returns an error with
/// the state untouched, and bumps `version` on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantStore {
    brand: BrandId,
    data: TenantData,
}

impl TenantStore {
    /// An empty tenant seeded with `users`.
    pub fn new(brand: BrandId, users: Users) -> Self {
        Self {
            brand,
            data: TenantData {
                users,
                ..TenantData::default()
            },
        }
    }

    pub fn from_data(brand: BrandId, data: TenantData) -> Self {
        Self { brand, data }
    }

    pub fn brand(&self) -> &BrandId {
        &self.brand
    }

    pub fn data(&self) -> &TenantData {
        &self.data
    }

    pub fn into_data(self) -> TenantData {
        self.data
    }

    pub fn users(&self) -> &Users {
        &self.data.users
    }

    pub fn catalog(&self) -> &Catalog {
        &self.data.inventory
    }

    pub fn ledger(&self) -> &Ledger {
        &self.data.history
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.data.pending_requests
    }

    pub fn item_counter(&self) -> u64 {
        self.data.item_counter
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Catalog, &mut Ledger, &mut RequestQueue) {
        (
            &mut self.data.inventory,
            &mut self.data.history,
            &mut self.data.pending_requests,
        )
    }

    pub(crate) fn touch(&mut self) {
        self.data.version += 1;
    }

    /// Add a master item and record its initial stock as an ADD_ITEM entry.
    pub fn add_item(&mut self, new: NewItem, actor: &str, now: DateTime<Utc>) -> DomainResult<Item> {
        let (code, counter) = match new.code.as_deref() {
            Some(raw) => {
                let code = ItemCode::parse(raw)
                    .map_err(|_| DomainError::invalid_input("item code cannot be empty"))?;
                (code, self.data.item_counter)
            }
            None => self.next_item_code()?,
        };

        let item = self
            .data
            .inventory
            .add_item(code, &new.name, &new.unit, &new.category, new.initial_quantity)?
            .clone();
        self.data.item_counter = counter;
        self.data.history.append(HistoryEntry::item_added(&item, actor, now));
        self.touch();
        Ok(item)
    }

    /// Next free `ITM-nnnn` code and the counter value that produced it.
    fn next_item_code(&self) -> DomainResult<(ItemCode, u64)> {
        let mut counter = self.data.item_counter;
        loop {
            counter += 1;
            let code = ItemCode::parse(format!("ITM-{counter:04}"))?;
            if !self.data.inventory.contains(&code) {
                return Ok((code, counter));
            }
        }
    }

    /// Validate a draft and queue it under a fresh request id.
    pub fn submit(&mut self, draft: &RequestDraft, now: DateTime<Utc>) -> DomainResult<PendingRequest> {
        self.submit_with_id(draft, RequestId::new(), now)
    }

    /// `submit` with a caller-chosen id (deterministic tests, imports).
    pub fn submit_with_id(
        &mut self,
        draft: &RequestDraft,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> DomainResult<PendingRequest> {
        if self.data.history.contains_request(id) {
            return Err(DomainError::conflict(format!("request {id} was already resolved")));
        }
        let request = draft.validate(&self.data.history, id, now)?;
        let queued = self.data.pending_requests.enqueue(request)?.clone();
        self.touch();
        Ok(queued)
    }

    /// Clear catalog, queue, ledger and item counter. Users are kept.
    pub fn reset(&mut self) {
        self.data.inventory.clear();
        self.data.pending_requests.clear();
        self.data.history.clear();
        self.data.item_counter = 0;
        self.touch();
    }

    /// Items whose catalog quantity differs from the ledger replay.
    pub fn conservation_breaches(&self) -> Vec<ConservationBreach> {
        self.data
            .inventory
            .iter()
            .filter_map(|item| {
                let ledger_quantity = self.data.history.replayed_quantity(&item.code);
                (ledger_quantity != item.quantity).then(|| ConservationBreach {
                    item_code: item.code.clone(),
                    catalog_quantity: item.quantity,
                    ledger_quantity,
                })
            })
            .collect()
    }
}

impl AggregateRoot for TenantStore {
    type Id = BrandId;

    fn id(&self) -> &Self::Id {
        &self.brand
    }

    fn version(&self) -> u64 {
        self.data.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::ledger::Action;
    use crate::movement::TransactionType;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    fn tenant() -> TenantStore {
        TenantStore::new(BrandId::parse("gulavit").unwrap(), Users::with_admin("admin", "admin"))
    }

    #[test]
    fn add_item_records_initial_stock_in_ledger() {
        let mut t = tenant();
        let item = t.add_item(NewItem::new("ITM-1", "Gula", "pcs", 100), "admin", now()).unwrap();

        assert_eq!(item.quantity, 100);
        assert_eq!(t.ledger().len(), 1);
        let entry = &t.ledger().entries()[0];
        assert_eq!(entry.action, Action::AddItem);
        assert_eq!(entry.resulting_stock, Some(100));
        assert_eq!(t.version(), 1);
    }

    #[test]
    fn failed_add_item_leaves_state_untouched() {
        let mut t = tenant();
        t.add_item(NewItem::new("ITM-1", "Gula", "pcs", 100), "admin", now()).unwrap();
        let before = t.clone();

        assert!(matches!(
            t.add_item(NewItem::new("ITM-1", "Other", "pcs", 1), "admin", now()),
            Err(DomainError::DuplicateCode(_))
        ));
        assert!(matches!(
            t.add_item(NewItem::new("  ", "Other", "pcs", 1), "admin", now()),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(t, before);
    }

    #[test]
    fn omitted_codes_are_allocated_from_the_counter() {
        let mut t = tenant();
        t.add_item(NewItem::new("ITM-0001", "Taken", "pcs", 0), "admin", now()).unwrap();

        let a = t.add_item(NewItem::auto_code("Gula", "pcs", 1), "admin", now()).unwrap();
        let b = t.add_item(NewItem::auto_code("Kopi", "pcs", 1), "admin", now()).unwrap();

        assert_eq!(a.code.as_str(), "ITM-0002");
        assert_eq!(b.code.as_str(), "ITM-0003");
        assert_eq!(t.item_counter(), 3);
    }

    #[test]
    fn submit_queues_request_and_bumps_version() {
        let mut t = tenant();
        let draft = RequestDraft::stock_out("ITM-1", 3, "pcs", TransactionType::Support, "Bazaar")
            .with_requested_by("budi");
        let request = t.submit(&draft, now()).unwrap();

        assert_eq!(t.queue().get(request.id), Some(&request));
        assert_eq!(t.version(), 1);
    }

    #[test]
    fn reset_keeps_users_only() {
        let mut t = tenant();
        t.add_item(NewItem::auto_code("Gula", "pcs", 5), "admin", now()).unwrap();
        t.submit(
            &RequestDraft::stock_in("ITM-0001", 1, "pcs", "DO-1").with_requested_by("admin"),
            now(),
        )
        .unwrap();

        t.reset();

        assert!(t.catalog().is_empty());
        assert!(t.ledger().is_empty());
        assert!(t.queue().is_empty());
        assert_eq!(t.item_counter(), 0);
        assert!(t.users().get("admin").is_some());
        assert_eq!(t.version(), 3);
    }

    #[test]
    fn persisted_shape_uses_legacy_field_names() {
        let mut t = tenant();
        t.add_item(NewItem::new("ITM-1", "Gula", "pcs", 100), "admin", now()).unwrap();
        let json = serde_json::to_value(t.data()).unwrap();

        for key in ["users", "inventory", "itemCounter", "pendingRequests", "history", "version"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["inventory"]["ITM-1"]["quantity"], 100);

        let back: TenantData = serde_json::from_value(json).unwrap();
        assert_eq!(&back, t.data());
    }

    #[test]
    fn empty_legacy_record_loads_with_defaults() {
        let data: TenantData = serde_json::from_str("{}").unwrap();
        assert!(data.inventory.is_empty());
        assert_eq!(data.version, 0);
    }
}
