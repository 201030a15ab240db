//! Approval engine: turns pending requests into immutable history entries.
//!
//! A request is `PENDING` while it sits in the queue. Approving or rejecting it
//! removes it from the queue and appends exactly one history entry, which is
//! the durable witness of the terminal state.

use chrono::{DateTime, Utc};

use brandstock_core::{DomainError, DomainResult, RequestId};

use crate::ledger::HistoryEntry;
use crate::tenant::TenantStore;

impl TenantStore {
    /// Approve a pending request.
    ///
    /// Steps: look the request up, resolve the target item (code first, then a
    /// unique name), apply the signed delta to the catalog, append the
    /// `APPROVE_<KIND>` entry, and drop the request from the queue.
    ///
    /// Any failure (`RequestNotFound`, `ItemNotFound`, `AmbiguousItemName`,
    /// `InsufficientStock`, or `InvalidInput` when the new quantity would not
    /// fit in an `i64`) happens before the first mutation, so the request stays
    /// pending and nothing is written.
    pub fn approve(&mut self, id: RequestId, actor: &str, now: DateTime<Utc>) -> DomainResult<HistoryEntry> {
        let (catalog, ledger, queue) = self.parts_mut();

        let request = queue
            .get(id)
            .ok_or_else(|| DomainError::RequestNotFound(id.to_string()))?;
        let code = catalog
            .resolve(&request.item_code, request.item_name.as_deref())?
            .code
            .clone();

        catalog.apply_delta(&code, request.signed_delta())?;
        let request = queue.remove(id)?;
        let item = catalog
            .lookup(&code)
            .ok_or_else(|| DomainError::item_not_found(code.as_str()))?;

        let entry = ledger
            .append(HistoryEntry::approved(&request, item, actor, now))
            .clone();
        self.touch();
        Ok(entry)
    }

    /// Reject a pending request. The catalog is not touched.
    pub fn reject(&mut self, id: RequestId, actor: &str, now: DateTime<Utc>) -> DomainResult<HistoryEntry> {
        let (catalog, ledger, queue) = self.parts_mut();

        let request = queue.remove(id)?;
        let item_name = request
            .item_name
            .clone()
            .or_else(|| catalog.lookup(&request.item_code).map(|item| item.name.clone()))
            .unwrap_or_default();

        let entry = ledger
            .append(HistoryEntry::rejected(&request, item_name, actor, now))
            .clone();
        self.touch();
        Ok(entry)
    }
}
