//! Append-only history of every catalog change and request resolution.
//!
//! The ledger is the source of truth for quantities: replaying the approved
//! entries of an item reproduces its current catalog quantity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use brandstock_core::{ItemCode, RequestId};

use crate::catalog::Item;
use crate::movement::{MovementDetails, RequestKind, TransactionType};
use crate::request::PendingRequest;

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    AddItem,
    ApproveIn,
    ApproveOut,
    ApproveReturn,
    RejectIn,
    RejectOut,
    RejectReturn,
}

impl Action {
    pub fn approved(kind: RequestKind) -> Self {
        match kind {
            RequestKind::In => Action::ApproveIn,
            RequestKind::Out => Action::ApproveOut,
            RequestKind::Return => Action::ApproveReturn,
        }
    }

    pub fn rejected(kind: RequestKind) -> Self {
        match kind {
            RequestKind::In => Action::RejectIn,
            RequestKind::Out => Action::RejectOut,
            RequestKind::Return => Action::RejectReturn,
        }
    }

    /// Request kind behind this action (`None` for `AddItem`).
    pub fn kind(&self) -> Option<RequestKind> {
        match self {
            Action::AddItem => None,
            Action::ApproveIn | Action::RejectIn => Some(RequestKind::In),
            Action::ApproveOut | Action::RejectOut => Some(RequestKind::Out),
            Action::ApproveReturn | Action::RejectReturn => Some(RequestKind::Return),
        }
    }

    /// True for entries that changed the catalog quantity.
    pub fn moves_stock(&self) -> bool {
        matches!(
            self,
            Action::AddItem | Action::ApproveIn | Action::ApproveOut | Action::ApproveReturn
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddItem => "ADD_ITEM",
            Action::ApproveIn => "APPROVE_IN",
            Action::ApproveOut => "APPROVE_OUT",
            Action::ApproveReturn => "APPROVE_RETURN",
            Action::RejectIn => "REJECT_IN",
            Action::RejectOut => "REJECT_OUT",
            Action::RejectReturn => "REJECT_RETURN",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Append position (1-based), assigned by the ledger.
    #[serde(default)]
    pub sequence: u64,
    pub action: Action,
    pub item_code: ItemCode,
    /// Item name as of the time the entry was written.
    pub item_name: String,
    pub quantity: i64,
    /// Catalog quantity right after this entry; `None` for rejections.
    pub resulting_stock: Option<i64>,
    pub unit: String,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<MovementDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// ADD_ITEM entry for a freshly created master item.
    pub fn item_added(item: &Item, actor: &str, recorded_at: DateTime<Utc>) -> Self {
        Self {
            sequence: 0,
            action: Action::AddItem,
            item_code: item.code.clone(),
            item_name: item.name.clone(),
            quantity: item.quantity,
            resulting_stock: Some(item.quantity),
            unit: item.unit.clone(),
            actor: actor.to_string(),
            request_id: None,
            requested_by: None,
            movement: None,
            attachment_ref: None,
            effective_date: Some(recorded_at.date_naive()),
            recorded_at,
        }
    }

    /// APPROVE_<KIND> entry; request metadata is carried through verbatim.
    pub fn approved(
        request: &PendingRequest,
        item: &Item,
        actor: &str,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self::resolved(
            request,
            Action::approved(request.kind()),
            item.code.clone(),
            item.name.clone(),
            Some(item.quantity),
            actor,
            recorded_at,
        )
    }

    /// REJECT_<KIND> entry. The catalog is untouched, so there is no resulting stock.
    pub fn rejected(
        request: &PendingRequest,
        item_name: String,
        actor: &str,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self::resolved(
            request,
            Action::rejected(request.kind()),
            request.item_code.clone(),
            item_name,
            None,
            actor,
            recorded_at,
        )
    }

    fn resolved(
        request: &PendingRequest,
        action: Action,
        item_code: ItemCode,
        item_name: String,
        resulting_stock: Option<i64>,
        actor: &str,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence: 0,
            action,
            item_code,
            item_name,
            quantity: request.quantity,
            resulting_stock,
            unit: request.unit.clone(),
            actor: actor.to_string(),
            request_id: Some(request.id),
            requested_by: Some(request.requested_by.clone()),
            movement: Some(request.movement.clone()),
            attachment_ref: request.attachment_ref.clone(),
            effective_date: Some(request.effective_date),
            recorded_at,
        }
    }

    /// Reporting date: the effective date, or the day it was recorded for legacy entries.
    pub fn business_date(&self) -> NaiveDate {
        self.effective_date.unwrap_or_else(|| self.recorded_at.date_naive())
    }

    /// Contribution of this entry to the item's quantity.
    pub fn signed_quantity(&self) -> i64 {
        match self.action {
            Action::AddItem | Action::ApproveIn | Action::ApproveReturn => self.quantity,
            Action::ApproveOut => -self.quantity,
            Action::RejectIn | Action::RejectOut | Action::RejectReturn => 0,
        }
    }

    pub fn reference_event(&self) -> Option<&str> {
        self.movement.as_ref().and_then(MovementDetails::reference_event)
    }

    pub fn delivery_order_number(&self) -> Option<&str> {
        self.movement.as_ref().and_then(MovementDetails::delivery_order_number)
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.movement.as_ref().and_then(MovementDetails::transaction_type)
    }
}

/// Ordered, append-only sequence of history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<HistoryEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, stamping its sequence number. Returns the stored entry.
    pub fn append(&mut self, mut entry: HistoryEntry) -> &HistoryEntry {
        entry.sequence = self.next_sequence();
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    fn next_sequence(&self) -> u64 {
        self.entries
            .last()
            .map(|e| e.sequence.max(self.entries.len() as u64))
            .unwrap_or(0)
            + 1
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_item<'a>(&'a self, code: &'a ItemCode) -> impl Iterator<Item = &'a HistoryEntry> {
        self.entries.iter().filter(move |e| &e.item_code == code)
    }

    /// True when some APPROVE_OUT for `code` carries `reference_event`.
    pub fn has_approved_out(&self, code: &ItemCode, reference_event: &str) -> bool {
        self.for_item(code).any(|e| {
            e.action == Action::ApproveOut
                && e.reference_event().map(str::trim) == Some(reference_event.trim())
        })
    }

    /// True when `id` has already been resolved (approved or rejected).
    pub fn contains_request(&self, id: RequestId) -> bool {
        self.entries.iter().any(|e| e.request_id == Some(id))
    }

    /// Quantity of `code` reconstructed purely from the ledger.
    pub fn replayed_quantity(&self, code: &ItemCode) -> i64 {
        self.for_item(code).map(HistoryEntry::signed_quantity).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn item(code: &str, qty: i64) -> Item {
        Item {
            code: ItemCode::parse(code).unwrap(),
            name: format!("Item {code}"),
            unit: "pcs".to_string(),
            category: String::new(),
            quantity: qty,
        }
    }

    #[test]
    fn append_assigns_increasing_sequence_numbers() {
        let mut ledger = Ledger::new();
        let a = ledger.append(HistoryEntry::item_added(&item("A", 1), "admin", t0())).sequence;
        let b = ledger.append(HistoryEntry::item_added(&item("B", 2), "admin", t0())).sequence;
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn action_serializes_in_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Action::ApproveReturn).unwrap(), "\"APPROVE_RETURN\"");
        assert_eq!(Action::rejected(RequestKind::Out), Action::RejectOut);
        assert!(!Action::RejectIn.moves_stock());
        assert!(Action::AddItem.moves_stock());
    }

    #[test]
    fn business_date_falls_back_to_recorded_day() {
        let mut entry = HistoryEntry::item_added(&item("A", 1), "admin", t0());
        entry.effective_date = None;
        assert_eq!(entry.business_date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn legacy_entry_without_sequence_or_date_deserializes() {
        let json = serde_json::json!({
            "action": "APPROVE_IN",
            "itemCode": "A",
            "itemName": "Item A",
            "quantity": 4,
            "resultingStock": 4,
            "unit": "pcs",
            "actor": "admin",
            "recordedAt": "2024-02-10T08:00:00Z"
        });
        let entry: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.sequence, 0);
        assert_eq!(entry.effective_date, None);
        assert_eq!(entry.signed_quantity(), 4);
        assert_eq!(entry.business_date(), NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }
}
