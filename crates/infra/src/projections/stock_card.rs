use std::slice;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use brandstock_core::{DomainResult, ItemCode};
use brandstock_inventory::{Action, HistoryEntry, TenantStore, TransactionType};

/// One line of a stock card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCardRow {
    pub date: NaiveDate,
    pub description: String,
    pub qty_in: i64,
    pub qty_out: i64,
    pub balance: i64,
    pub action: Action,
    pub recorded_at: DateTime<Utc>,
}

/// Running-balance replay of one item's stock-moving ledger entries.
///
/// Entries are ordered by `(business_date, recorded_at)`; equal keys keep
/// ledger append order. The card owns its entries, so `rows()` can be
/// iterated any number of times with identical output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCard {
    item_code: ItemCode,
    item_name: String,
    unit: String,
    entries: Vec<HistoryEntry>,
}

impl StockCard {
    /// Build the card for `key` (item code, or a unique item name).
    pub fn build(store: &TenantStore, key: &str) -> DomainResult<Self> {
        let item = store.catalog().resolve_key(key)?;

        let mut entries: Vec<HistoryEntry> = store
            .ledger()
            .for_item(&item.code)
            .filter(|e| e.action.moves_stock())
            .cloned()
            .collect();
        // Stable sort: ties keep ledger order.
        entries.sort_by_key(|e| (e.business_date(), e.recorded_at));

        Ok(Self {
            item_code: item.code.clone(),
            item_name: item.name.clone(),
            unit: item.unit.clone(),
            entries,
        })
    }

    pub fn item_code(&self) -> &ItemCode {
        &self.item_code
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazy row iterator; starts from a zero balance on every call.
    pub fn rows(&self) -> StockCardRows<'_> {
        StockCardRows {
            entries: self.entries.iter(),
            balance: 0,
        }
    }

    /// Balance after the last row (0 for an empty card).
    pub fn final_balance(&self) -> i64 {
        self.entries.iter().map(HistoryEntry::signed_quantity).sum()
    }
}

/// Iterator returned by [`StockCard::rows`].
#[derive(Debug, Clone)]
pub struct StockCardRows<'a> {
    entries: slice::Iter<'a, HistoryEntry>,
    balance: i64,
}

impl Iterator for StockCardRows<'_> {
    type Item = StockCardRow;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let delta = entry.signed_quantity();
        self.balance += delta;

        Some(StockCardRow {
            date: entry.business_date(),
            description: describe(entry),
            qty_in: delta.max(0),
            qty_out: (-delta).max(0),
            balance: self.balance,
            action: entry.action,
            recorded_at: entry.recorded_at,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for StockCardRows<'_> {}

fn describe(entry: &HistoryEntry) -> String {
    let mut text = match entry.action {
        Action::AddItem => "Initial stock".to_string(),
        Action::ApproveIn => match entry.delivery_order_number() {
            Some(number) => format!("Stock in, DO {number}"),
            None => "Stock in".to_string(),
        },
        Action::ApproveOut => {
            let purpose = match entry.transaction_type() {
                Some(TransactionType::Sale) => "Sale",
                Some(TransactionType::Support) => "Support",
                None => "Stock out",
            };
            match entry.reference_event() {
                Some(event) => format!("{purpose}: {event}"),
                None => purpose.to_string(),
            }
        }
        Action::ApproveReturn => match entry.reference_event() {
            Some(event) => format!("Return from {event}"),
            None => "Return".to_string(),
        },
        other => other.as_str().to_string(),
    };
    if let Some(by) = entry.requested_by.as_deref() {
        text.push_str(&format!(" (requested by {by})"));
    }
    text
}
