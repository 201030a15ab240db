use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use brandstock_core::BrandId;
use brandstock_inventory::TenantStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub entries: usize,
}

/// Headline numbers for one brand plus ledger activity per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub brand: BrandId,
    pub item_count: usize,
    pub entry_count: usize,
    pub pending_count: usize,
    pub total_quantity: i64,
    /// Oldest day first; days without entries are omitted.
    pub daily: Vec<DailyCount>,
}

impl Dashboard {
    pub fn build(store: &TenantStore) -> Self {
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for entry in store.ledger().iter() {
            *per_day.entry(entry.business_date()).or_default() += 1;
        }

        Self {
            brand: store.brand().clone(),
            item_count: store.catalog().len(),
            entry_count: store.ledger().len(),
            pending_count: store.queue().len(),
            total_quantity: store.catalog().iter().fold(0i64, |acc, i| acc.saturating_add(i.quantity)),
            daily: per_day
                .into_iter()
                .map(|(date, entries)| DailyCount { date, entries })
                .collect(),
        }
    }
}
