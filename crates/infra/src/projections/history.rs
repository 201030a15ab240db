use chrono::NaiveDate;

use brandstock_core::ItemCode;
use brandstock_inventory::{Action, HistoryEntry, Ledger};

/// Filtered ledger listing, newest first.
///
/// Empty filters match everything. Date bounds are inclusive and apply to the
/// entry's business date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerQuery {
    pub item_code: Option<ItemCode>,
    pub actions: Vec<Action>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl LedgerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, code: ItemCode) -> Self {
        self.item_code = Some(code);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let day = entry.business_date();
        self.item_code.as_ref().is_none_or(|c| c == &entry.item_code)
            && (self.actions.is_empty() || self.actions.contains(&entry.action))
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
    }

    /// Matching entries ordered by `recorded_at` descending, later appends first on ties.
    pub fn run(&self, ledger: &Ledger) -> Vec<HistoryEntry> {
        let mut hits: Vec<&HistoryEntry> = ledger.iter().filter(|e| self.matches(e)).collect();
        hits.reverse();
        // Stable sort on the reversed ledger keeps later appends first among equal timestamps.
        hits.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        hits.into_iter()
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
