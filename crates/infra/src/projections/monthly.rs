use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use brandstock_core::{DomainError, DomainResult, ItemCode};
use brandstock_inventory::{Action, TenantStore};

/// Calendar month bucket (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl core::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Approved movement totals of one item in one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCell {
    #[serde(rename = "in")]
    pub qty_in: i64,
    #[serde(rename = "out")]
    pub qty_out: i64,
    pub returned: i64,
}

impl MonthCell {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub item_code: ItemCode,
    pub item_name: String,
    pub unit: String,
    /// One cell per entry of `MonthlyAggregate::months`, same order.
    pub cells: Vec<MonthCell>,
    pub current_quantity: i64,
}

/// Item × month matrix of approved IN / OUT / RETURN quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    /// Oldest first, ending with the month of `as_of`.
    pub months: Vec<MonthKey>,
    pub rows: Vec<MonthlyRow>,
}

/// Widest window `build` accepts: one hundred years of columns.
pub const MAX_MONTHS_BACK: u32 = 1200;

impl MonthlyAggregate {
    /// Aggregate the `months_back` calendar months ending with `as_of`'s month.
    ///
    /// Entries are bucketed by business date; ADD_ITEM and rejections are
    /// not movements and are left out. Rows follow catalog (code) order.
    pub fn build(store: &TenantStore, months_back: u32, as_of: NaiveDate) -> DomainResult<Self> {
        if months_back == 0 {
            return Err(DomainError::invalid_input("months_back must be at least 1"));
        }
        if months_back > MAX_MONTHS_BACK {
            return Err(DomainError::invalid_input(format!(
                "months_back must be at most {MAX_MONTHS_BACK}, got {months_back}"
            )));
        }

        let mut months = Vec::with_capacity(months_back as usize);
        let mut month = MonthKey::of(as_of);
        for _ in 0..months_back {
            months.push(month);
            month = month.previous();
        }
        months.reverse();

        let column: HashMap<MonthKey, usize> = months.iter().enumerate().map(|(i, m)| (*m, i)).collect();
        let mut cells: HashMap<&ItemCode, Vec<MonthCell>> = HashMap::new();

        for entry in store.ledger().iter() {
            let Some(&idx) = column.get(&MonthKey::of(entry.business_date())) else {
                continue;
            };
            let row = cells
                .entry(&entry.item_code)
                .or_insert_with(|| vec![MonthCell::default(); months.len()]);
            let cell = &mut row[idx];
            match entry.action {
                Action::ApproveIn => cell.qty_in = cell.qty_in.saturating_add(entry.quantity),
                Action::ApproveOut => cell.qty_out = cell.qty_out.saturating_add(entry.quantity),
                Action::ApproveReturn => cell.returned = cell.returned.saturating_add(entry.quantity),
                _ => {}
            }
        }

        let rows = store
            .catalog()
            .iter()
            .map(|item| MonthlyRow {
                item_code: item.code.clone(),
                item_name: item.name.clone(),
                unit: item.unit.clone(),
                cells: cells
                    .remove(&item.code)
                    .unwrap_or_else(|| vec![MonthCell::default(); months.len()]),
                current_quantity: item.quantity,
            })
            .collect();

        Ok(Self { months, rows })
    }

    pub fn row(&self, code: &ItemCode) -> Option<&MonthlyRow> {
        self.rows.iter().find(|r| &r.item_code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandstock_auth::Users;
    use brandstock_core::BrandId;
    use brandstock_inventory::{NewItem, RequestDraft, TransactionType};
    use chrono::{DateTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn approve(t: &mut TenantStore, draft: RequestDraft, when: DateTime<Utc>) {
        let id = t.submit(&draft.with_requested_by("budi"), when).unwrap().id;
        t.approve(id, "admin", when).unwrap();
    }

    #[test]
    fn months_wrap_across_year_boundary() {
        let t = TenantStore::new(BrandId::parse("gulavit").unwrap(), Users::new());
        let agg = MonthlyAggregate::build(&t, 3, date(2024, 2, 10)).unwrap();
        let labels: Vec<String> = agg.months.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn movements_are_bucketed_by_business_month() {
        let mut t = TenantStore::new(BrandId::parse("gulavit").unwrap(), Users::new());
        t.add_item(NewItem::new("GV-1", "Gula", "kg", 50), "admin", at(2024, 1, 5)).unwrap();
        t.add_item(NewItem::new("GV-2", "Kopi", "kg", 0), "admin", at(2024, 1, 5)).unwrap();

        approve(&mut t, RequestDraft::stock_in("GV-1", 10, "kg", "DO-1"), at(2024, 2, 3));
        approve(&mut t, RequestDraft::stock_out("GV-1", 20, "kg", TransactionType::Sale, "Fair"), at(2024, 3, 4));
        approve(&mut t, RequestDraft::stock_return("GV-1", 5, "kg", "Fair"), at(2024, 3, 20));
        // Backdated into January, outside a two-month window ending in March.
        approve(
            &mut t,
            RequestDraft::stock_in("GV-1", 1, "kg", "DO-2").with_effective_date(date(2024, 1, 30)),
            at(2024, 3, 21),
        );

        let agg = MonthlyAggregate::build(&t, 2, date(2024, 3, 31)).unwrap();
        let row = agg.row(&ItemCode::parse("GV-1").unwrap()).unwrap();

        assert_eq!(agg.months.len(), 2);
        assert_eq!(row.cells[0], MonthCell { qty_in: 10, qty_out: 0, returned: 0 });
        assert_eq!(row.cells[1], MonthCell { qty_in: 0, qty_out: 20, returned: 5 });
        assert_eq!(row.current_quantity, 46);

        let idle = agg.row(&ItemCode::parse("GV-2").unwrap()).unwrap();
        assert!(idle.cells.iter().all(MonthCell::is_empty));
    }

    #[test]
    fn zero_months_is_invalid() {
        let t = TenantStore::new(BrandId::parse("gulavit").unwrap(), Users::new());
        assert!(MonthlyAggregate::build(&t, 0, date(2024, 1, 1)).is_err());
    }

    #[test]
    fn window_wider_than_limit_is_invalid() {
        let t = TenantStore::new(BrandId::parse("gulavit").unwrap(), Users::new());

        let err = MonthlyAggregate::build(&t, u32::MAX, date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let widest = MonthlyAggregate::build(&t, MAX_MONTHS_BACK, date(2024, 1, 1)).unwrap();
        assert_eq!(widest.months.len(), MAX_MONTHS_BACK as usize);
        assert_eq!(widest.months.last().map(ToString::to_string).as_deref(), Some("2024-01"));
    }
}
