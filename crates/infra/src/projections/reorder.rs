use chrono::{Months, NaiveDate};
use serde::Serialize;

use brandstock_core::{DomainError, DomainResult, ItemCode};
use brandstock_inventory::{Action, TenantStore};

/// Days in a forecasting month.
const DAYS_PER_MONTH: f64 = 30.0;

/// Reorder urgency, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Urgent,
    ThisMonth,
    NextMonth,
    TwoMonths,
    Ok,
}

impl UrgencyTier {
    /// Tier for a days-of-cover figure; `None` (no consumption) is always `Ok`.
    pub fn for_cover(days_of_cover: Option<f64>) -> Self {
        match days_of_cover {
            Some(d) if d < 15.0 => UrgencyTier::Urgent,
            Some(d) if d < 30.0 => UrgencyTier::ThisMonth,
            Some(d) if d < 60.0 => UrgencyTier::NextMonth,
            Some(d) if d < 90.0 => UrgencyTier::TwoMonths,
            _ => UrgencyTier::Ok,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UrgencyTier::Urgent => "urgent",
            UrgencyTier::ThisMonth => "order this month",
            UrgencyTier::NextMonth => "order next month",
            UrgencyTier::TwoMonths => "order in two months",
            UrgencyTier::Ok => "ok",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderParams {
    pub lookback_months: u32,
    pub target_days_of_cover: u32,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRow {
    pub item_code: ItemCode,
    pub item_name: String,
    pub unit: String,
    pub current_stock: i64,
    pub out_in_window: i64,
    pub avg_daily_out: f64,
    /// `None` means unbounded (nothing went out in the window).
    pub days_of_cover: Option<f64>,
    pub tier: UrgencyTier,
    pub suggested_order_qty: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderForecast {
    /// First excluded day of the window; the window is `(window_start, as_of]`.
    pub window_start: NaiveDate,
    pub as_of: NaiveDate,
    pub rows: Vec<ReorderRow>,
}

impl ReorderForecast {
    /// Forecast every catalog item from approved OUT entries in the trailing window.
    ///
    /// Rows are sorted by tier, then days of cover (unbounded last), then code.
    pub fn build(store: &TenantStore, params: ReorderParams) -> DomainResult<Self> {
        if params.lookback_months == 0 {
            return Err(DomainError::invalid_input("lookback_months must be at least 1"));
        }
        let window_start = params
            .as_of
            .checked_sub_months(Months::new(params.lookback_months))
            .ok_or_else(|| DomainError::invalid_input("lookback window starts before the calendar"))?;
        let window_days = f64::from(params.lookback_months) * DAYS_PER_MONTH;
        let target = f64::from(params.target_days_of_cover);

        let mut rows: Vec<ReorderRow> = store
            .catalog()
            .iter()
            .map(|item| {
                let out_in_window: i64 = store
                    .ledger()
                    .for_item(&item.code)
                    .filter(|e| e.action == Action::ApproveOut)
                    .filter(|e| {
                        let day = e.business_date();
                        day > window_start && day <= params.as_of
                    })
                    .map(|e| e.quantity)
                    .sum();

                let avg_daily_out = out_in_window as f64 / window_days;
                let days_of_cover = (avg_daily_out > 0.0).then(|| item.quantity as f64 / avg_daily_out);
                let suggested_order_qty = if avg_daily_out > 0.0 {
                    (avg_daily_out * target - item.quantity as f64).ceil().max(0.0) as i64
                } else {
                    0
                };

                ReorderRow {
                    item_code: item.code.clone(),
                    item_name: item.name.clone(),
                    unit: item.unit.clone(),
                    current_stock: item.quantity,
                    out_in_window,
                    avg_daily_out,
                    days_of_cover,
                    tier: UrgencyTier::for_cover(days_of_cover),
                    suggested_order_qty,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            let cover = |r: &ReorderRow| r.days_of_cover.unwrap_or(f64::INFINITY);
            a.tier
                .cmp(&b.tier)
                .then_with(|| cover(a).total_cmp(&cover(b)))
                .then_with(|| a.item_code.cmp(&b.item_code))
        });

        Ok(Self {
            window_start,
            as_of: params.as_of,
            rows,
        })
    }

    /// Rows that need an order (anything but `Ok`).
    pub fn needing_order(&self) -> impl Iterator<Item = &ReorderRow> {
        self.rows.iter().filter(|r| r.tier != UrgencyTier::Ok)
    }
}
