//! Read-only views derived from a tenant snapshot.
//!
//! All views are:
//! - **Pure**: built from a `TenantStore` value, never mutate it
//! - **Rebuildable**: replaying the same snapshot yields identical output
//! - **Tenant-isolated**: a view only ever sees one brand's data

pub mod dashboard;
pub mod history;
pub mod monthly;
pub mod reorder;
pub mod stock_card;

pub use dashboard::{DailyCount, Dashboard};
pub use history::LedgerQuery;
pub use monthly::{MonthCell, MonthKey, MonthlyAggregate, MonthlyRow, MAX_MONTHS_BACK};
pub use reorder::{ReorderForecast, ReorderParams, ReorderRow, UrgencyTier};
pub use stock_card::{StockCard, StockCardRow, StockCardRows};
