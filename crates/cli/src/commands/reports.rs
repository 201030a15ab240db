//! Read-only report commands

use chrono::NaiveDate;
use clap::Args;

use brandstock_core::ItemCode;
use brandstock_infra::projections::{Dashboard, LedgerQuery, MonthlyAggregate, ReorderForecast, StockCardRow};
use brandstock_infra::{InventoryService, TenantRepository};
use brandstock_inventory::{Action, HistoryEntry};

use super::parse_date;
use crate::output::{clip, emit, OutputFormat};

pub fn stock_card<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    item: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let card = svc.stock_card(brand, user, item)?;
    let rows: Vec<StockCardRow> = card.rows().collect();
    emit(format, rows.as_slice(), |rows: &[StockCardRow]| {
        println!("Stock card {} ({}), unit {}", card.item_code(), card.item_name(), card.unit());
        println!("{:<10} {:<44} {:>8} {:>8} {:>9}", "DATE", "DESCRIPTION", "IN", "OUT", "BALANCE");
        for r in rows {
            println!(
                "{:<10} {:<44} {:>8} {:>8} {:>9}",
                r.date.to_string(),
                clip(&r.description, 44),
                r.qty_in,
                r.qty_out,
                r.balance
            );
        }
    })
}

pub fn monthly<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    months: Option<u32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let agg = svc.monthly_aggregate(brand, user, months)?;
    emit(format, &agg, |agg: &MonthlyAggregate| {
        let mut header = format!("{:<12}", "ITEM");
        for month in &agg.months {
            header.push_str(&format!(" {:>20}", format!("{month} in/out/ret")));
        }
        println!("{header} {:>8}", "STOCK");
        for row in &agg.rows {
            let mut line = format!("{:<12}", clip(row.item_code.as_str(), 12));
            for cell in &row.cells {
                line.push_str(&format!(" {:>20}", format!("{}/{}/{}", cell.qty_in, cell.qty_out, cell.returned)));
            }
            println!("{line} {:>8}", row.current_quantity);
        }
    })
}

pub fn reorder<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    target_days: Option<u32>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let forecast = svc.reorder_forecast(brand, user, target_days)?;
    emit(format, &forecast, |f: &ReorderForecast| {
        println!("Window {} (exclusive) to {}", f.window_start, f.as_of);
        println!(
            "{:<12} {:<24} {:>8} {:>9} {:>10} {:>8}  STATUS",
            "CODE", "NAME", "STOCK", "AVG/DAY", "COVER", "ORDER"
        );
        for r in &f.rows {
            let cover = r
                .days_of_cover
                .map(|d| format!("{d:.1}d"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<24} {:>8} {:>9.2} {:>10} {:>8}  {}",
                clip(r.item_code.as_str(), 12),
                clip(&r.item_name, 24),
                r.current_stock,
                r.avg_daily_out,
                cover,
                r.suggested_order_qty,
                r.tier.label()
            );
        }
    })
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Only entries for this item code
    #[arg(long)]
    item: Option<String>,
    /// Only these actions (e.g. approve_out); repeatable
    #[arg(long = "action", value_parser = parse_action)]
    actions: Vec<Action>,
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    #[arg(long)]
    limit: Option<usize>,
}

fn parse_action(s: &str) -> Result<Action, String> {
    let tag = s.trim().to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(tag)).map_err(|_| format!("unknown action '{s}'"))
}

impl HistoryArgs {
    fn into_query(self) -> anyhow::Result<LedgerQuery> {
        let mut query = LedgerQuery::new().between(self.from, self.to);
        if let Some(item) = self.item {
            query = query.item(ItemCode::parse(item)?);
        }
        for action in self.actions {
            query = query.action(action);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}

pub fn history<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    args: HistoryArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let entries = svc.history(brand, user, &args.into_query()?)?;
    emit(format, entries.as_slice(), |entries: &[HistoryEntry]| {
        if entries.is_empty() {
            println!("History is empty");
            return;
        }
        println!(
            "{:<20} {:<15} {:<12} {:>8} {:>8} {:<10} {:<12} EVENT/DO",
            "RECORDED", "ACTION", "ITEM", "QTY", "STOCK", "DATE", "ACTOR"
        );
        for e in entries {
            let stock = e.resulting_stock.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
            let reference = e.reference_event().or(e.delivery_order_number()).unwrap_or("-");
            println!(
                "{:<20} {:<15} {:<12} {:>8} {:>8} {:<10} {:<12} {}",
                e.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.action.as_str(),
                clip(e.item_code.as_str(), 12),
                e.quantity,
                stock,
                e.business_date().to_string(),
                clip(&e.actor, 12),
                reference
            );
        }
    })
}

pub fn dashboard<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let dashboard = svc.dashboard(brand, user)?;
    emit(format, &dashboard, |d: &Dashboard| {
        println!("Brand:            {}", d.brand.as_str().to_uppercase());
        println!("Items:            {}", d.item_count);
        println!("Total quantity:   {}", d.total_quantity);
        println!("Ledger entries:   {}", d.entry_count);
        println!("Pending requests: {}", d.pending_count);
        for day in &d.daily {
            println!("  {}  {}", day.date, "#".repeat(day.entries.min(60)));
        }
    })
}
