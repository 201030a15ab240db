//! Catalog commands

use clap::Args;

use brandstock_infra::{InventoryService, TenantRepository};
use brandstock_inventory::{Item, NewItem};

use crate::output::{clip, emit, OutputFormat};

#[derive(Args)]
pub struct AddItemArgs {
    /// Item code (allocated as ITM-nnnn when omitted)
    #[arg(long)]
    code: Option<String>,
    /// Item name
    #[arg(long)]
    name: String,
    /// Unit of measure (pcs, kg, ...)
    #[arg(long)]
    unit: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Opening quantity
    #[arg(long, default_value = "0")]
    qty: i64,
}

pub fn add_item<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    args: AddItemArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let new = NewItem {
        code: args.code,
        name: args.name,
        unit: args.unit,
        category: args.category,
        initial_quantity: args.qty,
    };
    let item = svc.add_item(brand, user, new)?;
    emit(format, &item, |item| println!("Added {} ({}) qty {} {}", item.code, item.name, item.quantity, item.unit))
}

pub fn list<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let items = svc.items(brand, user)?;
    emit(format, items.as_slice(), |items: &[Item]| {
        if items.is_empty() {
            println!("Inventory is empty");
            return;
        }
        println!("{:<12} {:<28} {:<14} {:>10} UNIT", "CODE", "NAME", "CATEGORY", "QTY");
        for item in items {
            println!(
                "{:<12} {:<28} {:<14} {:>10} {}",
                clip(item.code.as_str(), 12),
                clip(&item.name, 28),
                clip(&item.category, 14),
                item.quantity,
                item.unit
            );
        }
    })
}
