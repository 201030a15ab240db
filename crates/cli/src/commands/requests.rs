//! Request workflow commands

use anyhow::bail;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use brandstock_core::RequestId;
use brandstock_infra::{BatchOutcome, InventoryService, TenantRepository};
use brandstock_inventory::{PendingRequest, RequestDraft, TransactionType};

use super::parse_date;
use crate::output::{clip, emit, OutputFormat};

/// Fields shared by every request kind.
#[derive(Args)]
pub struct CommonArgs {
    /// Item code
    #[arg(long)]
    item: String,
    /// Item name, used when the code is not in the catalog
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    qty: i64,
    #[arg(long)]
    unit: String,
    /// Business date (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Opaque reference to a stored attachment (e.g. a scanned DO)
    #[arg(long)]
    attachment: Option<String>,
}

#[derive(Subcommand)]
pub enum SubmitCommand {
    /// Goods received
    In {
        #[command(flatten)]
        common: CommonArgs,
        /// Delivery order number
        #[arg(long = "do")]
        delivery_order: String,
    },
    /// Goods leaving for an event or sale
    Out {
        #[command(flatten)]
        common: CommonArgs,
        /// Support or Sale
        #[arg(long = "type")]
        transaction_type: TransactionType,
        #[arg(long)]
        event: String,
    },
    /// Goods coming back from an event
    Return {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        event: String,
    },
}

impl SubmitCommand {
    fn into_draft(self) -> RequestDraft {
        let (draft, common) = match self {
            SubmitCommand::In { common, delivery_order } => (
                RequestDraft::stock_in(common.item.clone(), common.qty, common.unit.clone(), delivery_order),
                common,
            ),
            SubmitCommand::Out {
                common,
                transaction_type,
                event,
            } => (
                RequestDraft::stock_out(common.item.clone(), common.qty, common.unit.clone(), transaction_type, event),
                common,
            ),
            SubmitCommand::Return { common, event } => (
                RequestDraft::stock_return(common.item.clone(), common.qty, common.unit.clone(), event),
                common,
            ),
        };

        let mut draft = draft;
        if let Some(name) = common.name {
            draft = draft.with_item_name(name);
        }
        if let Some(date) = common.date {
            draft = draft.with_effective_date(date);
        }
        if let Some(attachment) = common.attachment {
            draft = draft.with_attachment(attachment);
        }
        draft
    }
}

pub fn submit<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    command: SubmitCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = svc.submit(brand, user, command.into_draft())?;
    emit(format, &request, |r| {
        println!("Submitted {} {} {} {} ({})", r.kind(), r.quantity, r.unit, r.item_code, r.id)
    })
}

pub fn pending<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let requests = svc.list_pending(brand, user)?;
    emit(format, requests.as_slice(), |requests: &[PendingRequest]| {
        if requests.is_empty() {
            println!("No pending requests");
            return;
        }
        println!("{:<36} {:<6} {:<12} {:>8} {:<6} {:<12} DATE", "ID", "KIND", "ITEM", "QTY", "UNIT", "BY");
        for r in requests {
            println!(
                "{:<36} {:<6} {:<12} {:>8} {:<6} {:<12} {}",
                r.id.to_string(),
                r.kind().as_str(),
                clip(r.item_code.as_str(), 12),
                r.quantity,
                clip(&r.unit, 6),
                clip(&r.requested_by, 12),
                r.effective_date
            );
        }
    })
}

#[derive(Clone, Copy)]
pub enum Decision {
    Approve,
    Reject,
}

pub fn decide<R: TenantRepository>(
    svc: &InventoryService<R>,
    brand: &str,
    user: &str,
    decision: Decision,
    ids: &[RequestId],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let outcomes = match decision {
        Decision::Approve => svc.approve_batch(brand, user, ids),
        Decision::Reject => svc.reject_batch(brand, user, ids),
    };
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    match format {
        OutputFormat::Text => outcomes.iter().for_each(print_outcome),
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(entry) => serde_json::json!({ "id": o.id, "ok": true, "entry": entry }),
                    Err(err) => serde_json::json!({ "id": o.id, "ok": false, "error": err.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    if failed > 0 {
        bail!("{failed} of {} request(s) failed", outcomes.len());
    }
    Ok(())
}

fn print_outcome(outcome: &BatchOutcome) {
    match &outcome.result {
        Ok(entry) => match entry.resulting_stock {
            Some(stock) => println!("{} {} {}: stock now {stock}", outcome.id, entry.action, entry.item_code),
            None => println!("{} {} {}", outcome.id, entry.action, entry.item_code),
        },
        Err(err) => println!("{} FAILED: {err}", outcome.id),
    }
}
