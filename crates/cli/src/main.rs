//! brandstock - per-brand inventory ledger and approval CLI

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use brandstock_core::RequestId;
use brandstock_infra::{InventoryConfig, InventoryService, JsonFileRepository};

use crate::commands::items::{self, AddItemArgs};
use crate::commands::reports::{self, HistoryArgs};
use crate::commands::requests::{self, Decision, SubmitCommand};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "brandstock", version, about = "Brand inventory ledger and approval workflow")]
struct Cli {
    /// Brand (tenant) to operate on
    #[arg(long, short, global = true)]
    brand: Option<String>,

    /// Acting user
    #[arg(long, short, global = true, default_value = "admin")]
    user: String,

    /// Data directory (overrides BRANDSTOCK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a master item
    AddItem(AddItemArgs),
    /// List the catalog
    Items,
    /// Submit an IN / OUT / RETURN request
    #[command(subcommand)]
    Submit(SubmitCommand),
    /// List pending requests
    Pending,
    /// Approve one or more pending requests
    Approve {
        #[arg(required = true)]
        ids: Vec<RequestId>,
    },
    /// Reject one or more pending requests
    Reject {
        #[arg(required = true)]
        ids: Vec<RequestId>,
    },
    /// Running-balance card for one item (code or name)
    StockCard { item: String },
    /// Approved movements per item and month
    Monthly {
        #[arg(long)]
        months: Option<u32>,
    },
    /// Reorder forecast from recent outflow
    Reorder {
        /// Days of cover to order up to
        #[arg(long)]
        target_days: Option<u32>,
    },
    /// Ledger listing, newest first
    History(HistoryArgs),
    /// Headline numbers and daily activity
    Dashboard,
    /// Clear catalog, requests and history (users are kept)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    brandstock_observability::init();
    let cli = Cli::parse();

    let mut config = InventoryConfig::from_env().context("invalid BRANDSTOCK_* configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let Some(brand) = cli.brand else {
        bail!("--brand is required");
    };
    let user = cli.user.as_str();
    let format = cli.format;

    let svc = InventoryService::new(JsonFileRepository::new(config.data_dir.clone()), config);
    tracing::debug!(brand = %brand, user, "command started");

    match cli.command {
        Commands::AddItem(args) => items::add_item(&svc, &brand, user, args, format),
        Commands::Items => items::list(&svc, &brand, user, format),
        Commands::Submit(command) => requests::submit(&svc, &brand, user, command, format),
        Commands::Pending => requests::pending(&svc, &brand, user, format),
        Commands::Approve { ids } => requests::decide(&svc, &brand, user, Decision::Approve, &ids, format),
        Commands::Reject { ids } => requests::decide(&svc, &brand, user, Decision::Reject, &ids, format),
        Commands::StockCard { item } => reports::stock_card(&svc, &brand, user, &item, format),
        Commands::Monthly { months } => reports::monthly(&svc, &brand, user, months, format),
        Commands::Reorder { target_days } => reports::reorder(&svc, &brand, user, target_days, format),
        Commands::History(args) => reports::history(&svc, &brand, user, args, format),
        Commands::Dashboard => reports::dashboard(&svc, &brand, user, format),
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to reset brand '{brand}' without --yes");
            }
            svc.reset_tenant(&brand, user)?;
            println!("Brand '{brand}' reset");
            Ok(())
        }
    }
}
