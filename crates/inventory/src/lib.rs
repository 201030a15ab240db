//! Inventory domain: catalog, ledger, request queue and approval engine.
//!
//! Business rules only, implemented as deterministic domain logic (no IO, no
//! clocks, no storage). Callers pass timestamps and actors in explicitly.

pub mod approval;
pub mod catalog;
pub mod ledger;
pub mod movement;
pub mod request;
pub mod tenant;

pub use catalog::{Catalog, Item, NewItem};
pub use ledger::{Action, HistoryEntry, Ledger};
pub use movement::{MovementDetails, RequestKind, TransactionType};
pub use request::{PendingRequest, RequestDraft, RequestQueue};
pub use tenant::{ConservationBreach, TenantData, TenantStore};
