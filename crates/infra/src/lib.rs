//! Infrastructure layer: persistence, locking, config, views and the service facade.

pub mod clock;
pub mod config;
pub mod locks;
pub mod persistence;
pub mod projections;
pub mod service;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::InventoryConfig;
pub use persistence::{InMemoryTenantRepository, JsonFileRepository, StorageError, TenantRepository};
pub use service::{BatchOutcome, InventoryService, ServiceError};
