//! Load/save collaborator for whole-tenant state.

pub mod in_memory;
pub mod json_file;
pub mod repository;

pub use in_memory::InMemoryTenantRepository;
pub use json_file::JsonFileRepository;
pub use repository::{StorageError, TenantRepository};
