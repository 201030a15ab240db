//! `brandstock-auth`: binary role model and permission checks.
//!
//! This crate is intentionally decoupled from storage and transport: it knows
//! which roles exist and what they may do, nothing about how users log in.

pub mod authorize;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{authorize, Actor, AuthzError};
pub use permissions::Permission;
pub use roles::Role;
pub use user::{UserAccount, Users};
