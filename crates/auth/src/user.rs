//! Per-brand user accounts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::authorize::{Actor, AuthzError};
use crate::Role;

/// A stored user account.
///
/// `password` is an opaque credential carried through persistence for the
/// external login layer; nothing in this workspace interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl UserAccount {
    pub fn new(password: impl Into<String>, role: Role) -> Self {
        Self {
            password: password.into(),
            role,
        }
    }
}

/// Username → account map for one brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Users(BTreeMap<String, UserAccount>);

impl Users {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user set containing a single admin account.
    pub fn with_admin(username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut users = Self::new();
        users.insert(username, UserAccount::new(password, Role::Admin));
        users
    }

    pub fn insert(&mut self, username: impl Into<String>, account: UserAccount) -> Option<UserAccount> {
        self.0.insert(username.into(), account)
    }

    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.0.get(username)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Resolve a username to an acting identity.
    pub fn actor(&self, username: &str) -> Result<Actor, AuthzError> {
        self.get(username)
            .map(|account| Actor::new(username, account.role))
            .ok_or_else(|| AuthzError::UnknownUser(username.to_string()))
    }
}
