use thiserror::Error;

use crate::{Permission, Role};

/// An identified user acting within one brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("forbidden: '{username}' lacks permission '{permission}'")]
    Forbidden {
        username: String,
        permission: &'static str,
    },
}

/// Check that an actor's role grants `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(actor: &Actor, required: Permission) -> Result<(), AuthzError> {
    if actor.role.grants(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            username: actor.username.clone(),
            permission: required.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_granted_everything() {
        let admin = Actor::new("admin", Role::Admin);
        for permission in Permission::ALL {
            assert!(authorize(&admin, *permission).is_ok());
        }
    }

    #[test]
    fn regular_user_can_submit_and_read_only() {
        let user = Actor::new("budi", Role::User);
        assert!(authorize(&user, Permission::SubmitRequest).is_ok());
        assert!(authorize(&user, Permission::ViewReports).is_ok());

        let err = authorize(&user, Permission::ManageRequests).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                username: "budi".to_string(),
                permission: "inventory.request.manage",
            }
        );
        assert!(authorize(&user, Permission::ResetTenant).is_err());
        assert!(authorize(&user, Permission::ManageCatalog).is_err());
    }
}
