//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// One violated field of a submitted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

/// Every violation found while validating a payload, in field order.
///
/// Validation never stops at the first problem: callers get the full list so a
/// resubmission can fix all of them at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a `DomainError::Validation`.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, v) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.reason)?;
        }
        Ok(())
    }
}

/// Domain-level error.
///
/// Every variant is a recoverable, caller-facing result. Storage failures are
/// modelled by the infrastructure layer, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more required fields were missing or invalid.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A single argument was out of range (e.g. negative initial stock).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("item code '{0}' already exists")]
    DuplicateCode(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("request not found: {0}")]
    RequestNotFound(String),

    /// Applying the movement would drive stock below zero.
    #[error("insufficient stock for '{code}' (available: {available}, requested: {requested})")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// A name matched more than one catalog item.
    #[error("item name '{name}' is ambiguous (matches: {})", codes.join(", "))]
    AmbiguousItemName { name: String, codes: Vec<String> },

    /// A RETURN references an event with no approved OUT for the same item.
    #[error("no approved OUT for item '{item_code}' references event '{reference_event}'")]
    ReferentialIntegrity {
        item_code: String,
        reference_event: String,
    },

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn item_not_found(key: impl Into<String>) -> Self {
        Self::ItemNotFound(key.into())
    }

    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, reason);
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_every_violation() {
        let mut errors = ValidationErrors::new();
        errors.push("quantity", "must be greater than zero");
        errors.push("unit", "is required");

        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: quantity: must be greater than zero; unit: is required"
        );
    }

    #[test]
    fn empty_validation_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn ambiguous_name_lists_candidates() {
        let err = DomainError::AmbiguousItemName {
            name: "Gula".to_string(),
            codes: vec!["A-1".to_string(), "B-2".to_string()],
        };
        assert_eq!(err.to_string(), "item name 'Gula' is ambiguous (matches: A-1, B-2)");
    }
}
