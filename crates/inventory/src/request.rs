//! Requests awaiting an admin decision.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use brandstock_core::{DomainError, DomainResult, ItemCode, RequestId, ValidationErrors};

use crate::ledger::Ledger;
use crate::movement::{MovementDetails, RequestKind, TransactionType};

/// Caller-supplied payload for a new request.
///
/// Fields are loosely typed on purpose: `validate` turns a draft into a
/// `PendingRequest` and reports every problem it finds in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub kind: RequestKind,
    pub item_code: String,
    pub item_name: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub requested_by: String,
    pub effective_date: Option<NaiveDate>,
    pub transaction_type: Option<TransactionType>,
    pub reference_event: Option<String>,
    pub delivery_order_number: Option<String>,
    pub attachment_ref: Option<String>,
}

impl RequestDraft {
    pub fn new(kind: RequestKind, item_code: impl Into<String>, quantity: i64, unit: impl Into<String>) -> Self {
        Self {
            kind,
            item_code: item_code.into(),
            item_name: None,
            quantity,
            unit: unit.into(),
            requested_by: String::new(),
            effective_date: None,
            transaction_type: None,
            reference_event: None,
            delivery_order_number: None,
            attachment_ref: None,
        }
    }

    /// IN request with its delivery order number.
    pub fn stock_in(item_code: impl Into<String>, quantity: i64, unit: impl Into<String>, delivery_order: impl Into<String>) -> Self {
        Self::new(RequestKind::In, item_code, quantity, unit).with_delivery_order(delivery_order)
    }

    /// OUT request for an event.
    pub fn stock_out(
        item_code: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        transaction_type: TransactionType,
        event: impl Into<String>,
    ) -> Self {
        Self::new(RequestKind::Out, item_code, quantity, unit)
            .with_transaction_type(transaction_type)
            .with_reference_event(event)
    }

    /// RETURN request referencing the event of an earlier OUT.
    pub fn stock_return(item_code: impl Into<String>, quantity: i64, unit: impl Into<String>, event: impl Into<String>) -> Self {
        Self::new(RequestKind::Return, item_code, quantity, unit).with_reference_event(event)
    }

    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    pub fn with_requested_by(mut self, username: impl Into<String>) -> Self {
        self.requested_by = username.into();
        self
    }

    pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = Some(date);
        self
    }

    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn with_reference_event(mut self, event: impl Into<String>) -> Self {
        self.reference_event = Some(event.into());
        self
    }

    pub fn with_delivery_order(mut self, number: impl Into<String>) -> Self {
        self.delivery_order_number = Some(number.into());
        self
    }

    pub fn with_attachment(mut self, reference: impl Into<String>) -> Self {
        self.attachment_ref = Some(reference.into());
        self
    }

    /// Validate the draft against the brand's ledger and build the pending request.
    ///
    /// Field problems are reported together as `Validation`. Only a draft with
    /// valid fields is checked for referential integrity: a RETURN must name an
    /// event that appears on an approved OUT of the same item.
    pub fn validate(
        &self,
        ledger: &Ledger,
        id: RequestId,
        requested_at: DateTime<Utc>,
    ) -> DomainResult<PendingRequest> {
        let mut errors = ValidationErrors::new();

        let item_code = ItemCode::parse(&self.item_code);
        if item_code.is_err() {
            errors.push("itemCode", "is required");
        }
        if self.quantity <= 0 {
            errors.push("quantity", format!("must be greater than zero (got {})", self.quantity));
        }
        if self.unit.trim().is_empty() {
            errors.push("unit", "is required");
        }
        if self.requested_by.trim().is_empty() {
            errors.push("requestedBy", "is required");
        }

        let event = non_blank(self.reference_event.as_deref());
        let delivery_order = non_blank(self.delivery_order_number.as_deref());

        let movement = match self.kind {
            RequestKind::In => {
                if delivery_order.is_none() {
                    errors.push("deliveryOrderNumber", "is required for IN requests");
                }
                delivery_order.map(|n| MovementDetails::In {
                    delivery_order_number: n.to_string(),
                })
            }
            RequestKind::Out => {
                if self.transaction_type.is_none() {
                    errors.push("transactionType", "is required for OUT requests (Support or Sale)");
                }
                if event.is_none() {
                    errors.push("referenceEvent", "is required for OUT requests");
                }
                match (self.transaction_type, event) {
                    (Some(transaction_type), Some(event)) => Some(MovementDetails::Out {
                        transaction_type,
                        reference_event: event.to_string(),
                    }),
                    _ => None,
                }
            }
            RequestKind::Return => {
                if event.is_none() {
                    errors.push("referenceEvent", "is required for RETURN requests");
                }
                event.map(|e| MovementDetails::Return {
                    reference_event: e.to_string(),
                })
            }
        };

        errors.into_result()?;
        let (Ok(item_code), Some(movement)) = (item_code, movement) else {
            return Err(DomainError::invalid_input("request draft failed validation"));
        };

        if let MovementDetails::Return { reference_event } = &movement {
            if !ledger.has_approved_out(&item_code, reference_event) {
                return Err(DomainError::ReferentialIntegrity {
                    item_code: item_code.to_string(),
                    reference_event: reference_event.clone(),
                });
            }
        }

        Ok(PendingRequest {
            id,
            item_code,
            item_name: non_blank(self.item_name.as_deref()).map(str::to_string),
            quantity: self.quantity,
            unit: self.unit.trim().to_string(),
            requested_by: self.requested_by.trim().to_string(),
            requested_at,
            effective_date: self.effective_date.unwrap_or_else(|| requested_at.date_naive()),
            movement,
            attachment_ref: non_blank(self.attachment_ref.as_deref()).map(str::to_string),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != "-")
}

/// A validated request waiting for approval or rejection. Never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub id: RequestId,
    pub item_code: ItemCode,
    /// Only consulted when `item_code` is missing from the catalog at approval time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub effective_date: NaiveDate,
    pub movement: MovementDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

impl PendingRequest {
    pub fn kind(&self) -> RequestKind {
        self.movement.kind()
    }

    /// IN → +quantity, OUT → −quantity, RETURN → +quantity.
    pub fn signed_delta(&self) -> i64 {
        self.kind().sign() * self.quantity
    }
}

/// Pending requests in submission order, keyed by `RequestId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestQueue {
    requests: Vec<PendingRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated request. Ids must be unique within the queue.
    pub fn enqueue(&mut self, request: PendingRequest) -> DomainResult<&PendingRequest> {
        if self.get(request.id).is_some() {
            return Err(DomainError::conflict(format!(
                "request {} is already queued",
                request.id
            )));
        }
        self.requests.push(request);
        Ok(&self.requests[self.requests.len() - 1])
    }

    pub fn get(&self, id: RequestId) -> Option<&PendingRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Remove and return the request with `id`.
    pub fn remove(&mut self, id: RequestId) -> DomainResult<PendingRequest> {
        let idx = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DomainError::RequestNotFound(id.to_string()))?;
        Ok(self.requests.remove(idx))
    }

    /// Snapshot of the queue, optionally restricted to one requester.
    pub fn list(&self, requested_by: Option<&str>) -> Vec<PendingRequest> {
        self.requests
            .iter()
            .filter(|r| requested_by.is_none_or(|user| r.requested_by == user))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}
