//! Kinds of stock movement and the metadata each kind carries.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use brandstock_core::DomainError;

/// Direction of a requested stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestKind {
    In,
    Out,
    Return,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::In => "IN",
            RequestKind::Out => "OUT",
            RequestKind::Return => "RETURN",
        }
    }

    /// +1 for movements that add stock, -1 for those that remove it.
    pub fn sign(&self) -> i64 {
        match self {
            RequestKind::In | RequestKind::Return => 1,
            RequestKind::Out => -1,
        }
    }
}

impl core::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(RequestKind::In),
            "OUT" => Ok(RequestKind::Out),
            "RETURN" => Ok(RequestKind::Return),
            other => Err(DomainError::invalid_input(format!("unknown request kind '{other}'"))),
        }
    }
}

/// Purpose of an OUT movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Support,
    #[serde(alias = "Penjualan")]
    Sale,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Support => "Support",
            TransactionType::Sale => "Sale",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "support" => Ok(TransactionType::Support),
            "sale" | "penjualan" => Ok(TransactionType::Sale),
            other => Err(DomainError::invalid_input(format!(
                "unknown transaction type '{other}' (expected Support or Sale)"
            ))),
        }
    }
}

/// Kind-specific metadata. Each variant carries only the fields valid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum MovementDetails {
    #[serde(rename_all = "camelCase")]
    In { delivery_order_number: String },
    #[serde(rename_all = "camelCase")]
    Out {
        transaction_type: TransactionType,
        reference_event: String,
    },
    #[serde(rename_all = "camelCase")]
    Return { reference_event: String },
}

impl MovementDetails {
    pub fn kind(&self) -> RequestKind {
        match self {
            MovementDetails::In { .. } => RequestKind::In,
            MovementDetails::Out { .. } => RequestKind::Out,
            MovementDetails::Return { .. } => RequestKind::Return,
        }
    }

    /// Event / project the movement belongs to. IN movements have none.
    pub fn reference_event(&self) -> Option<&str> {
        match self {
            MovementDetails::In { .. } => None,
            MovementDetails::Out { reference_event, .. }
            | MovementDetails::Return { reference_event } => Some(reference_event),
        }
    }

    pub fn delivery_order_number(&self) -> Option<&str> {
        match self {
            MovementDetails::In { delivery_order_number } => Some(delivery_order_number),
            _ => None,
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            MovementDetails::Out { transaction_type, .. } => Some(*transaction_type),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_serialize_with_kind_tag() {
        let out = MovementDetails::Out {
            transaction_type: TransactionType::Sale,
            reference_event: "Expo".to_string(),
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "OUT", "transactionType": "Sale", "referenceEvent": "Expo" })
        );
        assert_eq!(out.kind(), RequestKind::Out);
        assert_eq!(out.reference_event(), Some("Expo"));
        assert_eq!(out.delivery_order_number(), None);
    }

    #[test]
    fn legacy_transaction_type_name_is_accepted() {
        let tt: TransactionType = serde_json::from_str("\"Penjualan\"").unwrap();
        assert_eq!(tt, TransactionType::Sale);
        assert_eq!("penjualan".parse::<TransactionType>().unwrap(), TransactionType::Sale);
        assert!("gift".parse::<TransactionType>().is_err());
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("return".parse::<RequestKind>().unwrap(), RequestKind::Return);
        assert_eq!(RequestKind::Out.sign(), -1);
        assert_eq!(RequestKind::Return.sign(), 1);
    }
}
