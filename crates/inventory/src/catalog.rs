//! Master item list of one brand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use brandstock_core::{DomainError, DomainResult, ItemCode};

/// A stock-keeping item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub code: ItemCode,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub category: String,
    pub quantity: i64,
}

/// Payload for adding a master item.
///
/// `code: None` asks the tenant to allocate the next code from its item counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub code: Option<String>,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub initial_quantity: i64,
}

impl NewItem {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        initial_quantity: i64,
    ) -> Self {
        Self {
            code: Some(code.into()),
            name: name.into(),
            unit: unit.into(),
            category: String::new(),
            initial_quantity,
        }
    }

    /// Same as `new`, but without a code (allocated on insert).
    pub fn auto_code(name: impl Into<String>, unit: impl Into<String>, initial_quantity: i64) -> Self {
        Self {
            code: None,
            name: name.into(),
            unit: unit.into(),
            category: String::new(),
            initial_quantity,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Code → item map. Iteration is ordered by code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: BTreeMap<ItemCode, Item>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new item under `code`.
    ///
    /// Fails with `InvalidInput` on an empty name or negative quantity and with
    /// `DuplicateCode` when the code is taken.
    pub fn add_item(
        &mut self,
        code: ItemCode,
        name: &str,
        unit: &str,
        category: &str,
        initial_quantity: i64,
    ) -> DomainResult<&Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("item name cannot be empty"));
        }
        if initial_quantity < 0 {
            return Err(DomainError::invalid_input(format!(
                "initial quantity cannot be negative (got {initial_quantity})"
            )));
        }
        if self.items.contains_key(&code) {
            return Err(DomainError::DuplicateCode(code.to_string()));
        }

        let item = Item {
            code: code.clone(),
            name: name.to_string(),
            unit: unit.trim().to_string(),
            category: category.trim().to_string(),
            quantity: initial_quantity,
        };
        Ok(self.items.entry(code).or_insert(item))
    }

    pub fn lookup(&self, code: &ItemCode) -> Option<&Item> {
        self.items.get(code)
    }

    pub fn contains(&self, code: &ItemCode) -> bool {
        self.items.contains_key(code)
    }

    /// All items whose name matches `name` (trimmed, case-insensitive).
    ///
    /// Names are not a uniqueness key; callers must handle more than one match.
    pub fn find_by_name(&self, name: &str) -> Vec<&Item> {
        let needle = name.trim();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .values()
            .filter(|item| item.name.trim().eq_ignore_ascii_case(needle))
            .collect()
    }

    /// Resolve an item by code, falling back to a unique name match.
    pub fn resolve(&self, code: &ItemCode, name: Option<&str>) -> DomainResult<&Item> {
        if let Some(item) = self.items.get(code) {
            return Ok(item);
        }
        match name {
            Some(name) => self.resolve_name(name).map_err(|err| match err {
                DomainError::ItemNotFound(_) => DomainError::item_not_found(code.as_str()),
                other => other,
            }),
            None => Err(DomainError::item_not_found(code.as_str())),
        }
    }

    /// Resolve a caller-supplied key that may be either a code or a name.
    pub fn resolve_key(&self, key: &str) -> DomainResult<&Item> {
        if let Ok(code) = ItemCode::parse(key) {
            if let Some(item) = self.items.get(&code) {
                return Ok(item);
            }
        }
        self.resolve_name(key)
    }

    fn resolve_name(&self, name: &str) -> DomainResult<&Item> {
        let matches = self.find_by_name(name);
        match matches.as_slice() {
            [] => Err(DomainError::item_not_found(name.trim())),
            [only] => Ok(*only),
            many => Err(DomainError::AmbiguousItemName {
                name: name.trim().to_string(),
                codes: many.iter().map(|item| item.code.to_string()).collect(),
            }),
        }
    }

    /// The quantity `code` would have after `delta`, without mutating anything.
    pub fn check_delta(&self, code: &ItemCode, delta: i64) -> DomainResult<i64> {
        let item = self
            .items
            .get(code)
            .ok_or_else(|| DomainError::item_not_found(code.as_str()))?;

        let next = item
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_input(format!("quantity of {code} would overflow")))?;
        if next < 0 {
            return Err(DomainError::InsufficientStock {
                code: code.to_string(),
                available: item.quantity,
                requested: -delta,
            });
        }
        Ok(next)
    }

    /// Apply a signed movement and return the new quantity.
    ///
    /// Leaves the catalog untouched on `ItemNotFound`, `InsufficientStock` or
    /// an overflowing inbound movement.
    pub fn apply_delta(&mut self, code: &ItemCode, delta: i64) -> DomainResult<i64> {
        let next = self.check_delta(code, delta)?;
        if let Some(item) = self.items.get_mut(code) {
            item.quantity = next;
        }
        Ok(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ItemCode {
        ItemCode::parse(s).unwrap()
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_item(code("ITM-1"), "Gula Aren", "pcs", "food", 100).unwrap();
        catalog.add_item(code("ITM-2"), "Banner", "pcs", "promo", 5).unwrap();
        catalog
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let mut catalog = catalog();
        let err = catalog.add_item(code("ITM-1"), "Other", "pcs", "", 1).unwrap_err();
        assert_eq!(err, DomainError::DuplicateCode("ITM-1".to_string()));
    }

    #[test]
    fn invalid_master_data_is_rejected() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.add_item(code("X"), "  ", "pcs", "", 1),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.add_item(code("X"), "Thing", "pcs", "", -1),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn apply_delta_never_goes_negative() {
        let mut catalog = catalog();
        assert_eq!(catalog.apply_delta(&code("ITM-2"), -5).unwrap(), 0);

        let err = catalog.apply_delta(&code("ITM-2"), -1).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                code: "ITM-2".to_string(),
                available: 0,
                requested: 1,
            }
        );
        assert_eq!(catalog.lookup(&code("ITM-2")).unwrap().quantity, 0);
    }

    #[test]
    fn apply_delta_on_unknown_code_fails() {
        let mut catalog = catalog();
        assert_eq!(
            catalog.apply_delta(&code("NOPE"), 1).unwrap_err(),
            DomainError::ItemNotFound("NOPE".to_string())
        );
    }

    #[test]
    fn resolve_prefers_code_then_unique_name() {
        let catalog = catalog();
        assert_eq!(catalog.resolve(&code("ITM-2"), Some("Gula Aren")).unwrap().code, code("ITM-2"));
        assert_eq!(catalog.resolve(&code("OLD-9"), Some("gula aren")).unwrap().code, code("ITM-1"));
        assert_eq!(
            catalog.resolve(&code("OLD-9"), Some("Unknown")).unwrap_err(),
            DomainError::ItemNotFound("OLD-9".to_string())
        );
    }

    #[test]
    fn ambiguous_name_is_surfaced() {
        let mut catalog = catalog();
        catalog.add_item(code("ITM-3"), "Banner", "pcs", "promo", 1).unwrap();

        let err = catalog.resolve(&code("OLD-1"), Some("Banner")).unwrap_err();
        assert_eq!(
            err,
            DomainError::AmbiguousItemName {
                name: "Banner".to_string(),
                codes: vec!["ITM-2".to_string(), "ITM-3".to_string()],
            }
        );
        assert!(matches!(
            catalog.resolve_key("banner"),
            Err(DomainError::AmbiguousItemName { .. })
        ));
    }

    #[test]
    fn resolve_key_accepts_code_or_name() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_key("ITM-1").unwrap().name, "Gula Aren");
        assert_eq!(catalog.resolve_key("Gula Aren").unwrap().code, code("ITM-1"));
    }
}
