//! Environment-driven configuration.

use std::path::PathBuf;

use brandstock_auth::Users;
use brandstock_core::{BrandId, DomainError};

const DEFAULT_BRANDS: &str = "gulavit,takokak";
const DEFAULT_ADMIN: &str = "admin";

/// Runtime settings for the inventory service.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryConfig {
    /// Directory holding one `<brand>.json` per brand.
    pub data_dir: PathBuf,
    /// Brands the service accepts. Empty means any well-formed brand.
    pub brands: Vec<BrandId>,
    pub admin_user: String,
    pub admin_password: String,
    pub reorder_lookback_months: u32,
    pub target_days_of_cover: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            brands: parse_brands(DEFAULT_BRANDS).unwrap_or_default(),
            admin_user: DEFAULT_ADMIN.to_string(),
            admin_password: DEFAULT_ADMIN.to_string(),
            reorder_lookback_months: 3,
            target_days_of_cover: 30,
        }
    }
}

impl InventoryConfig {
    /// Read `BRANDSTOCK_*` variables from the process environment.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("BRANDSTOCK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let brands = parse_brands(&lookup("BRANDSTOCK_BRANDS").unwrap_or_else(|| DEFAULT_BRANDS.to_string()))?;

        let admin_user = lookup("BRANDSTOCK_ADMIN_USER").unwrap_or(defaults.admin_user);
        let admin_password = lookup("BRANDSTOCK_ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("BRANDSTOCK_ADMIN_PASSWORD not set; seeding new brands with the insecure default");
            DEFAULT_ADMIN.to_string()
        });

        let reorder_lookback_months = parse_positive(
            "BRANDSTOCK_REORDER_LOOKBACK_MONTHS",
            lookup("BRANDSTOCK_REORDER_LOOKBACK_MONTHS"),
            defaults.reorder_lookback_months,
        )?;
        let target_days_of_cover = parse_positive(
            "BRANDSTOCK_TARGET_DAYS_OF_COVER",
            lookup("BRANDSTOCK_TARGET_DAYS_OF_COVER"),
            defaults.target_days_of_cover,
        )?;

        Ok(Self {
            data_dir,
            brands,
            admin_user,
            admin_password,
            reorder_lookback_months,
            target_days_of_cover,
        })
    }

    /// User set a brand is seeded with the first time it is touched.
    pub fn default_users(&self) -> Users {
        Users::with_admin(self.admin_user.clone(), self.admin_password.clone())
    }

    pub fn allows(&self, brand: &BrandId) -> bool {
        self.brands.is_empty() || self.brands.contains(brand)
    }
}

fn parse_brands(raw: &str) -> Result<Vec<BrandId>, DomainError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(BrandId::parse)
        .collect()
}

fn parse_positive(key: &str, raw: Option<String>, default: u32) -> Result<u32, DomainError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(DomainError::invalid_input(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<InventoryConfig, DomainError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InventoryConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, InventoryConfig::default());
        assert!(cfg.allows(&BrandId::parse("gulavit").unwrap()));
        assert!(!cfg.allows(&BrandId::parse("other").unwrap()));
    }

    #[test]
    fn empty_brand_list_allows_any_brand() {
        let cfg = config(&[("BRANDSTOCK_BRANDS", " ")]).unwrap();
        assert!(cfg.brands.is_empty());
        assert!(cfg.allows(&BrandId::parse("anything").unwrap()));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("BRANDSTOCK_DATA_DIR", "/var/lib/brandstock"),
            ("BRANDSTOCK_BRANDS", "gulavit, kopiku"),
            ("BRANDSTOCK_ADMIN_USER", "root"),
            ("BRANDSTOCK_ADMIN_PASSWORD", "s3cret"),
            ("BRANDSTOCK_REORDER_LOOKBACK_MONTHS", "6"),
            ("BRANDSTOCK_TARGET_DAYS_OF_COVER", "45"),
        ])
        .unwrap();

        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/brandstock"));
        assert_eq!(cfg.brands.len(), 2);
        assert_eq!(cfg.reorder_lookback_months, 6);
        assert_eq!(cfg.target_days_of_cover, 45);
        assert!(cfg.default_users().get("root").is_some());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config(&[("BRANDSTOCK_REORDER_LOOKBACK_MONTHS", "0")]).is_err());
        assert!(config(&[("BRANDSTOCK_TARGET_DAYS_OF_COVER", "soon")]).is_err());
        assert!(config(&[("BRANDSTOCK_BRANDS", "Bad Brand")]).is_err());
    }
}
