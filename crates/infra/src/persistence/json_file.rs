use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use brandstock_core::{AggregateRoot, BrandId, ExpectedVersion};
use brandstock_inventory::{TenantData, TenantStore};

use super::repository::{check_version, StorageError, TenantRepository};

/// One `<brand>.json` document per brand under `data_dir`.
///
/// Saves go to a temp file in the same directory and are renamed over the
/// target, so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    data_dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, brand: &BrandId) -> PathBuf {
        self.data_dir.join(format!("{}.json", brand.as_str()))
    }

    fn read(&self, brand: &BrandId) -> Result<Option<TenantData>, StorageError> {
        let path = self.path_for(brand);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(unavailable(&path, err)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display())))
    }

    fn write_atomic(&self, path: &Path, data: &TenantData) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| unavailable(&self.data_dir, e))?;

        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| StorageError::Corrupt(format!("serialize {}: {e}", path.display())))?;

        let mut tmp = NamedTempFile::new_in(&self.data_dir).map_err(|e| unavailable(&self.data_dir, e))?;
        tmp.write_all(&json).map_err(|e| unavailable(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| unavailable(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| unavailable(path, e.error))?;
        Ok(())
    }
}

fn unavailable(path: &Path, err: io::Error) -> StorageError {
    StorageError::Unavailable(format!("{}: {err}", path.display()))
}

impl TenantRepository for JsonFileRepository {
    fn load(&self, brand: &BrandId) -> Result<Option<TenantStore>, StorageError> {
        Ok(self
            .read(brand)?
            .map(|data| TenantStore::from_data(brand.clone(), data)))
    }

    fn save(&self, store: &TenantStore, expected: ExpectedVersion) -> Result<(), StorageError> {
        let stored = self.read(store.brand())?.map(|d| d.version).unwrap_or(0);
        check_version(store.brand(), expected, stored)?;
        if store.version() < stored {
            return Err(StorageError::Conflict(format!(
                "brand '{}': refusing to replace version {stored} with older version {}",
                store.brand(),
                store.version()
            )));
        }

        self.write_atomic(&self.path_for(store.brand()), store.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandstock_auth::Users;
    use brandstock_inventory::NewItem;
    use chrono::{TimeZone, Utc};

    fn brand(s: &str) -> BrandId {
        BrandId::parse(s).unwrap()
    }

    fn stocked_tenant() -> TenantStore {
        let mut store = TenantStore::new(brand("gulavit"), Users::with_admin("admin", "secret"));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        store
            .add_item(NewItem::new("GV-01", "Gula Aren", "kg", 40), "admin", at)
            .unwrap();
        store
    }

    #[test]
    fn saved_tenant_loads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        let store = stocked_tenant();

        repo.save(&store, ExpectedVersion::Exact(0)).unwrap();
        let loaded = repo.load(&brand("gulavit")).unwrap().unwrap();

        assert_eq!(loaded, store);
        assert!(repo.path_for(&brand("gulavit")).exists());
    }

    #[test]
    fn missing_file_is_none_and_other_brand_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        repo.save(&stocked_tenant(), ExpectedVersion::Any).unwrap();

        assert!(repo.load(&brand("takokak")).unwrap().is_none());
        assert!(!repo.path_for(&brand("takokak")).exists());
    }

    #[test]
    fn stale_writer_gets_conflict_and_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        let store = stocked_tenant();
        repo.save(&store, ExpectedVersion::Exact(0)).unwrap();
        let before = fs::read(repo.path_for(store.brand())).unwrap();

        let err = repo.save(&store, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(fs::read(repo.path_for(store.brand())).unwrap(), before);
    }

    #[test]
    fn garbage_document_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        fs::write(repo.path_for(&brand("gulavit")), b"{ not json").unwrap();

        assert!(matches!(repo.load(&brand("gulavit")), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn legacy_document_without_version_loads() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        let legacy = serde_json::json!({
            "users": { "admin": { "password": "admin", "role": "admin" } },
            "inventory": {
                "TK-7": { "code": "TK-7", "name": "Takoyaki Mix", "unit": "pack", "category": "", "quantity": 12 }
            },
            "itemCounter": 7,
            "pendingRequests": [],
            "history": []
        });
        fs::write(repo.path_for(&brand("takokak")), legacy.to_string()).unwrap();

        let store = repo.load(&brand("takokak")).unwrap().unwrap();
        assert_eq!(store.version(), 0);
        assert_eq!(store.item_counter(), 7);
        assert_eq!(store.catalog().len(), 1);
    }
}
