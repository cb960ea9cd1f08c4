use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::storage::KvStorage;

const STORAGE_KEY: &str = "trips";

/// Destinations offered to record entry, seeded once and extended by
/// the user over time.
const DEFAULT_DESTINATIONS: [&str; 18] = [
    "KLIA Cargo",
    "MBG KLIA2",
    "MBG 163",
    "MBG AEON Maluri",
    "MBG NU Sentral",
    "MBG DPulze",
    "MBG Setapak Sentral",
    "MBG Selayang",
    "MBG Nilai",
    "MBG Redtick",
    "MBG AEON Shah Alam",
    "MBG IOI Putrajaya",
    "MBG MRT",
    "MBG Pavilion Bukit Jalil",
    "MBG Ampang",
    "MBG Bangsar",
    "MBG Setia Alam",
    "MBG Kota Daman sara",
];

/// Ordered, duplicate-free destination names: defaults first, then
/// user additions in the order they were added. Never auto-pruned.
pub struct TripCatalog {
    storage: Arc<dyn KvStorage>,
    names: Vec<String>,
}

impl TripCatalog {
    pub fn load(storage: Arc<dyn KvStorage>) -> AppResult<Self> {
        let names = match storage.get(STORAGE_KEY)? {
            Some(content) => serde_json::from_str(&content)
                .unwrap_or_else(|_| default_names()),
            None => default_names(),
        };
        Ok(Self { storage, names })
    }

    /// Appends a new destination and persists immediately. Duplicates
    /// (case-sensitive exact match) are signaled and leave the catalog
    /// untouched.
    pub fn add(&mut self, name: &str) -> AppResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyDestination);
        }
        if self.names.iter().any(|n| n == name) {
            return Err(AppError::DuplicateDestination(name.to_string()));
        }

        self.names.push(name.to_string());
        let content = serde_json::to_string(&self.names)?;
        self.storage.set(STORAGE_KEY, &content)
    }

    pub fn list(&self) -> &[String] {
        &self.names
    }
}

fn default_names() -> Vec<String> {
    DEFAULT_DESTINATIONS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn catalog() -> TripCatalog {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        TripCatalog::load(storage).unwrap()
    }

    #[test]
    fn test_seeded_with_defaults() {
        let catalog = catalog();
        assert_eq!(catalog.list().len(), 18);
        assert_eq!(catalog.list()[0], "KLIA Cargo");
        assert_eq!(catalog.list()[2], "MBG 163");
    }

    #[test]
    fn test_add_appends_after_defaults() {
        let mut catalog = catalog();
        catalog.add("MBG Cyberjaya").unwrap();
        assert_eq!(catalog.list().last().unwrap(), "MBG Cyberjaya");
    }

    #[test]
    fn test_duplicate_signaled_without_mutation() {
        let mut catalog = catalog();
        let before = catalog.list().len();

        assert!(matches!(
            catalog.add("MBG 163"),
            Err(AppError::DuplicateDestination(_))
        ));
        assert_eq!(catalog.list().len(), before);

        // case-sensitive: a different casing is a different entry
        catalog.add("mbg 163").unwrap();
        assert_eq!(catalog.list().len(), before + 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut catalog = catalog();
        assert!(matches!(catalog.add("   "), Err(AppError::EmptyDestination)));
    }

    #[test]
    fn test_persists_across_reload() {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        let mut catalog = TripCatalog::load(storage.clone()).unwrap();
        catalog.add("MBG Cyberjaya").unwrap();

        let reloaded = TripCatalog::load(storage).unwrap();
        assert_eq!(reloaded.list().last().unwrap(), "MBG Cyberjaya");
    }
}
