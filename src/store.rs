use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::storage::KvStorage;
use crate::timeutil::to_minutes;

/// The cargo-handling destination. Trips to it carry an airway bill and
/// never earn OT.
pub const CARGO_DESTINATION: &str = "KLIA Cargo";

/// Month names in the fixed locale the persistent keys use.
const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Mac",
    "April",
    "Mei",
    "Jun",
    "Julai",
    "Ogos",
    "September",
    "Oktober",
    "November",
    "Disember",
];

/// "MonthName Year" key identifying one month's record snapshot.
pub fn month_key(date: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

fn records_storage_key(month_key: &str) -> String {
    format!("dailyRecords_{month_key}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripCategory {
    Regular,
    Cargo,
}

/// One delivery run. The category is fixed at creation time so the OT
/// calculator never has to re-derive it from the label text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub label: String,
    pub category: TripCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(default)]
    pub clock_in: Option<String>,
    #[serde(default)]
    pub clock_out: Option<String>,
    #[serde(default)]
    pub trips: Vec<Trip>,
}

/// Records for exactly one calendar month, mirrored to the storage key
/// `dailyRecords_<MonthName Year>` as a whole-mapping overwrite.
pub struct RecordStore {
    storage: Arc<dyn KvStorage>,
    month_key: String,
    records: BTreeMap<NaiveDate, DailyRecord>,
}

impl RecordStore {
    pub fn load(storage: Arc<dyn KvStorage>, month: NaiveDate) -> AppResult<Self> {
        let month_key = month_key(month);
        let records = match storage.get(&records_storage_key(&month_key))? {
            // an unreadable snapshot starts the month empty rather than
            // blocking the session
            Some(content) => serde_json::from_str(&content).unwrap_or_default(),
            None => BTreeMap::new(),
        };
        Ok(Self {
            storage,
            month_key,
            records,
        })
    }

    pub fn month_key(&self) -> &str {
        &self.month_key
    }

    /// Creates the date's record if absent, then overwrites both clock
    /// fields. Empty strings mean "unset". Malformed times are rejected
    /// before anything is mutated.
    pub fn upsert_clock(
        &mut self,
        date: NaiveDate,
        clock_in: Option<&str>,
        clock_out: Option<&str>,
    ) -> AppResult<()> {
        self.check_month(date)?;
        let clock_in = validate_clock(clock_in)?;
        let clock_out = validate_clock(clock_out)?;

        let record = self.records.entry(date).or_default();
        record.clock_in = clock_in;
        record.clock_out = clock_out;

        self.flush()
    }

    /// Appends a trip to the date's record, creating the record if
    /// absent. Cargo trips get the airway bill folded into the label;
    /// repeated destinations are kept (multiple runs per day).
    pub fn add_trip(
        &mut self,
        date: NaiveDate,
        destination: &str,
        airway_bill: Option<&str>,
    ) -> AppResult<()> {
        self.check_month(date)?;
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(AppError::EmptyDestination);
        }

        let trip = if destination == CARGO_DESTINATION {
            Trip {
                label: format!("{} ({})", destination, airway_bill.unwrap_or("").trim()),
                category: TripCategory::Cargo,
            }
        } else {
            Trip {
                label: destination.to_string(),
                category: TripCategory::Regular,
            }
        };

        self.records.entry(date).or_default().trips.push(trip);
        self.flush()
    }

    /// Removes the date's record entirely. Returns `false` when there
    /// was nothing to remove.
    pub fn delete_record(&mut self, date: NaiveDate) -> AppResult<bool> {
        if self.records.remove(&date).is_none() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Read-only view, ascending by calendar date.
    pub fn snapshot(&self) -> &BTreeMap<NaiveDate, DailyRecord> {
        &self.records
    }

    /// Whole-mapping overwrite of the month key. In-memory state stays
    /// authoritative when this fails; the next flush retries implicitly.
    pub fn flush(&self) -> AppResult<()> {
        let content = serde_json::to_string(&self.records)?;
        self.storage.set(&records_storage_key(&self.month_key), &content)
    }

    fn check_month(&self, date: NaiveDate) -> AppResult<()> {
        if month_key(date) != self.month_key {
            return Err(AppError::OutOfMonth(date, self.month_key.clone()));
        }
        Ok(())
    }
}

fn validate_clock(time: Option<&str>) -> AppResult<Option<String>> {
    match time {
        Some(t) if !t.is_empty() => {
            to_minutes(t)?;
            Ok(Some(t.to_string()))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Backend whose writes can be switched to fail, like a full or
    /// unavailable storage area.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failing: AtomicBool,
    }

    impl FlakyStorage {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::Relaxed);
        }
    }

    impl KvStorage for FlakyStorage {
        fn get(&self, key: &str) -> AppResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> AppResult<()> {
            if self.failing.load(Ordering::Relaxed) {
                return Err(AppError::Storage("storage unavailable".to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> AppResult<()> {
            self.inner.remove(key)
        }
    }

    fn store() -> RecordStore {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        RecordStore::load(storage, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()).unwrap()
    }

    fn aug(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    #[test]
    fn test_month_key_fixed_locale() {
        assert_eq!(month_key(aug(4)), "Ogos 2025");
        assert_eq!(
            month_key(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            "Mac 2026"
        );
        assert_eq!(
            month_key(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()),
            "Disember 2026"
        );
    }

    #[test]
    fn test_upsert_then_overwrite() {
        let mut store = store();
        store
            .upsert_clock(aug(4), Some("08:00"), Some("18:00"))
            .unwrap();
        store
            .upsert_clock(aug(4), Some("09:00"), Some(""))
            .unwrap();

        let record = &store.snapshot()[&aug(4)];
        assert_eq!(record.clock_in.as_deref(), Some("09:00"));
        assert_eq!(record.clock_out, None);
        assert!(record.trips.is_empty());
    }

    #[test]
    fn test_upsert_rejects_malformed_time() {
        let mut store = store();
        assert!(
            store
                .upsert_clock(aug(4), Some("8am"), Some("18:00"))
                .is_err()
        );
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_add_trip_appends_in_order() {
        let mut store = store();
        store.add_trip(aug(4), "MBG 163", None).unwrap();
        store.add_trip(aug(4), "MBG Selayang", None).unwrap();
        store.add_trip(aug(4), "MBG 163", None).unwrap();

        let labels: Vec<&str> = store.snapshot()[&aug(4)]
            .trips
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(labels, ["MBG 163", "MBG Selayang", "MBG 163"]);
    }

    #[test]
    fn test_cargo_trip_label_and_category() {
        let mut store = store();
        store
            .add_trip(aug(5), CARGO_DESTINATION, Some("AWB-9981"))
            .unwrap();

        let trip = &store.snapshot()[&aug(5)].trips[0];
        assert_eq!(trip.label, "KLIA Cargo (AWB-9981)");
        assert_eq!(trip.category, TripCategory::Cargo);
    }

    #[test]
    fn test_add_trip_rejects_empty_destination() {
        let mut store = store();
        assert!(matches!(
            store.add_trip(aug(4), "  ", None),
            Err(AppError::EmptyDestination)
        ));
    }

    #[test]
    fn test_delete_record() {
        let mut store = store();
        store.add_trip(aug(4), "MBG 163", None).unwrap();

        assert!(store.delete_record(aug(4)).unwrap());
        assert!(!store.snapshot().contains_key(&aug(4)));
        // absent date is a no-op
        assert!(!store.delete_record(aug(4)).unwrap());
    }

    #[test]
    fn test_out_of_month_rejected() {
        let mut store = store();
        let sep = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert!(matches!(
            store.upsert_clock(sep, Some("08:00"), None),
            Err(AppError::OutOfMonth(..))
        ));
    }

    #[test]
    fn test_mutation_kept_when_flush_fails() {
        let storage = Arc::new(FlakyStorage::default());
        let mut store = RecordStore::load(storage.clone(), aug(1)).unwrap();

        storage.set_failing(true);
        assert!(matches!(
            store.upsert_clock(aug(4), Some("08:00"), Some("19:30")),
            Err(AppError::Storage(_))
        ));
        assert!(matches!(
            store.add_trip(aug(4), "MBG 163", None),
            Err(AppError::Storage(_))
        ));

        // the error surfaced, the in-memory state is still authoritative
        let record = &store.snapshot()[&aug(4)];
        assert_eq!(record.clock_in.as_deref(), Some("08:00"));
        assert_eq!(record.trips[0].label, "MBG 163");

        // next flush against a recovered backend persists everything
        storage.set_failing(false);
        store.flush().unwrap();

        let reloaded = RecordStore::load(storage, aug(1)).unwrap();
        let record = &reloaded.snapshot()[&aug(4)];
        assert_eq!(record.clock_in.as_deref(), Some("08:00"));
        assert_eq!(record.trips[0].label, "MBG 163");
    }

    #[test]
    fn test_corrupt_snapshot_starts_month_empty() {
        let dir = std::env::temp_dir().join(format!("otborang-store-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // neither valid UTF-8 nor valid JSON
        std::fs::write(dir.join("dailyRecords_Ogos 2025.json"), [0xff, 0xfe, 0x7b]).unwrap();

        let storage: Arc<dyn KvStorage> = Arc::new(FileStorage::with_dir(dir.clone()));
        let store = RecordStore::load(storage, aug(1)).unwrap();
        assert!(store.snapshot().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_flush_and_reload() {
        let storage: Arc<dyn KvStorage> = Arc::new(MemoryStorage::new());
        let month = aug(1);

        let mut store = RecordStore::load(storage.clone(), month).unwrap();
        store
            .upsert_clock(aug(4), Some("08:00"), Some("19:30"))
            .unwrap();
        store.add_trip(aug(4), "MBG DPulze", None).unwrap();

        let reloaded = RecordStore::load(storage, month).unwrap();
        let record = &reloaded.snapshot()[&aug(4)];
        assert_eq!(record.clock_in.as_deref(), Some("08:00"));
        assert_eq!(record.clock_out.as_deref(), Some("19:30"));
        assert_eq!(record.trips[0].label, "MBG DPulze");
    }
}
