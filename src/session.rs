use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::TripCatalog;
use crate::error::AppResult;
use crate::storage::KvStorage;
use crate::store::{DailyRecord, RecordStore};

const SUPERVISOR_KEY: &str = "supervisorName";
pub const SUPERVISOR_PLACEHOLDER: &str = "_______________";

/// Interval of the background safety-net flush.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Owns the record store and trip catalog for one run of the app.
/// Everything is constructed from an injected storage collaborator;
/// there is no global state.
pub struct Session {
    storage: Arc<dyn KvStorage>,
    store: Arc<Mutex<RecordStore>>,
    catalog: TripCatalog,
}

impl Session {
    /// Loads the store for the month containing `month` plus the trip
    /// catalog and supervisor name from `storage`.
    pub fn open(storage: Arc<dyn KvStorage>, month: NaiveDate) -> AppResult<Self> {
        let store = RecordStore::load(storage.clone(), month)?;
        let catalog = TripCatalog::load(storage.clone())?;
        Ok(Self {
            storage,
            store: Arc::new(Mutex::new(store)),
            catalog,
        })
    }

    pub fn month_key(&self) -> String {
        self.lock_store().month_key().to_string()
    }

    pub fn upsert_clock(
        &self,
        date: NaiveDate,
        clock_in: Option<&str>,
        clock_out: Option<&str>,
    ) -> AppResult<()> {
        self.lock_store().upsert_clock(date, clock_in, clock_out)
    }

    pub fn add_trip(
        &self,
        date: NaiveDate,
        destination: &str,
        airway_bill: Option<&str>,
    ) -> AppResult<()> {
        self.lock_store().add_trip(date, destination, airway_bill)
    }

    pub fn delete_record(&self, date: NaiveDate) -> AppResult<bool> {
        self.lock_store().delete_record(date)
    }

    pub fn snapshot(&self) -> BTreeMap<NaiveDate, DailyRecord> {
        self.lock_store().snapshot().clone()
    }

    pub fn catalog(&self) -> &TripCatalog {
        &self.catalog
    }

    pub fn add_destination(&mut self, name: &str) -> AppResult<()> {
        self.catalog.add(name)
    }

    pub fn supervisor_name(&self) -> String {
        self.storage
            .get(SUPERVISOR_KEY)
            .ok()
            .flatten()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| SUPERVISOR_PLACEHOLDER.to_string())
    }

    pub fn set_supervisor_name(&self, name: &str) -> AppResult<()> {
        self.storage.set(SUPERVISOR_KEY, name.trim())
    }

    /// Spawns the periodic flush. The returned handle stops the loop
    /// when dropped, so the flush dies with the session instead of
    /// free-running.
    pub fn start_autosave(&self, interval: Duration) -> AutosaveHandle {
        let store = self.store.clone();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let store = store.lock().unwrap_or_else(|e| e.into_inner());
                        if let Err(e) = store.flush() {
                            eprintln!("[ERROR] autosave flush failed: {e}");
                        }
                    }
                    // stop requested or the session is gone
                    _ => break,
                }
            }
        });

        AutosaveHandle {
            stop_tx,
            thread: Some(thread),
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, RecordStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct AutosaveHandle {
    stop_tx: mpsc::Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    pub fn stop(self) {
        // drop does the work
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
