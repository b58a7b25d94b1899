//! Durable session state.
//!
//! Three named records back the whole app: the signed-in user profile, the
//! currency selection and the trip collection. Each record is serialized as
//! one unit and overwritten wholesale on every relevant mutation, so no
//! partial write is ever observable. The store is injected into the session
//! (no ambient singleton) and swappable for an in-memory one in tests.

use std::{
    cell::RefCell,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{Currency, Trip, users::User};

/// Record names, kept from the original local-storage keys.
pub const USER_RECORD: &str = "gt_user";
pub const CURRENCY_RECORD: &str = "gt_currency";
pub const TRIPS_RECORD: &str = "gt_trips";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store record corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable key-value persistence for the three session records.
///
/// `load_*` returns `Ok(None)` when a record is absent and `Err` when it is
/// unreadable; the session maps both cases to defaults, never to a startup
/// failure.
pub trait StateStore {
    fn load_user(&self) -> Result<Option<User>, StoreError>;
    fn save_user(&self, user: &User) -> Result<(), StoreError>;
    fn clear_user(&self) -> Result<(), StoreError>;

    fn load_currency(&self) -> Result<Option<Currency>, StoreError>;
    fn save_currency(&self, currency: &Currency) -> Result<(), StoreError>;

    fn load_trips(&self) -> Result<Option<Vec<Trip>>, StoreError>;
    fn save_trips(&self, trips: &[Trip]) -> Result<(), StoreError>;
}

/// File-backed store: one JSON file per record inside a directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a record is always either the old version or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn record_path(&self, record: &str) -> PathBuf {
        self.dir.join(format!("{record}.json"))
    }

    fn read_record<T: DeserializeOwned>(&self, record: &str) -> Result<Option<T>, StoreError> {
        let path = self.record_path(record);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write_record<T: Serialize>(&self, record: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.record_path(record).with_extension("json.tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, self.record_path(record))?;
        Ok(())
    }

    fn remove_record(&self, record: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(record)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StateStore for JsonFileStore {
    fn load_user(&self) -> Result<Option<User>, StoreError> {
        self.read_record(USER_RECORD)
    }

    fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.write_record(USER_RECORD, user)
    }

    fn clear_user(&self) -> Result<(), StoreError> {
        self.remove_record(USER_RECORD)
    }

    fn load_currency(&self) -> Result<Option<Currency>, StoreError> {
        self.read_record(CURRENCY_RECORD)
    }

    fn save_currency(&self, currency: &Currency) -> Result<(), StoreError> {
        self.write_record(CURRENCY_RECORD, currency)
    }

    fn load_trips(&self) -> Result<Option<Vec<Trip>>, StoreError> {
        self.read_record(TRIPS_RECORD)
    }

    fn save_trips(&self, trips: &[Trip]) -> Result<(), StoreError> {
        self.write_record(TRIPS_RECORD, &trips)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T: DeserializeOwned>(&self, record: &'static str) -> Result<Option<T>, StoreError> {
        self.records
            .borrow()
            .get(record)
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
            .transpose()
    }

    fn write<T: Serialize>(&self, record: &'static str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.records.borrow_mut().insert(record, raw);
        Ok(())
    }

    /// Plants a raw record, bypassing serialization. Lets tests simulate a
    /// corrupt store.
    pub fn put_raw(&self, record: &'static str, raw: &str) {
        self.records.borrow_mut().insert(record, raw.to_string());
    }
}

impl StateStore for MemoryStore {
    fn load_user(&self) -> Result<Option<User>, StoreError> {
        self.read(USER_RECORD)
    }

    fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.write(USER_RECORD, user)
    }

    fn clear_user(&self) -> Result<(), StoreError> {
        self.records.borrow_mut().remove(USER_RECORD);
        Ok(())
    }

    fn load_currency(&self) -> Result<Option<Currency>, StoreError> {
        self.read(CURRENCY_RECORD)
    }

    fn save_currency(&self, currency: &Currency) -> Result<(), StoreError> {
        self.write(CURRENCY_RECORD, currency)
    }

    fn load_trips(&self) -> Result<Option<Vec<Trip>>, StoreError> {
        self.read(TRIPS_RECORD)
    }

    fn save_trips(&self, trips: &[Trip]) -> Result<(), StoreError> {
        self.write(TRIPS_RECORD, &trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Money, TripCategory, TripDraft, ids::SequentialIds};

    fn sample_trip() -> Trip {
        let draft = TripDraft {
            name: "Kerala Backwaters".to_string(),
            description: "Houseboats and hills".to_string(),
            start_date: "2026-12-20".parse().unwrap(),
            end_date: "2026-12-28".parse().unwrap(),
            total_budget: Money::new(80_000),
            currency_code: "INR".to_string(),
            adults_count: 2,
            children_count: 1,
            category: TripCategory::Family,
            image: None,
        };
        Trip::from_draft(&draft, &mut SequentialIds::default()).unwrap()
    }

    #[test]
    fn trips_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let trips = vec![sample_trip()];
        store.save_trips(&trips).unwrap();

        let reloaded = store.load_trips().unwrap().unwrap();
        assert_eq!(reloaded, trips);
    }

    #[test]
    fn absent_records_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        assert!(store.load_trips().unwrap().is_none());
        assert!(store.load_user().unwrap().is_none());
        assert!(store.load_currency().unwrap().is_none());
    }

    #[test]
    fn corrupt_record_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        std::fs::write(store.dir().join("gt_trips.json"), b"{not json").unwrap();

        assert!(matches!(
            store.load_trips(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn clear_user_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        store
            .save_user(&User::new("u1".into(), "Asha".into(), "asha@example.com".into()))
            .unwrap();
        store.clear_user().unwrap();
        store.clear_user().unwrap();
        assert!(store.load_user().unwrap().is_none());
    }

    #[test]
    fn currency_record_round_trips() {
        let store = MemoryStore::new();
        store.save_currency(&Currency::eur()).unwrap();
        assert_eq!(store.load_currency().unwrap(), Some(Currency::eur()));
    }
}
