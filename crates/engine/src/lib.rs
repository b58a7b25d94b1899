//! Trip itinerary and budget engine.
//!
//! [`Session`] is the aggregate root: it owns the in-memory trip
//! collection, the signed-in user and the display currency, and writes
//! every mutation through to its [`store::StateStore`]. All budget math and
//! dashboard queries are pure functions over the state it holds.

use serde_json::Value;

pub use activities::{Activity, ActivityKind};
pub use budget::BudgetBreakdown;
pub use cities::CityStop;
pub use currency::Currency;
pub use dashboard::TripFilter;
pub use error::EngineError;
pub use money::Money;
pub use trip::{Trip, TripCategory, TripDraft};
pub use users::User;

use ids::{IdGenerator, TokenIds};
use store::{JsonFileStore, StateStore};

mod activities;
pub mod budget;
mod cities;
mod currency;
pub mod dashboard;
mod error;
pub mod ids;
mod money;
pub mod store;
pub mod suggestions;
mod trip;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;

pub struct Session {
    trips: Vec<Trip>,
    user: Option<User>,
    currency: Currency,
    store: Box<dyn StateStore>,
    ids: Box<dyn IdGenerator>,
}

impl Session {
    /// Return a builder for `Session`. Help to build the struct.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, trip_id: &str) -> ResultEngine<&Trip> {
        self.trips
            .iter()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| EngineError::KeyNotFound(trip_id.to_string()))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Validates the draft, assigns a fresh id and appends the new trip to
    /// the collection.
    pub fn create_trip(&mut self, draft: &TripDraft) -> ResultEngine<Trip> {
        let trip = Trip::from_draft(draft, self.ids.as_mut())?;
        self.trips.push(trip.clone());
        self.persist_trips()?;
        Ok(trip)
    }

    /// Creates a trip from a draft plus a generated-itinerary payload.
    ///
    /// A malformed or absent payload degrades to an empty itinerary; the
    /// declared fields are still validated and still win.
    pub fn create_generated_trip(
        &mut self,
        draft: &TripDraft,
        payload: Option<&Value>,
    ) -> ResultEngine<Trip> {
        let trip = suggestions::generated_trip_or_empty(draft, payload, self.ids.as_mut())?;
        self.trips.push(trip.clone());
        self.persist_trips()?;
        Ok(trip)
    }

    /// Replaces the stored trip whose id matches `updated`.
    ///
    /// An unknown id is a silent no-op: the update may race a deletion and
    /// the stale copy must not be resurrected.
    pub fn update_trip(&mut self, updated: Trip) -> ResultEngine<()> {
        let Some(slot) = self.trips.iter_mut().find(|trip| trip.id == updated.id) else {
            return Ok(());
        };
        *slot = updated;
        self.persist_trips()
    }

    /// Removes a trip and everything it contains. Deleting an id that is
    /// already gone succeeds.
    pub fn delete_trip(&mut self, trip_id: &str) -> ResultEngine<()> {
        let before = self.trips.len();
        self.trips.retain(|trip| trip.id != trip_id);
        if self.trips.len() == before {
            return Ok(());
        }
        self.persist_trips()
    }

    /// Validates a city-suggestion payload against a trip and persists the
    /// merged result. The trip is untouched when the payload is malformed.
    pub fn add_suggested_city(&mut self, trip_id: &str, payload: &Value) -> ResultEngine<()> {
        // Merge on a cloned snapshot, then replace through update_trip.
        let trip = self.trip(trip_id)?.clone();
        let merged = suggestions::merge_city_suggestion(&trip, payload, self.ids.as_mut())?;
        self.update_trip(merged)
    }

    /// Creates a destination with a fresh id and appends it to the trip's
    /// itinerary.
    pub fn create_city(
        &mut self,
        trip_id: &str,
        name: String,
        country: String,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> ResultEngine<String> {
        let id = self.ids.next_id();
        let city = CityStop::new(id.clone(), name, country, start_date, end_date)?;
        let trip = self.trip_mut(trip_id)?;
        trip.add_city(city);
        self.persist_trips()?;
        Ok(id)
    }

    pub fn add_city(&mut self, trip_id: &str, city: CityStop) -> ResultEngine<()> {
        let trip = self.trip_mut(trip_id)?;
        trip.add_city(city);
        self.persist_trips()
    }

    pub fn remove_city(&mut self, trip_id: &str, city_id: &str) -> ResultEngine<()> {
        let trip = self.trip_mut(trip_id)?;
        trip.remove_city(city_id)?;
        self.persist_trips()
    }

    pub fn add_activity(
        &mut self,
        trip_id: &str,
        city_id: &str,
        name: String,
        kind: ActivityKind,
        cost: Money,
        duration: String,
        time: Option<String>,
    ) -> ResultEngine<String> {
        let id = self.ids.next_id();
        let activity = Activity::new(id.clone(), name, kind, cost, duration, time)?;
        let trip = self.trip_mut(trip_id)?;
        trip.add_activity(city_id, activity)?;
        self.persist_trips()?;
        Ok(id)
    }

    pub fn remove_activity(
        &mut self,
        trip_id: &str,
        city_id: &str,
        activity_id: &str,
    ) -> ResultEngine<()> {
        let trip = self.trip_mut(trip_id)?;
        trip.remove_activity(city_id, activity_id)?;
        self.persist_trips()
    }

    /// Records what an activity actually cost. Logging again overwrites the
    /// previous amount.
    pub fn log_spend(
        &mut self,
        trip_id: &str,
        city_id: &str,
        activity_id: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        let trip = self.trip_mut(trip_id)?;
        trip.log_spend(city_id, activity_id, amount)?;
        self.persist_trips()
    }

    /// Switches the display currency by code and persists the selection.
    pub fn set_currency(&mut self, code: &str) -> ResultEngine<Currency> {
        let currency = Currency::by_code(code)?;
        self.currency = currency.clone();
        self.store.save_currency(&self.currency)?;
        Ok(currency)
    }

    pub fn sign_in(&mut self, user: User) -> ResultEngine<()> {
        self.store.save_user(&user)?;
        self.user = Some(user);
        Ok(())
    }

    /// Clears the user record. The trip collection stays on disk.
    pub fn sign_out(&mut self) -> ResultEngine<()> {
        self.store.clear_user()?;
        self.user = None;
        Ok(())
    }

    /// Dashboard listing: tab filter, then search, then chronological sort.
    pub fn dashboard(
        &self,
        mode: TripFilter,
        query: &str,
        today: chrono::NaiveDate,
    ) -> Vec<&Trip> {
        dashboard::view(&self.trips, mode, query, today)
    }

    fn trip_mut(&mut self, trip_id: &str) -> ResultEngine<&mut Trip> {
        self.trips
            .iter_mut()
            .find(|trip| trip.id == trip_id)
            .ok_or_else(|| EngineError::KeyNotFound(trip_id.to_string()))
    }

    fn persist_trips(&self) -> ResultEngine<()> {
        self.store.save_trips(&self.trips)?;
        Ok(())
    }
}

/// The builder for `Session`
#[derive(Default)]
pub struct SessionBuilder {
    store: Option<Box<dyn StateStore>>,
    ids: Option<Box<dyn IdGenerator>>,
}

impl SessionBuilder {
    /// Pass the backing store. Defaults to a file store in the given
    /// directory when [`Self::store_dir`] is used instead.
    pub fn store(mut self, store: Box<dyn StateStore>) -> SessionBuilder {
        self.store = Some(store);
        self
    }

    pub fn store_dir(self, dir: impl Into<std::path::PathBuf>) -> ResultEngine<SessionBuilder> {
        let store = JsonFileStore::new(dir)?;
        Ok(self.store(Box::new(store)))
    }

    pub fn ids(mut self, ids: Box<dyn IdGenerator>) -> SessionBuilder {
        self.ids = Some(ids);
        self
    }

    /// Construct `Session`, hydrating state from the store.
    ///
    /// A missing or unreadable record degrades to its default (no user,
    /// INR, empty collection) instead of failing startup.
    pub fn build(self) -> Session {
        let store = self.store.unwrap_or_else(|| Box::new(store::MemoryStore::new()));
        let ids = self.ids.unwrap_or_else(|| Box::new(TokenIds));

        let user = load_or_default(store.load_user(), "user");
        let currency = load_or_default(store.load_currency(), "currency")
            .unwrap_or_default();
        let trips = load_or_default(store.load_trips(), "trips").unwrap_or_default();

        Session {
            trips,
            user,
            currency,
            store,
            ids,
        }
    }
}

fn load_or_default<T>(loaded: Result<Option<T>, store::StoreError>, record: &str) -> Option<T> {
    match loaded {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(record, %err, "unreadable record, starting from default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::store::{MemoryStore, TRIPS_RECORD};

    fn draft(name: &str) -> TripDraft {
        TripDraft {
            name: name.to_string(),
            description: String::new(),
            start_date: "2026-11-01".parse().unwrap(),
            end_date: "2026-11-08".parse().unwrap(),
            total_budget: Money::new(50_000),
            currency_code: "INR".to_string(),
            adults_count: 1,
            children_count: 0,
            category: TripCategory::Solo,
            image: None,
        }
    }

    fn session() -> Session {
        Session::builder()
            .ids(Box::new(SequentialIds::default()))
            .build()
    }

    fn city(id: &str, name: &str) -> CityStop {
        CityStop::new(
            id.to_string(),
            name.to_string(),
            "India".to_string(),
            "2026-11-01".parse().unwrap(),
            "2026-11-03".parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn create_assigns_id_and_appends() {
        let mut session = session();
        let trip = session.create_trip(&draft("Goa")).unwrap();
        assert_eq!(trip.id, "id-1");
        assert_eq!(session.trips().len(), 1);
        assert_eq!(session.trip("id-1").unwrap().name, "Goa");
    }

    #[test]
    fn unknown_trip_lookup_is_key_not_found() {
        let session = session();
        assert_eq!(
            session.trip("nope"),
            Err(EngineError::KeyNotFound("nope".to_string()))
        );
    }

    #[test]
    fn update_of_deleted_trip_is_a_silent_noop() {
        let mut session = session();
        let trip = session.create_trip(&draft("Goa")).unwrap();
        session.delete_trip(&trip.id).unwrap();

        let mut stale = trip.clone();
        stale.name = "Goa v2".to_string();
        session.update_trip(stale).unwrap();

        assert!(session.trips().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut session = session();
        let trip = session.create_trip(&draft("Goa")).unwrap();
        session.delete_trip(&trip.id).unwrap();
        session.delete_trip(&trip.id).unwrap();
        assert!(session.trips().is_empty());
    }

    #[test]
    fn mutations_write_through_to_the_store() {
        let store = MemoryStore::new();
        let mut session = Session::builder()
            .store(Box::new(store))
            .ids(Box::new(SequentialIds::default()))
            .build();

        let trip = session.create_trip(&draft("Kerala")).unwrap();
        session.add_city(&trip.id, city("c1", "Kochi")).unwrap();
        session
            .add_activity(
                &trip.id,
                "c1",
                "Fort walk".to_string(),
                ActivityKind::Sightseeing,
                Money::new(20_000),
                "2 hours".to_string(),
                None,
            )
            .unwrap();

        // A fresh session over the same records sees everything.
        // (MemoryStore is owned by the session, so rebuild through files.)
        let dir = tempfile::tempdir().unwrap();
        let mut on_disk = Session::builder()
            .store_dir(dir.path())
            .unwrap()
            .ids(Box::new(SequentialIds::default()))
            .build();
        let trip = on_disk.create_trip(&draft("Kerala")).unwrap();
        on_disk.add_city(&trip.id, city("c1", "Kochi")).unwrap();

        let reloaded = Session::builder().store_dir(dir.path()).unwrap().build();
        assert_eq!(reloaded.trips().len(), 1);
        assert_eq!(reloaded.trip(&trip.id).unwrap().cities[0].city_name, "Kochi");
    }

    #[test]
    fn corrupt_trips_record_degrades_to_empty() {
        let store = MemoryStore::new();
        store.put_raw(TRIPS_RECORD, "{definitely not json");

        let session = Session::builder().store(Box::new(store)).build();
        assert!(session.trips().is_empty());
        assert_eq!(session.currency(), &Currency::inr());
    }

    #[test]
    fn currency_switch_persists_and_rejects_unknown_codes() {
        let mut session = session();
        let eur = session.set_currency("eur").unwrap();
        assert_eq!(eur, Currency::eur());
        assert_eq!(session.currency(), &Currency::eur());

        assert!(matches!(
            session.set_currency("JPY"),
            Err(EngineError::KeyNotFound(_))
        ));
        assert_eq!(session.currency(), &Currency::eur());
    }

    #[test]
    fn sign_out_keeps_trips() {
        let mut session = session();
        session
            .sign_in(User::new("u1".into(), "Asha".into(), "asha@example.com".into()))
            .unwrap();
        session.create_trip(&draft("Goa")).unwrap();

        session.sign_out().unwrap();
        assert!(session.user().is_none());
        assert_eq!(session.trips().len(), 1);
    }

    #[test]
    fn spend_logging_reaches_the_activity() {
        let mut session = session();
        let trip = session.create_trip(&draft("Goa")).unwrap();
        session.add_city(&trip.id, city("c1", "Panaji")).unwrap();
        let activity_id = session
            .add_activity(
                &trip.id,
                "c1",
                "Cruise".to_string(),
                ActivityKind::Other,
                Money::new(30_000),
                "3 hours".to_string(),
                None,
            )
            .unwrap();

        session
            .log_spend(&trip.id, "c1", &activity_id, Money::new(35_000))
            .unwrap();
        let logged = &session.trip(&trip.id).unwrap().cities[0].activities[0];
        assert_eq!(logged.actual_cost, Some(Money::new(35_000)));
    }

    #[test]
    fn suggested_city_merge_round_trips_through_the_session() {
        let mut session = session();
        let trip = session.create_trip(&draft("Rajasthan")).unwrap();

        let payload = serde_json::json!({
            "cityName": "Udaipur",
            "country": "India",
            "activities": [
                {"name": "Lake Pichola", "type": "Sightseeing", "cost": 400.0, "duration": "2 hours"}
            ]
        });
        session.add_suggested_city(&trip.id, &payload).unwrap();
        assert_eq!(session.trip(&trip.id).unwrap().cities.len(), 1);

        // Malformed payload leaves the trip untouched.
        let bad = serde_json::json!({"cityName": "Jodhpur"});
        assert!(matches!(
            session.add_suggested_city(&trip.id, &bad),
            Err(EngineError::MalformedSuggestion(_))
        ));
        assert_eq!(session.trip(&trip.id).unwrap().cities.len(), 1);
    }
}
