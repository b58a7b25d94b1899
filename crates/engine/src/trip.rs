//! The `Trip` aggregate: dates, budget, traveler counts and the ordered
//! city stops that make up the itinerary.
//!
//! Trips are mutated on cloned snapshots which are then handed back to the
//! session through `update_trip`; nothing here persists anything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Activity, CityStop, EngineError, Money, ResultEngine, ids::IdGenerator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripCategory {
    Solo,
    Couple,
    Family,
    Friends,
}

impl TripCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "Solo",
            Self::Couple => "Couple",
            Self::Family => "Family",
            Self::Friends => "Friends",
        }
    }
}

impl TryFrom<&str> for TripCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solo" => Ok(Self::Solo),
            "couple" => Ok(Self::Couple),
            "family" => Ok(Self::Family),
            "friends" => Ok(Self::Friends),
            other => Err(EngineError::validation(
                "category",
                format!("invalid trip category: {other}"),
            )),
        }
    }
}

impl core::fmt::Display for TripCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a trip; the session assigns the id.
#[derive(Clone, Debug)]
pub struct TripDraft {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_budget: Money,
    pub currency_code: String,
    pub adults_count: u32,
    pub children_count: u32,
    pub category: TripCategory,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Ordered destination legs; insertion order is display order.
    pub cities: Vec<CityStop>,
    pub total_budget: Money,
    pub currency_code: String,
    pub adults_count: u32,
    pub children_count: u32,
    pub category: TripCategory,
    /// Optional banner image reference.
    pub image: Option<String>,
}

impl Trip {
    /// Builds an empty-itinerary trip from a draft, enforcing the entity
    /// invariants.
    pub fn from_draft(draft: &TripDraft, ids: &mut dyn IdGenerator) -> ResultEngine<Self> {
        if draft.name.trim().is_empty() {
            return Err(EngineError::validation("name", "trip name is empty"));
        }
        if draft.end_date < draft.start_date {
            return Err(EngineError::validation(
                "end_date",
                "end date is before start date",
            ));
        }
        if draft.total_budget.is_negative() {
            return Err(EngineError::validation(
                "total_budget",
                "budget must be >= 0",
            ));
        }
        // Traveler count is a division denominator downstream; it can never
        // be zero, and a trip without adults is not bookable.
        if draft.adults_count == 0 {
            return Err(EngineError::validation(
                "adults_count",
                "at least one adult traveler is required",
            ));
        }
        Ok(Self {
            id: ids.next_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            cities: Vec::new(),
            total_budget: draft.total_budget,
            currency_code: draft.currency_code.clone(),
            adults_count: draft.adults_count,
            children_count: draft.children_count,
            category: draft.category,
            image: draft.image.clone(),
        })
    }

    /// Total traveler count; `>= 1` by construction.
    pub fn travelers(&self) -> u32 {
        self.adults_count + self.children_count
    }

    /// Appends a destination at the end of the itinerary.
    pub fn add_city(&mut self, city: CityStop) {
        self.cities.push(city);
    }

    /// Removes a destination and, with it, all of its activities.
    pub fn remove_city(&mut self, city_id: &str) -> ResultEngine<CityStop> {
        match self.cities.iter().position(|city| city.id == city_id) {
            Some(index) => Ok(self.cities.remove(index)),
            None => Err(EngineError::KeyNotFound(city_id.to_string())),
        }
    }

    pub fn city_mut(&mut self, city_id: &str) -> ResultEngine<&mut CityStop> {
        self.cities
            .iter_mut()
            .find(|city| city.id == city_id)
            .ok_or_else(|| EngineError::KeyNotFound(city_id.to_string()))
    }

    /// Adds an activity to the given destination.
    pub fn add_activity(&mut self, city_id: &str, activity: Activity) -> ResultEngine<()> {
        self.city_mut(city_id)?.add_activity(activity);
        Ok(())
    }

    pub fn remove_activity(&mut self, city_id: &str, activity_id: &str) -> ResultEngine<Activity> {
        self.city_mut(city_id)?.remove_activity(activity_id)
    }

    /// Logs real spend on an activity, looked up through its owning city.
    pub fn log_spend(
        &mut self,
        city_id: &str,
        activity_id: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        self.city_mut(city_id)?
            .activity_mut(activity_id)?
            .log_spend(amount)
    }
}
