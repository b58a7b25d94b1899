//! The module contains the `CityStop` struct and its implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Activity, EngineError, ResultEngine};

/// One destination leg of a trip.
///
/// A city stop owns its activities; insertion order is itinerary order.
/// Removing the stop removes every contained activity with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityStop {
    pub id: String,
    pub city_name: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub activities: Vec<Activity>,
    /// Optional reference to a fetched place image.
    pub image: Option<String>,
}

impl CityStop {
    pub fn new(
        id: String,
        city_name: String,
        country: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ResultEngine<Self> {
        if city_name.trim().is_empty() {
            return Err(EngineError::validation("city_name", "city name is empty"));
        }
        if end_date < start_date {
            return Err(EngineError::validation(
                "end_date",
                "end date is before start date",
            ));
        }
        Ok(Self {
            id,
            city_name,
            country,
            start_date,
            end_date,
            activities: Vec::new(),
            image: None,
        })
    }

    /// Appends an activity at the end of the itinerary order.
    pub fn add_activity(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    pub fn remove_activity(&mut self, activity_id: &str) -> ResultEngine<Activity> {
        match self.activities.iter().position(|act| act.id == activity_id) {
            Some(index) => Ok(self.activities.remove(index)),
            None => Err(EngineError::KeyNotFound(activity_id.to_string())),
        }
    }

    pub fn activity_mut(&mut self, activity_id: &str) -> ResultEngine<&mut Activity> {
        self.activities
            .iter_mut()
            .find(|act| act.id == activity_id)
            .ok_or_else(|| EngineError::KeyNotFound(activity_id.to_string()))
    }
}
