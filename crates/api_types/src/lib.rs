//! Wire shapes for the generative content-service boundary.
//!
//! These are the schemas the service is asked to fill and the shapes the
//! suggestion merger validates untrusted payloads against. Field names stay
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

pub mod suggestion {
    use super::*;

    /// City lookup result (request shape 1).
    ///
    /// Descriptive fields are optional on purpose: only the identity of the
    /// place is load-bearing, the rest is display garnish.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CityLookup {
        pub city_name: String,
        pub country: String,
        #[serde(default)]
        pub popularity_score: Option<f64>,
        #[serde(default)]
        pub cost_index: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub image_keyword: Option<String>,
    }

    /// One suggested activity (request shape 2 item, and the leaves of
    /// request shape 3).
    ///
    /// `name`, `type`, `cost` and `duration` are required; a payload item
    /// missing any of them fails deserialization and therefore the merge.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ActivitySuggestion {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub cost: f64,
        pub duration: String,
        #[serde(default)]
        pub time: Option<String>,
    }

    /// A city ready to be spliced into a trip: lookup identity plus its
    /// suggested activities.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CitySuggestion {
        pub city_name: String,
        pub country: String,
        #[serde(default)]
        pub image_keyword: Option<String>,
        pub activities: Vec<ActivitySuggestion>,
    }

    /// Full-itinerary generation result (request shape 3).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GeneratedItinerary {
        #[serde(default)]
        pub description: Option<String>,
        pub cities: Vec<CitySuggestion>,
    }
}

#[cfg(test)]
mod tests {
    use super::suggestion::*;

    #[test]
    fn activity_requires_cost() {
        let missing_cost = r#"{"name": "Fort walk", "type": "Sightseeing", "duration": "2h"}"#;
        assert!(serde_json::from_str::<ActivitySuggestion>(missing_cost).is_err());

        let complete =
            r#"{"name": "Fort walk", "type": "Sightseeing", "cost": 500, "duration": "2h"}"#;
        let act: ActivitySuggestion = serde_json::from_str(complete).unwrap();
        assert_eq!(act.kind, "Sightseeing");
        assert_eq!(act.time, None);
    }

    #[test]
    fn city_lookup_tolerates_missing_garnish() {
        let minimal = r#"{"cityName": "Jaipur", "country": "India"}"#;
        let city: CityLookup = serde_json::from_str(minimal).unwrap();
        assert_eq!(city.city_name, "Jaipur");
        assert!(city.image_keyword.is_none());
    }

    #[test]
    fn itinerary_requires_cities() {
        assert!(serde_json::from_str::<GeneratedItinerary>(r#"{"description": "x"}"#).is_err());
    }
}
