//! Suggestion merger.
//!
//! Turns untrusted, schema-shaped payloads from the content service into
//! validated entities and splices them into a trip. Validation is
//! all-or-nothing per payload: either every suggested activity parses and
//! the whole city lands in the trip, or nothing does and the trip the
//! caller holds stays exactly as it was. The merger never persists;
//! its output goes back through `Session::update_trip`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use api_types::suggestion::{ActivitySuggestion, CitySuggestion, GeneratedItinerary};

use crate::{
    Activity, ActivityKind, CityStop, EngineError, Money, ResultEngine, Trip, TripDraft,
    ids::IdGenerator,
};

fn parse_payload<T: DeserializeOwned>(payload: &Value) -> ResultEngine<T> {
    serde_json::from_value(payload.clone())
        .map_err(|err| EngineError::MalformedSuggestion(err.to_string()))
}

fn activity_from_suggestion(
    suggestion: &ActivitySuggestion,
    ids: &mut dyn IdGenerator,
) -> ResultEngine<Activity> {
    let cost = Money::from_major_f64(suggestion.cost).map_err(|_| {
        EngineError::MalformedSuggestion(format!(
            "activity \"{}\": cost must be a number >= 0",
            suggestion.name
        ))
    })?;
    Activity::new(
        ids.next_id(),
        suggestion.name.clone(),
        ActivityKind::from_label(&suggestion.kind),
        cost,
        suggestion.duration.clone(),
        suggestion.time.clone(),
    )
    .map_err(|err| EngineError::MalformedSuggestion(err.to_string()))
}

fn city_from_suggestion(
    suggestion: &CitySuggestion,
    trip: &Trip,
    ids: &mut dyn IdGenerator,
) -> ResultEngine<CityStop> {
    // Validate every activity before constructing the stop, so a bad leaf
    // cannot leave a half-filled city behind.
    let mut activities = Vec::with_capacity(suggestion.activities.len());
    for activity in &suggestion.activities {
        activities.push(activity_from_suggestion(activity, ids)?);
    }

    // A suggested city inherits the trip's own date range; the traveler
    // narrows it down later.
    let mut city = CityStop::new(
        ids.next_id(),
        suggestion.city_name.clone(),
        suggestion.country.clone(),
        trip.start_date,
        trip.end_date,
    )
    .map_err(|err| EngineError::MalformedSuggestion(err.to_string()))?;
    city.activities = activities;
    city.image = Some(place_image(
        suggestion.image_keyword.as_deref().unwrap_or(&suggestion.city_name),
    ));
    Ok(city)
}

/// Image reference derived from the service's keyword, as the original app
/// stored it.
fn place_image(keyword: &str) -> String {
    format!("https://picsum.photos/seed/{keyword}/800/400")
}

/// Validates a city-suggestion payload and returns a copy of `trip` with
/// the new destination appended.
///
/// On [`EngineError::MalformedSuggestion`] the caller's trip is untouched;
/// a city is never partially merged.
pub fn merge_city_suggestion(
    trip: &Trip,
    payload: &Value,
    ids: &mut dyn IdGenerator,
) -> ResultEngine<Trip> {
    let suggestion: CitySuggestion = parse_payload(payload)?;
    let city = city_from_suggestion(&suggestion, trip, ids)?;

    let mut updated = trip.clone();
    updated.add_city(city);
    Ok(updated)
}

/// Builds a complete trip from a generated-itinerary payload.
///
/// The draft's declared fields (name, dates, budget, traveler counts,
/// category) always win; the payload contributes only the description and
/// the city/activity tree. Every city and activity gets a freshly generated
/// id.
pub fn merge_generated_trip(
    draft: &TripDraft,
    payload: &Value,
    ids: &mut dyn IdGenerator,
) -> ResultEngine<Trip> {
    let itinerary: GeneratedItinerary = parse_payload(payload)?;

    let mut trip = Trip::from_draft(draft, ids)?;
    if let Some(description) = itinerary.description
        && !description.trim().is_empty()
    {
        trip.description = description;
    }

    let mut cities = Vec::with_capacity(itinerary.cities.len());
    for city in &itinerary.cities {
        cities.push(city_from_suggestion(city, &trip, ids)?);
    }
    trip.cities = cities;
    Ok(trip)
}

/// Generated-trip creation with the documented fallback: a malformed or
/// absent payload degrades to an empty-itinerary trip built purely from the
/// declared fields. Draft validation errors still propagate.
pub fn generated_trip_or_empty(
    draft: &TripDraft,
    payload: Option<&Value>,
    ids: &mut dyn IdGenerator,
) -> ResultEngine<Trip> {
    match payload {
        Some(payload) => match merge_generated_trip(draft, payload, ids) {
            Ok(trip) => Ok(trip),
            Err(EngineError::MalformedSuggestion(reason)) => {
                tracing::warn!(%reason, "discarding malformed generated itinerary");
                Trip::from_draft(draft, ids)
            }
            Err(err) => Err(err),
        },
        None => Trip::from_draft(draft, ids),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TripCategory, ids::SequentialIds};
    use serde_json::json;

    fn draft() -> TripDraft {
        TripDraft {
            name: "Golden Triangle".to_string(),
            description: "Manually written".to_string(),
            start_date: "2026-10-01".parse().unwrap(),
            end_date: "2026-10-10".parse().unwrap(),
            total_budget: Money::new(100_000),
            currency_code: "INR".to_string(),
            adults_count: 2,
            children_count: 0,
            category: TripCategory::Couple,
            image: None,
        }
    }

    fn empty_trip() -> Trip {
        Trip::from_draft(&draft(), &mut SequentialIds::default()).unwrap()
    }

    fn city_payload() -> Value {
        json!({
            "cityName": "Jaipur",
            "country": "India",
            "imageKeyword": "jaipur-palace",
            "activities": [
                {"name": "Amber Fort", "type": "Sightseeing", "cost": 500.0, "duration": "3 hours"},
                {"name": "Thali dinner", "type": "Food", "cost": 350.0, "duration": "1 hour"}
            ]
        })
    }

    #[test]
    fn city_merge_appends_validated_stop() {
        let trip = empty_trip();
        let mut ids = SequentialIds::default();

        let updated = merge_city_suggestion(&trip, &city_payload(), &mut ids).unwrap();

        assert_eq!(updated.cities.len(), 1);
        let city = &updated.cities[0];
        assert_eq!(city.city_name, "Jaipur");
        // City inherits the trip's date range.
        assert_eq!(city.start_date, trip.start_date);
        assert_eq!(city.end_date, trip.end_date);
        assert_eq!(city.activities.len(), 2);
        assert_eq!(city.activities[0].cost, Money::new(50_000));
        assert_eq!(city.activities[0].actual_cost, None);
        // Deterministic ids: activities first, then the city.
        assert_eq!(city.activities[0].id, "id-1");
        assert_eq!(city.id, "id-3");
        // The input trip is a snapshot, untouched by the merge.
        assert!(trip.cities.is_empty());
    }

    #[test]
    fn missing_cost_rejects_the_whole_city() {
        let trip = empty_trip();
        let mut payload = city_payload();
        payload["activities"][1].as_object_mut().unwrap().remove("cost");

        let err = merge_city_suggestion(&trip, &payload, &mut SequentialIds::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedSuggestion(_)));
        assert!(trip.cities.is_empty());
    }

    #[test]
    fn negative_cost_rejects_the_whole_city() {
        let trip = empty_trip();
        let mut payload = city_payload();
        payload["activities"][0]["cost"] = json!(-10.0);

        assert!(matches!(
            merge_city_suggestion(&trip, &payload, &mut SequentialIds::default()),
            Err(EngineError::MalformedSuggestion(_))
        ));
    }

    #[test]
    fn unknown_activity_label_lands_in_other() {
        let trip = empty_trip();
        let mut payload = city_payload();
        payload["activities"][0]["type"] = json!("Adventure Sports");

        let updated =
            merge_city_suggestion(&trip, &payload, &mut SequentialIds::default()).unwrap();
        assert_eq!(updated.cities[0].activities[0].kind, ActivityKind::Other);
    }

    #[test]
    fn generated_trip_keeps_declared_fields() {
        let payload = json!({
            "description": "A royal circuit through Rajasthan.",
            "cities": [
                {
                    "cityName": "Jaipur",
                    "country": "India",
                    "imageKeyword": "jaipur",
                    "activities": [
                        {"name": "City Palace", "type": "Sightseeing", "cost": 700.0,
                         "duration": "2 hours", "time": "09:00 AM"}
                    ]
                },
                {
                    "cityName": "Agra",
                    "country": "India",
                    "imageKeyword": "taj-mahal",
                    "activities": []
                }
            ]
        });

        let trip =
            merge_generated_trip(&draft(), &payload, &mut SequentialIds::default()).unwrap();

        // Declared fields win over anything the payload could claim.
        assert_eq!(trip.name, "Golden Triangle");
        assert_eq!(trip.total_budget, Money::new(100_000));
        assert_eq!(trip.travelers(), 2);
        // Descriptive text comes from the payload.
        assert_eq!(trip.description, "A royal circuit through Rajasthan.");
        assert_eq!(trip.cities.len(), 2);
        assert_eq!(trip.cities[1].city_name, "Agra");
        assert_eq!(trip.cities[0].activities[0].time.as_deref(), Some("09:00 AM"));
    }

    #[test]
    fn malformed_itinerary_falls_back_to_empty_trip() {
        let payload = json!({"description": "no cities key"});

        let trip = generated_trip_or_empty(
            &draft(),
            Some(&payload),
            &mut SequentialIds::default(),
        )
        .unwrap();

        assert!(trip.cities.is_empty());
        assert_eq!(trip.name, "Golden Triangle");
        assert_eq!(trip.description, "Manually written");
    }

    #[test]
    fn absent_payload_falls_back_to_empty_trip() {
        let trip =
            generated_trip_or_empty(&draft(), None, &mut SequentialIds::default()).unwrap();
        assert!(trip.cities.is_empty());
    }

    #[test]
    fn invalid_draft_still_fails_generated_creation() {
        let mut bad = draft();
        bad.adults_count = 0;
        bad.children_count = 0;
        assert!(matches!(
            generated_trip_or_empty(&bad, None, &mut SequentialIds::default()),
            Err(EngineError::Validation { .. })
        ));
    }
}
