//! Client for the generative content service.
//!
//! One outbound call per user intent: city lookup, activity suggestions and
//! whole-trip generation. Every request carries a JSON response schema so
//! the service answers in a machine-readable shape, but the reply is still
//! untrusted input: the public methods hand back raw payloads (or typed
//! lookups) and leave validation to the caller's merger.
//!
//! Failure is uniform by contract: network errors, non-success statuses and
//! unparseable replies all collapse to `None`/empty with a logged warning,
//! never to a caller-visible error.

use reqwest::Client;
use serde_json::{Value, json};

use api_types::suggestion::CityLookup;

#[derive(Debug, thiserror::Error)]
enum ContentError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("malformed reply: {0}")]
    Malformed(String),
}

#[derive(Clone, Debug)]
pub struct ContentClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ContentClient {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    /// Client against the default endpoint and model.
    pub fn with_key(api_key: String) -> Self {
        Self::new(
            Client::new(),
            Self::DEFAULT_BASE_URL.to_string(),
            api_key,
            Self::DEFAULT_MODEL.to_string(),
        )
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate(&self, prompt: String, schema: Value) -> Result<Value, ContentError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_else(|_| "server error".to_string());
            return Err(ContentError::Server { status, message });
        }

        let reply: Value = resp.json().await?;
        extract_payload(&reply)
    }

    /// Resolves a free-text query to one destination city.
    pub async fn city_lookup(&self, query: &str, currency_code: &str) -> Option<CityLookup> {
        let prompt = format!(
            "Suggest one popular travel destination city matching the query \
             \"{query}\". Return its name, country, a popularity score out of \
             10, a one-word cost index (Budget, Moderate or Expensive) \
             relative to prices in {currency_code}, a one-sentence \
             description and a single lowercase image search keyword."
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "cityName": { "type": "STRING" },
                "country": { "type": "STRING" },
                "popularityScore": { "type": "NUMBER" },
                "costIndex": { "type": "STRING" },
                "description": { "type": "STRING" },
                "imageKeyword": { "type": "STRING" },
            },
            "required": ["cityName", "country"],
        });

        let payload = match self.generate(prompt, schema).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, query, "city lookup failed");
                return None;
            }
        };
        match serde_json::from_value(payload) {
            Ok(city) => Some(city),
            Err(err) => {
                tracing::warn!(%err, query, "city lookup reply did not match schema");
                None
            }
        }
    }

    /// Suggested activities for a city, as raw payload items for the merger.
    pub async fn activity_suggestions(
        &self,
        city_name: &str,
        country: &str,
        currency_code: &str,
    ) -> Vec<Value> {
        let prompt = format!(
            "Suggest 5 must-do tourist activities in {city_name}, {country}. \
             For each give a short name, a type (one of Sightseeing, Food, \
             Transport, Stay, Other), an estimated cost per person in \
             {currency_code} as a plain number, a typical duration and an \
             ideal time of day."
        );
        let schema = json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "type": { "type": "STRING" },
                    "cost": { "type": "NUMBER" },
                    "duration": { "type": "STRING" },
                    "time": { "type": "STRING" },
                },
                "required": ["name", "type", "cost", "duration"],
            },
        });

        match self.generate(prompt, schema).await {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(city_name, "activity reply was not an array");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(%err, city_name, "activity suggestions failed");
                Vec::new()
            }
        }
    }

    /// Generates a whole itinerary for a planned trip. The reply is the raw
    /// payload the merger validates against the declared trip fields.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_trip(
        &self,
        name: &str,
        days: i64,
        budget: f64,
        currency_code: &str,
        adults: u32,
        children: u32,
        category: &str,
    ) -> Option<Value> {
        let prompt = format!(
            "Plan a {days}-day {category} trip named \"{name}\" for {adults} \
             adults and {children} children with a total budget of {budget} \
             {currency_code}. Return a short trip description and 1 to 3 \
             cities to visit; for each city give its name, country, a \
             lowercase image search keyword and 3 to 5 activities with name, \
             type (Sightseeing, Food, Transport, Stay or Other), estimated \
             cost per person in {currency_code}, duration and time of day. \
             Keep the summed activity costs within the budget."
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "description": { "type": "STRING" },
                "cities": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "cityName": { "type": "STRING" },
                            "country": { "type": "STRING" },
                            "imageKeyword": { "type": "STRING" },
                            "activities": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "OBJECT",
                                    "properties": {
                                        "name": { "type": "STRING" },
                                        "type": { "type": "STRING" },
                                        "cost": { "type": "NUMBER" },
                                        "duration": { "type": "STRING" },
                                        "time": { "type": "STRING" },
                                    },
                                    "required": ["name", "type", "cost", "duration"],
                                },
                            },
                        },
                        "required": ["cityName", "country", "activities"],
                    },
                },
            },
            "required": ["cities"],
        });

        match self.generate(prompt, schema).await {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(%err, name, "trip generation failed");
                None
            }
        }
    }

    /// City lookup followed by activity suggestions, assembled into one
    /// city-suggestion payload. `None` when the lookup itself fails; a
    /// failed activity call still yields the city with an empty list.
    pub async fn city_with_activities(&self, query: &str, currency_code: &str) -> Option<Value> {
        let city = self.city_lookup(query, currency_code).await?;
        let activities = self
            .activity_suggestions(&city.city_name, &city.country, currency_code)
            .await;
        Some(city_payload(&city, activities))
    }
}

fn city_payload(city: &CityLookup, activities: Vec<Value>) -> Value {
    json!({
        "cityName": city.city_name,
        "country": city.country,
        "imageKeyword": city.image_keyword,
        "activities": activities,
    })
}

/// Pulls the schema-shaped JSON text out of a generateContent reply.
fn extract_payload(reply: &Value) -> Result<Value, ContentError> {
    let text = reply["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| ContentError::Malformed("reply carries no text part".to_string()))?;
    serde_json::from_str(text).map_err(|err| ContentError::Malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[test]
    fn payload_text_is_parsed_as_json() {
        let reply = reply_with(r#"{"cityName": "Jaipur", "country": "India"}"#);
        let payload = extract_payload(&reply).unwrap();
        assert_eq!(payload["cityName"], "Jaipur");
    }

    #[test]
    fn reply_without_text_part_is_malformed() {
        let reply = json!({ "candidates": [] });
        assert!(matches!(
            extract_payload(&reply),
            Err(ContentError::Malformed(_))
        ));
    }

    #[test]
    fn payload_text_must_be_json() {
        let reply = reply_with("sorry, I cannot help with that");
        assert!(matches!(
            extract_payload(&reply),
            Err(ContentError::Malformed(_))
        ));
    }

    #[test]
    fn assembled_city_payload_matches_merger_shape() {
        let city = CityLookup {
            city_name: "Jaipur".to_string(),
            country: "India".to_string(),
            popularity_score: Some(9.0),
            cost_index: Some("Moderate".to_string()),
            description: None,
            image_keyword: Some("jaipur".to_string()),
        };
        let payload = city_payload(
            &city,
            vec![json!({
                "name": "Amber Fort", "type": "Sightseeing",
                "cost": 500.0, "duration": "3 hours"
            })],
        );
        assert_eq!(payload["cityName"], "Jaipur");
        assert_eq!(payload["imageKeyword"], "jaipur");
        assert_eq!(payload["activities"].as_array().map(Vec::len), Some(1));
    }
}
