//! Dashboard query engine.
//!
//! Stateless filtering, searching and sorting over the trip collection. The
//! dashboard always composes `filter -> search -> sort` in that order; the
//! functions are also usable on their own.

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, Trip};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TripFilter {
    #[default]
    Upcoming,
    Past,
    All,
}

impl TripFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for TripFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            "all" => Ok(Self::All),
            other => Err(EngineError::validation(
                "filter",
                format!("invalid filter: {other}"),
            )),
        }
    }
}

/// Keeps trips matching the dashboard tab.
///
/// `upcoming` keeps trips starting today or later; `past` keeps trips that
/// already ended. A trip currently underway (started, not yet ended)
/// matches neither tab. That asymmetry is intentional and pinned by a test
/// below.
pub fn filter<'a, I>(trips: I, mode: TripFilter, today: NaiveDate) -> Vec<&'a Trip>
where
    I: IntoIterator<Item = &'a Trip>,
{
    trips
        .into_iter()
        .filter(|trip| match mode {
            TripFilter::Upcoming => trip.start_date >= today,
            TripFilter::Past => trip.end_date < today,
            TripFilter::All => true,
        })
        .collect()
}

/// Case-insensitive substring match against the trip name or any contained
/// city name. A blank query passes everything through unchanged.
pub fn search<'a, I>(trips: I, query: &str) -> Vec<&'a Trip>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let needle = normalize(query);
    if needle.is_empty() {
        return trips.into_iter().collect();
    }
    trips
        .into_iter()
        .filter(|trip| {
            normalize(&trip.name).contains(&needle)
                || trip
                    .cities
                    .iter()
                    .any(|city| normalize(&city.city_name).contains(&needle))
        })
        .collect()
}

/// Ascending, stable sort by start date.
pub fn sort_by_start_date(mut trips: Vec<&Trip>) -> Vec<&Trip> {
    trips.sort_by_key(|trip| trip.start_date);
    trips
}

/// The dashboard view: `filter -> search -> sort`, fixed order.
pub fn view<'a>(
    trips: &'a [Trip],
    mode: TripFilter,
    query: &str,
    today: NaiveDate,
) -> Vec<&'a Trip> {
    sort_by_start_date(search(filter(trips, mode, today), query))
}

fn normalize(s: &str) -> String {
    s.trim().nfkc().collect::<String>().to_lowercase()
}
