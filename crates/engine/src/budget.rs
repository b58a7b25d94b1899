//! Budget aggregation.
//!
//! Pure read-model functions over a trip. Everything here is O(total
//! activity count) and recomputed on every call: trips mutate often enough
//! that a stale cache would cost more than the walk.

use serde::{Deserialize, Serialize};

use crate::{ActivityKind, Money, Trip};

/// Actual spend bucketed by activity type. Derived on demand, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub transport: Money,
    pub stay: Money,
    pub activities: Money,
    pub food: Money,
}

impl BudgetBreakdown {
    pub fn total(&self) -> Money {
        self.transport + self.stay + self.activities + self.food
    }
}

/// Sum of planned costs over every activity in every city.
pub fn planned_total(trip: &Trip) -> Money {
    trip.cities
        .iter()
        .flat_map(|city| &city.activities)
        .fold(Money::ZERO, |acc, act| acc + act.cost)
}

/// Sum of logged spend. Activities with nothing logged contribute zero,
/// not their planned cost: "spent" and "planned" are tracked independently.
pub fn actual_total(trip: &Trip) -> Money {
    trip.cities
        .iter()
        .flat_map(|city| &city.activities)
        .fold(Money::ZERO, |acc, act| {
            acc + act.actual_cost.unwrap_or(Money::ZERO)
        })
}

/// Actual spend divided across all travelers. The trip invariant keeps the
/// denominator >= 1, so this cannot divide by zero.
pub fn cost_per_person(trip: &Trip) -> Money {
    actual_total(trip).split_per_head(trip.travelers())
}

pub fn is_over_budget(trip: &Trip) -> bool {
    actual_total(trip) > trip.total_budget
}

/// Buckets actual spend by activity type.
///
/// Sightseeing and Other both land in `activities`; unlogged activities
/// contribute zero to their bucket, so the buckets always sum to
/// [`actual_total`].
pub fn breakdown(trip: &Trip) -> BudgetBreakdown {
    let mut out = BudgetBreakdown::default();
    for act in trip.cities.iter().flat_map(|city| &city.activities) {
        let amount = act.actual_cost.unwrap_or(Money::ZERO);
        match act.kind {
            ActivityKind::Sightseeing | ActivityKind::Other => out.activities += amount,
            ActivityKind::Food => out.food += amount,
            ActivityKind::Transport => out.transport += amount,
            ActivityKind::Stay => out.stay += amount,
        }
    }
    out
}
