//! Relevance scoring for search results.
//!
//! | Component | Max | Rule |
//! |-----------|-----|------|
//! | Origin | 0.4 | state code: exact state match; else exact city 0.4, substring 0.2 |
//! | Destination | 0.4 | same rule, independently |
//! | Rate per mile | 0.2 | `min(rate / miles / 4.0, 1.0) * 0.2` |

use std::cmp::Ordering;

use crate::models::Load;

const LOCATION_WEIGHT: f64 = 0.4;
const PARTIAL_LOCATION_WEIGHT: f64 = 0.2;
const RATE_WEIGHT: f64 = 0.2;

/// Revenue per mile at which the rate component saturates.
const RATE_PER_MILE_CEILING: f64 = 4.0;

/// Whether a query looks like a two-letter US state code.
pub fn is_state_abbreviation(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.chars().count() == 2 && trimmed.chars().all(char::is_alphabetic)
}

/// Score a single location query against a load's "City, ST" field.
pub fn location_score(query: &str, location: &str) -> f64 {
    let query_lower = query.trim().to_lowercase();
    let location_lower = location.to_lowercase();

    if is_state_abbreviation(query) {
        let mut parts = location_lower.rsplit(',');
        let state = parts.next().map(str::trim);
        let has_city = parts.next().is_some();
        return if has_city && state == Some(query_lower.as_str()) {
            LOCATION_WEIGHT
        } else {
            0.0
        };
    }

    let city = location_lower.split(',').next().unwrap_or_default().trim();
    if query_lower == city {
        LOCATION_WEIGHT
    } else if location_lower.contains(&query_lower) {
        PARTIAL_LOCATION_WEIGHT
    } else {
        0.0
    }
}

/// Rate-per-mile component; zero when miles is not positive.
pub fn rate_score(load: &Load) -> f64 {
    load.rate_per_mile()
        .map(|rpm| (rpm / RATE_PER_MILE_CEILING).min(1.0) * RATE_WEIGHT)
        .unwrap_or(0.0)
}

/// Relevance of a load to the carrier's stated lane, in `[0, 1]`.
///
/// Empty queries are treated the same as absent ones.
pub fn score_load(load: &Load, origin: Option<&str>, destination: Option<&str>) -> f64 {
    let origin_score = origin
        .filter(|q| !q.is_empty())
        .map(|q| location_score(q, &load.origin))
        .unwrap_or(0.0);
    let destination_score = destination
        .filter(|q| !q.is_empty())
        .map(|q| location_score(q, &load.destination))
        .unwrap_or(0.0);

    origin_score + destination_score + rate_score(load)
}

/// Sort loads by descending relevance when a lane was given.
///
/// Without an origin or destination the input order is kept. The sort is
/// stable, so equally scored loads keep their relative order.
pub fn rank_loads(loads: &mut [Load], origin: Option<&str>, destination: Option<&str>) {
    let has_lane = origin.is_some_and(|q| !q.is_empty())
        || destination.is_some_and(|q| !q.is_empty());
    if !has_lane {
        return;
    }

    loads.sort_by(|a, b| {
        let a = score_load(a, origin, destination);
        let b = score_load(b, origin, destination);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
}
