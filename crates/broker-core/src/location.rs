//! City resolution and lane parsing.
//!
//! A fixed table of major US freight hubs backs two operations:
//!
//! - [`resolve_city`] maps free-form input ("chicago il", "Chicago") to the
//!   canonical "City, ST" form.
//! - [`parse_lane`] splits a lane string such as "Chicago, IL -> Dallas, TX"
//!   into a resolved `(origin, destination)` pair.
//!
//! Matching is exact after trimming and lower-casing. There is no edit
//! distance or prefix matching.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Supported cities and their coordinates.
const CITIES: &[(&str, f64, f64)] = &[
    ("Atlanta, GA", 33.749, -84.388),
    ("Austin, TX", 30.267, -97.743),
    ("Baltimore, MD", 39.290, -76.612),
    ("Birmingham, AL", 33.521, -86.802),
    ("Boise, ID", 43.615, -116.202),
    ("Boston, MA", 42.360, -71.059),
    ("Buffalo, NY", 42.887, -78.879),
    ("Charlotte, NC", 35.227, -80.843),
    ("Chicago, IL", 41.878, -87.630),
    ("Cincinnati, OH", 39.103, -84.512),
    ("Cleveland, OH", 41.500, -81.694),
    ("Columbus, OH", 39.961, -82.999),
    ("Dallas, TX", 32.777, -96.797),
    ("Denver, CO", 39.739, -104.990),
    ("Des Moines, IA", 41.586, -93.625),
    ("Detroit, MI", 42.331, -83.046),
    ("El Paso, TX", 31.762, -106.485),
    ("Fort Worth, TX", 32.755, -97.331),
    ("Fresno, CA", 36.737, -119.787),
    ("Houston, TX", 29.760, -95.370),
    ("Indianapolis, IN", 39.768, -86.158),
    ("Jacksonville, FL", 30.332, -81.656),
    ("Kansas City, MO", 39.100, -94.578),
    ("Laredo, TX", 27.506, -99.507),
    ("Las Vegas, NV", 36.169, -115.140),
    ("Little Rock, AR", 34.746, -92.290),
    ("Los Angeles, CA", 34.052, -118.244),
    ("Louisville, KY", 38.253, -85.759),
    ("Memphis, TN", 35.150, -90.049),
    ("Miami, FL", 25.762, -80.192),
    ("Milwaukee, WI", 43.039, -87.907),
    ("Minneapolis, MN", 44.978, -93.265),
    ("Nashville, TN", 36.163, -86.781),
    ("New Orleans, LA", 29.951, -90.072),
    ("New York, NY", 40.713, -74.006),
    ("Newark, NJ", 40.736, -74.172),
    ("Norfolk, VA", 36.851, -76.286),
    ("Oklahoma City, OK", 35.468, -97.522),
    ("Omaha, NE", 41.257, -95.934),
    ("Orlando, FL", 28.538, -81.379),
    ("Philadelphia, PA", 39.953, -75.164),
    ("Phoenix, AZ", 33.449, -112.074),
    ("Pittsburgh, PA", 40.441, -79.996),
    ("Portland, OR", 45.505, -122.675),
    ("Raleigh, NC", 35.780, -78.639),
    ("Richmond, VA", 37.541, -77.436),
    ("Sacramento, CA", 38.582, -121.494),
    ("Salt Lake City, UT", 40.761, -111.891),
    ("San Antonio, TX", 29.425, -98.494),
    ("San Diego, CA", 32.716, -117.161),
    ("San Francisco, CA", 37.775, -122.419),
    ("Savannah, GA", 32.081, -81.091),
    ("Seattle, WA", 47.606, -122.332),
    ("St. Louis, MO", 38.627, -90.199),
    ("Tampa, FL", 27.951, -82.458),
    ("Tucson, AZ", 32.222, -110.975),
    ("Tulsa, OK", 36.154, -95.993),
];

/// Lower-cased surface form -> canonical name.
///
/// Every city is reachable as "city, st", "city st" and "city".
static CITY_LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut lookup = HashMap::with_capacity(CITIES.len() * 3);
    for &(canonical, _, _) in CITIES {
        let Some((city, state)) = canonical.split_once(", ") else {
            continue;
        };
        let city = city.to_lowercase();
        let state = state.to_lowercase();
        lookup.insert(format!("{}, {}", city, state), canonical);
        lookup.insert(format!("{} {}", city, state), canonical);
        lookup.insert(city, canonical);
    }
    lookup
});

/// Literal separators, tried in order. The first one present wins.
const LANE_SEPARATORS: &[&str] = &[" \u{2192} ", " -> ", " - "];

/// Fallback separator: " to " in any case, surrounded by whitespace.
static TO_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+to\s+").expect("static pattern is valid"));

/// Resolve free-form city text to its canonical "City, ST" name.
///
/// Returns `None` for empty or unknown input.
pub fn resolve_city(text: &str) -> Option<&'static str> {
    let cleaned = text.trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }
    CITY_LOOKUP.get(&cleaned).copied()
}

/// Coordinates for a canonical city name as returned by [`resolve_city`].
pub fn coordinates(canonical: &str) -> Option<Coordinates> {
    CITIES
        .iter()
        .find(|(name, _, _)| *name == canonical)
        .map(|&(_, lat, lng)| Coordinates { lat, lng })
}

/// Split a lane string into canonical `(origin, destination)` names.
///
/// Separators are tried in priority order: unicode arrow, ASCII arrow,
/// spaced hyphen, then a case-insensitive " to ". Only the first occurrence
/// of the winning separator splits the string. Both halves must resolve.
pub fn parse_lane(raw: &str) -> Option<(&'static str, &'static str)> {
    if raw.is_empty() {
        return None;
    }

    let (origin_raw, dest_raw) = LANE_SEPARATORS
        .iter()
        .find_map(|sep| raw.split_once(sep))
        .or_else(|| {
            TO_SEPARATOR
                .find(raw)
                .map(|m| (&raw[..m.start()], &raw[m.end()..]))
        })?;

    let origin = resolve_city(origin_raw)?;
    let destination = resolve_city(dest_raw)?;
    Some((origin, destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_form() {
        assert_eq!(resolve_city("Chicago, IL"), Some("Chicago, IL"));
    }

    #[test]
    fn test_resolve_surface_forms() {
        assert_eq!(resolve_city("chicago, il"), Some("Chicago, IL"));
        assert_eq!(resolve_city("chicago il"), Some("Chicago, IL"));
        assert_eq!(resolve_city("Dallas"), Some("Dallas, TX"));
        assert_eq!(resolve_city("  Houston  "), Some("Houston, TX"));
        assert_eq!(resolve_city("SALT LAKE CITY"), Some("Salt Lake City, UT"));
        assert_eq!(resolve_city("st. louis mo"), Some("St. Louis, MO"));
    }

    #[test]
    fn test_resolve_unknown_or_empty() {
        assert_eq!(resolve_city("Timbuktu"), None);
        assert_eq!(resolve_city(""), None);
        assert_eq!(resolve_city("   "), None);
        // No partial matching.
        assert_eq!(resolve_city("Chica"), None);
    }

    #[test]
    fn test_resolve_is_idempotent_on_every_city() {
        for &(name, _, _) in CITIES {
            let first = resolve_city(name).unwrap();
            assert_eq!(resolve_city(first), Some(first));
            assert_eq!(first, name);
        }
    }

    #[test]
    fn test_every_city_has_coordinates() {
        assert!(CITIES.len() >= 50);
        for &(name, lat, lng) in CITIES {
            assert_eq!(coordinates(name), Some(Coordinates { lat, lng }));
        }
        assert_eq!(coordinates("Timbuktu"), None);
    }

    #[test]
    fn test_parse_lane_all_separators() {
        let expected = Some(("Chicago, IL", "Dallas, TX"));
        assert_eq!(parse_lane("Chicago, IL \u{2192} Dallas, TX"), expected);
        assert_eq!(parse_lane("Chicago, IL -> Dallas, TX"), expected);
        assert_eq!(parse_lane("Chicago, IL - Dallas, TX"), expected);
        assert_eq!(parse_lane("Chicago, IL to Dallas, TX"), expected);
        assert_eq!(parse_lane("Chicago to Dallas"), expected);
        assert_eq!(parse_lane("chicago TO dallas"), expected);
        assert_eq!(parse_lane("Chicago IL -> Dallas TX"), expected);
    }

    #[test]
    fn test_parse_lane_separator_priority() {
        // The arrow wins over the hyphen even though the hyphen comes first.
        assert_eq!(
            parse_lane("Chicago - IL -> Dallas, TX"),
            None,
            "left side 'Chicago - IL' does not resolve"
        );
        // "to" inside a city name is not a separator without surrounding spaces.
        assert_eq!(
            parse_lane("Toledo -> Dallas"),
            None,
            "Toledo is not in the table"
        );
        assert_eq!(parse_lane("Boston -> Atlanta"), Some(("Boston, MA", "Atlanta, GA")));
    }

    #[test]
    fn test_parse_lane_unresolvable_sides() {
        assert_eq!(parse_lane("Timbuktu -> Dallas, TX"), None);
        assert_eq!(parse_lane("Chicago, IL -> Timbuktu"), None);
    }

    #[test]
    fn test_parse_lane_without_separator() {
        assert_eq!(parse_lane(""), None);
        assert_eq!(parse_lane("Chicago IL Dallas TX"), None);
    }
}
