//! Lane arcs and per-city volume for the geography view.
//!
//! Lanes that do not resolve to two known cities are skipped silently;
//! this view is best-effort.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::location::{coordinates, parse_lane, resolve_city};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcType {
    /// Lane the carrier asked for, parsed from free text.
    Requested,
    /// Origin/destination of the load actually discussed.
    Booked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoArc {
    pub origin: String,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub destination: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub count: i64,
    pub arc_type: ArcType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCity {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Traffic in both directions across all surviving lanes.
    pub volume: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeographyResponse {
    pub arcs: Vec<GeoArc>,
    pub cities: Vec<GeoCity>,
}

/// Accumulates arcs and city volumes; cities keep first-seen order.
#[derive(Debug, Default)]
pub struct GeographyBuilder {
    arcs: Vec<GeoArc>,
    volumes: IndexMap<&'static str, i64>,
}

impl GeographyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free-form requested lane. Returns false if it was skipped.
    pub fn add_requested(&mut self, lane: &str, count: i64) -> bool {
        match parse_lane(lane) {
            Some((origin, destination)) => {
                self.push(origin, destination, count, ArcType::Requested)
            }
            None => false,
        }
    }

    /// Add a booked lane from separate origin and destination fields.
    /// Returns false if it was skipped.
    pub fn add_booked(&mut self, origin: &str, destination: &str, count: i64) -> bool {
        match (resolve_city(origin), resolve_city(destination)) {
            (Some(origin), Some(destination)) => {
                self.push(origin, destination, count, ArcType::Booked)
            }
            _ => false,
        }
    }

    fn push(
        &mut self,
        origin: &'static str,
        destination: &'static str,
        count: i64,
        arc_type: ArcType,
    ) -> bool {
        let (Some(from), Some(to)) = (coordinates(origin), coordinates(destination)) else {
            return false;
        };

        self.arcs.push(GeoArc {
            origin: origin.to_string(),
            origin_lat: from.lat,
            origin_lng: from.lng,
            destination: destination.to_string(),
            dest_lat: to.lat,
            dest_lng: to.lng,
            count,
            arc_type,
        });
        *self.volumes.entry(origin).or_default() += count;
        *self.volumes.entry(destination).or_default() += count;
        true
    }

    pub fn finish(self) -> GeographyResponse {
        let cities = self
            .volumes
            .into_iter()
            .filter_map(|(name, volume)| {
                coordinates(name).map(|c| GeoCity {
                    name: name.to_string(),
                    lat: c.lat,
                    lng: c.lng,
                    volume,
                })
            })
            .collect();

        GeographyResponse {
            arcs: self.arcs,
            cities,
        }
    }
}
