//! Load entity.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage and comparison format for load timestamps.
///
/// Naive (no offset) and zero-padded so lexicographic order is chronological.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Lifecycle state of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Available,
    Booked,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Available => "available",
            LoadStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(LoadStatus::Available),
            "booked" => Ok(LoadStatus::Booked),
            other => Err(format!("unknown load status: {}", other)),
        }
    }
}

/// A shipment a carrier can search for and book.
///
/// This is both the stored shape and the API response shape. The two
/// `*_carrier_rate` fields are derived on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// Identifier, e.g. "LD-001".
    pub load_id: String,
    /// Pickup location as "City, ST".
    pub origin: String,
    /// Delivery location as "City, ST".
    pub destination: String,
    pub pickup_datetime: NaiveDateTime,
    pub delivery_datetime: NaiveDateTime,
    /// "Dry Van", "Reefer", "Flatbed", ...
    pub equipment_type: String,
    /// Listed price in USD; the ceiling for any negotiated rate.
    pub loadboard_rate: f64,
    #[serde(default)]
    pub status: LoadStatus,
    #[serde(default)]
    pub notes: String,
    /// Pounds.
    pub weight: f64,
    pub commodity_type: String,
    pub num_of_pieces: i64,
    pub miles: f64,
    /// "LxWxH" in inches.
    pub dimensions: String,
    #[serde(default)]
    pub target_carrier_rate: Option<f64>,
    #[serde(default)]
    pub cap_carrier_rate: Option<f64>,
}

impl Load {
    /// Whether the load is open for booking.
    pub fn is_available(&self) -> bool {
        self.status == LoadStatus::Available
    }

    /// Revenue per mile, or `None` when the mileage is not positive.
    pub fn rate_per_mile(&self) -> Option<f64> {
        (self.miles > 0.0).then(|| self.loadboard_rate / self.miles)
    }
}
