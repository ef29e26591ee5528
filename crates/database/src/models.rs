//! Database row types and their mapping to domain types.

use broker_core::{CallRecord, Load, LoadStatus, DATETIME_FORMAT};
use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::error::DatabaseError;

/// A `loads` row as stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LoadRow {
    pub load_id: String,
    pub origin: String,
    pub destination: String,
    pub pickup_datetime: String,
    pub delivery_datetime: String,
    pub equipment_type: String,
    pub loadboard_rate: f64,
    pub status: String,
    pub notes: String,
    pub weight: f64,
    pub commodity_type: String,
    pub num_of_pieces: i64,
    pub miles: f64,
    pub dimensions: String,
}

impl TryFrom<LoadRow> for Load {
    type Error = DatabaseError;

    fn try_from(row: LoadRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| DatabaseError::InvalidRow {
            entity: "Load",
            id: row.load_id.clone(),
            reason,
        };

        let pickup_datetime = NaiveDateTime::parse_from_str(&row.pickup_datetime, DATETIME_FORMAT)
            .map_err(|e| invalid(format!("pickup_datetime: {}", e)))?;
        let delivery_datetime =
            NaiveDateTime::parse_from_str(&row.delivery_datetime, DATETIME_FORMAT)
                .map_err(|e| invalid(format!("delivery_datetime: {}", e)))?;
        let status = row.status.parse::<LoadStatus>().map_err(invalid)?;

        Ok(Load {
            load_id: row.load_id,
            origin: row.origin,
            destination: row.destination,
            pickup_datetime,
            delivery_datetime,
            equipment_type: row.equipment_type,
            loadboard_rate: row.loadboard_rate,
            status,
            notes: row.notes,
            weight: row.weight,
            commodity_type: row.commodity_type,
            num_of_pieces: row.num_of_pieces,
            miles: row.miles,
            dimensions: row.dimensions,
            target_carrier_rate: None,
            cap_carrier_rate: None,
        })
    }
}

/// A stored call record with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCallRecord {
    pub record: CallRecord,
    pub ingested_at: String,
    pub updated_at: String,
    pub revision: i64,
}

/// A `call_records` row as stored.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct CallRecordRow {
    pub call_id: String,
    pub document: String,
    pub ingested_at: String,
    pub updated_at: String,
    pub revision: i64,
}

impl TryFrom<CallRecordRow> for StoredCallRecord {
    type Error = DatabaseError;

    fn try_from(row: CallRecordRow) -> Result<Self, Self::Error> {
        let record = serde_json::from_str(&row.document).map_err(|e| DatabaseError::InvalidRow {
            entity: "CallRecord",
            id: row.call_id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            record,
            ingested_at: row.ingested_at,
            updated_at: row.updated_at,
            revision: row.revision,
        })
    }
}

/// A grouping key with its count.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

/// Summary totals over call records.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SummaryRow {
    pub total_calls: i64,
    pub accepted: i64,
    pub avg_duration: Option<f64>,
    pub avg_rounds: Option<f64>,
    pub avg_margin: Option<f64>,
    pub booked_revenue: f64,
    pub margin_earned: f64,
    pub avg_rate_per_mile: Option<f64>,
    pub total_carriers: i64,
}

/// Savings from carrier first offer to final agreed rate.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SavingsRow {
    pub avg_savings: Option<f64>,
    pub avg_savings_percent: Option<f64>,
    pub avg_rounds: Option<f64>,
}

/// Calls per margin bucket; `bucket` indexes the margin boundaries.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BucketCount {
    pub bucket: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StrategyStats {
    pub strategy: String,
    pub total: i64,
    pub accepted: i64,
    pub avg_rounds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CarrierStats {
    pub mc_number: i64,
    pub carrier_name: String,
    pub calls: i64,
    pub accepted: i64,
}

/// Calls grouped by the discussed load's origin and destination.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LaneRow {
    pub origin: String,
    pub destination: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AiQualityRow {
    pub total: i64,
    pub compliant: i64,
    pub avg_interruptions: Option<f64>,
    pub transcription_errors: i64,
    pub carrier_repeats: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DailyAverage {
    pub day: String,
    pub avg: Option<f64>,
}
