//! Dashboard response types and the reshaping rules applied to raw
//! aggregate rows.
//!
//! The database layer produces counts and averages; this module turns them
//! into the shapes the dashboard reads (rounded rates, fixed category
//! orderings, funnel reconstruction, geography arcs).

mod funnel;
mod geography;

pub use funnel::{build_funnel, FunnelStage, FUNNEL_STAGES};
pub use geography::{ArcType, GeoArc, GeoCity, GeographyBuilder, GeographyResponse};

use serde::{Deserialize, Serialize};

/// Result of an ingestion upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub call_id: String,
    pub status: IngestStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total_calls: i64,
    pub acceptance_rate: f64,
    pub avg_call_duration: f64,
    pub avg_negotiation_rounds: f64,
    pub avg_margin_percent: f64,
    pub booked_revenue: f64,
    pub total_margin_earned: f64,
    pub avg_rate_per_mile: f64,
    pub total_carriers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsResponse {
    pub calls_over_time: Vec<TimeSeriesPoint>,
    pub rejection_reasons: Vec<ReasonCount>,
    pub funnel: Vec<FunnelStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginBucket {
    pub range: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub strategy: String,
    pub acceptance_rate: f64,
    pub avg_rounds: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationsResponse {
    pub avg_savings: f64,
    pub avg_savings_percent: f64,
    pub avg_rounds: f64,
    pub negotiation_outcomes: Vec<NegotiationOutcome>,
    pub margin_distribution: Vec<MarginBucket>,
    pub strategy_effectiveness: Vec<StrategyRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectionCount {
    pub objection: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierLeaderboardRow {
    pub carrier_name: String,
    pub mc_number: i64,
    pub calls: i64,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneCount {
    pub lane: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCount {
    pub equipment_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarriersResponse {
    pub top_objections: Vec<ObjectionCount>,
    pub carrier_leaderboard: Vec<CarrierLeaderboardRow>,
    pub top_requested_lanes: Vec<LaneCount>,
    pub top_actual_lanes: Vec<LaneCount>,
    pub equipment_distribution: Vec<EquipmentCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCount {
    pub violation: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionPoint {
    pub date: String,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiQualityResponse {
    pub protocol_compliance_rate: f64,
    pub common_violations: Vec<ViolationCount>,
    pub avg_interruptions: f64,
    pub interruptions_over_time: Vec<InterruptionPoint>,
    pub transcription_error_rate: f64,
    pub carrier_repeat_rate: f64,
    pub tone_quality_distribution: indexmap::IndexMap<String, i64>,
}

/// Negotiation outcome categories, in display order.
pub const OUTCOME_CATEGORIES: [&str; 3] =
    ["Accepted at First Offer", "Negotiated & Agreed", "No Deal"];

/// Margin bucket boundaries in percent. Bucket `i` is `[b[i], b[i+1])`.
pub const MARGIN_BOUNDARIES: [f64; 7] = [-100.0, 0.0, 5.0, 10.0, 15.0, 20.0, 100.0];

const MARGIN_LABELS: [&str; 6] = ["<0%", "0-5%", "5-10%", "10-15%", "15-20%", "20%+"];

/// Label for a margin bucket index; indexes past the last bucket are "other".
pub fn margin_bucket_label(index: usize) -> &'static str {
    MARGIN_LABELS.get(index).copied().unwrap_or("other")
}

/// Every outcome category in display order, zero-filled when absent.
pub fn outcome_breakdown<'a>(
    counts: impl IntoIterator<Item = (&'a str, i64)>,
) -> Vec<NegotiationOutcome> {
    let counts: Vec<(&str, i64)> = counts.into_iter().collect();
    OUTCOME_CATEGORIES
        .iter()
        .map(|&name| NegotiationOutcome {
            name: name.to_string(),
            count: counts
                .iter()
                .filter(|(category, _)| *category == name)
                .map(|(_, count)| count)
                .sum(),
        })
        .collect()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / whole` as a percentage rounded to 1 dp; 0 when `whole` is 0.
pub fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}
