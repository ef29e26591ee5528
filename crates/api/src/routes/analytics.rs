//! Call ingestion and dashboard views.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use broker_core::analytics::{
    build_funnel, margin_bucket_label, outcome_breakdown, percent, round_to, AiQualityResponse,
    CarrierLeaderboardRow, CarriersResponse, EquipmentCount, GeographyBuilder, GeographyResponse,
    IngestResponse, InterruptionPoint, LaneCount, MarginBucket, NegotiationsResponse,
    ObjectionCount, OperationsResponse, ReasonCount, StrategyRow, SummaryResponse,
    TimeSeriesPoint, ViolationCount,
};
use broker_core::CallRecord;
use chrono::Utc;
use database::{analytics as queries, call_record, DateRange};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::non_empty;
use crate::error::{ApiError, Result};
use crate::state::AppState;

const TOP_REJECTION_REASONS: i64 = 10;
const TOP_OBJECTIONS: i64 = 10;
const TOP_CARRIERS: i64 = 20;
const TOP_LANES: i64 = 10;
const GEOGRAPHY_LANES: i64 = 20;
const TOP_VIOLATIONS: i64 = 10;

/// Optional `from` / `to` ingestion-date bounds (`YYYY-MM-DD`).
#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateParams {
    fn range(self) -> Result<DateRange> {
        let from = non_empty(self.from);
        let to = non_empty(self.to);
        DateRange::parse(from.as_deref(), to.as_deref()).map_err(|e| {
            ApiError::BadRequest(format!("from/to must be dates in YYYY-MM-DD format: {}", e))
        })
    }
}

/// Ingest or replace a call record. Always answers 201.
pub async fn ingest_call(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CallRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>)> {
    let Json(record) = payload?;
    record.validate().map_err(ApiError::Validation)?;

    let status =
        call_record::upsert_call_record(state.db.pool(), &record, Utc::now().naive_utc()).await?;

    info!(call_id = %record.call_id(), ?status, "Call record ingested");

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            call_id: record.call_id().to_string(),
            status,
        }),
    ))
}

/// A stored call record with its bookkeeping fields.
#[derive(Debug, Serialize)]
pub struct StoredCallResponse {
    #[serde(flatten)]
    pub record: CallRecord,
    pub ingested_at: String,
    pub updated_at: String,
    pub revision: i64,
}

pub async fn get_call(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<StoredCallResponse>> {
    let stored = call_record::get_call_record(state.db.pool(), &call_id).await?;

    Ok(Json(StoredCallResponse {
        record: stored.record,
        ingested_at: stored.ingested_at,
        updated_at: stored.updated_at,
        revision: stored.revision,
    }))
}

pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<SummaryResponse>> {
    let range = params.range()?;
    let row = queries::summary_totals(state.db.pool(), &range).await?;

    if row.total_calls == 0 {
        return Ok(Json(SummaryResponse::default()));
    }

    Ok(Json(SummaryResponse {
        total_calls: row.total_calls,
        acceptance_rate: percent(row.accepted, row.total_calls),
        avg_call_duration: round_to(row.avg_duration.unwrap_or(0.0), 1),
        avg_negotiation_rounds: round_to(row.avg_rounds.unwrap_or(0.0), 1),
        avg_margin_percent: round_to(row.avg_margin.unwrap_or(0.0), 1),
        booked_revenue: round_to(row.booked_revenue, 2),
        total_margin_earned: round_to(row.margin_earned, 2),
        avg_rate_per_mile: round_to(row.avg_rate_per_mile.unwrap_or(0.0), 2),
        total_carriers: row.total_carriers,
    }))
}

pub async fn operations(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<OperationsResponse>> {
    let range = params.range()?;
    let pool = state.db.pool();

    let (per_day, reasons, stages) = tokio::try_join!(
        queries::calls_per_day(pool, &range),
        queries::top_rejection_reasons(pool, &range, TOP_REJECTION_REASONS),
        queries::funnel_stage_counts(pool, &range),
    )?;

    Ok(Json(OperationsResponse {
        calls_over_time: per_day
            .into_iter()
            .map(|row| TimeSeriesPoint {
                date: row.key,
                count: row.count,
            })
            .collect(),
        rejection_reasons: reasons
            .into_iter()
            .map(|row| ReasonCount {
                reason: row.key,
                count: row.count,
            })
            .collect(),
        funnel: build_funnel(stages.iter().map(|row| (row.key.as_str(), row.count))),
    }))
}

pub async fn negotiations(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<NegotiationsResponse>> {
    let range = params.range()?;
    let pool = state.db.pool();

    let (savings, outcomes, buckets, strategies) = tokio::try_join!(
        queries::negotiation_savings(pool, &range),
        queries::negotiation_outcomes(pool, &range),
        queries::margin_buckets(pool, &range),
        queries::strategy_stats(pool, &range),
    )?;

    Ok(Json(NegotiationsResponse {
        avg_savings: round_to(savings.avg_savings.unwrap_or(0.0), 2),
        avg_savings_percent: round_to(savings.avg_savings_percent.unwrap_or(0.0), 1),
        avg_rounds: round_to(savings.avg_rounds.unwrap_or(0.0), 1),
        negotiation_outcomes: outcome_breakdown(
            outcomes.iter().map(|row| (row.key.as_str(), row.count)),
        ),
        margin_distribution: buckets
            .into_iter()
            .map(|row| MarginBucket {
                range: margin_bucket_label(usize::try_from(row.bucket).unwrap_or(usize::MAX))
                    .to_string(),
                count: row.count,
            })
            .collect(),
        strategy_effectiveness: strategies
            .into_iter()
            .map(|row| StrategyRow {
                acceptance_rate: percent(row.accepted, row.total),
                avg_rounds: round_to(row.avg_rounds.unwrap_or(0.0), 1),
                count: row.total,
                strategy: row.strategy,
            })
            .collect(),
    }))
}

pub async fn carriers(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<CarriersResponse>> {
    let range = params.range()?;
    let pool = state.db.pool();

    let (objections, leaders, requested, actual, equipment) = tokio::try_join!(
        queries::top_objections(pool, &range, TOP_OBJECTIONS),
        queries::carrier_leaderboard(pool, &range, TOP_CARRIERS),
        queries::top_requested_lanes(pool, &range, TOP_LANES),
        queries::top_actual_lanes(pool, &range, TOP_LANES),
        queries::equipment_counts(pool, &range),
    )?;

    let lanes = |rows: Vec<database::models::KeyCount>| -> Vec<LaneCount> {
        rows.into_iter()
            .map(|row| LaneCount {
                lane: row.key,
                count: row.count,
            })
            .collect()
    };

    Ok(Json(CarriersResponse {
        top_objections: objections
            .into_iter()
            .map(|row| ObjectionCount {
                objection: row.key,
                count: row.count,
            })
            .collect(),
        carrier_leaderboard: leaders
            .into_iter()
            .map(|row| CarrierLeaderboardRow {
                acceptance_rate: percent(row.accepted, row.calls),
                carrier_name: row.carrier_name,
                mc_number: row.mc_number,
                calls: row.calls,
            })
            .collect(),
        top_requested_lanes: lanes(requested),
        top_actual_lanes: lanes(actual),
        equipment_distribution: equipment
            .into_iter()
            .map(|row| EquipmentCount {
                equipment_type: row.key,
                count: row.count,
            })
            .collect(),
    }))
}

pub async fn geography(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<GeographyResponse>> {
    let range = params.range()?;
    let pool = state.db.pool();

    let (requested, booked) = tokio::try_join!(
        queries::top_requested_lanes(pool, &range, GEOGRAPHY_LANES),
        queries::booked_lanes(pool, &range, GEOGRAPHY_LANES),
    )?;

    let mut builder = GeographyBuilder::new();
    let mut skipped = 0usize;
    for row in &requested {
        if !builder.add_requested(&row.key, row.count) {
            skipped += 1;
        }
    }
    for row in &booked {
        if !builder.add_booked(&row.origin, &row.destination, row.count) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Unresolvable lanes left out of geography view");
    }

    Ok(Json(builder.finish()))
}

pub async fn ai_quality(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<Json<AiQualityResponse>> {
    let range = params.range()?;
    let pool = state.db.pool();

    let (totals, violations, per_day, tones) = tokio::try_join!(
        queries::ai_quality_totals(pool, &range),
        queries::top_protocol_violations(pool, &range, TOP_VIOLATIONS),
        queries::interruptions_per_day(pool, &range),
        queries::tone_counts(pool, &range),
    )?;

    Ok(Json(AiQualityResponse {
        protocol_compliance_rate: percent(totals.compliant, totals.total),
        common_violations: violations
            .into_iter()
            .map(|row| ViolationCount {
                violation: row.key,
                count: row.count,
            })
            .collect(),
        avg_interruptions: round_to(totals.avg_interruptions.unwrap_or(0.0), 1),
        interruptions_over_time: per_day
            .into_iter()
            .map(|row| InterruptionPoint {
                date: row.day,
                avg: round_to(row.avg.unwrap_or(0.0), 1),
            })
            .collect(),
        transcription_error_rate: percent(totals.transcription_errors, totals.total),
        carrier_repeat_rate: percent(totals.carrier_repeats, totals.total),
        tone_quality_distribution: tones.into_iter().map(|row| (row.key, row.count)).collect(),
    }))
}
