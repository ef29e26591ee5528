//! Aggregate queries over stored call records.
//!
//! Every query runs over the `calls` CTE (see [`crate::query`]) restricted
//! to a [`DateRange`] on `ingested_at`. Results are raw counts and
//! averages; rounding and reshaping happen in `broker_core::analytics`.

use broker_core::analytics::{MARGIN_BOUNDARIES, OUTCOME_CATEGORIES};
use broker_core::call::OUTCOME_ACCEPTED;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{
    AiQualityRow, BucketCount, CarrierStats, DailyAverage, KeyCount, LaneRow, SavingsRow,
    StrategyStats, SummaryRow,
};
use crate::query::{calls_query, DateRange};

/// Count calls grouped by `key_expr`, ignoring rows where it is NULL.
///
/// Ordered by count descending, then key. `key_expr` must be a trusted SQL
/// expression over the `calls` columns.
async fn grouped_counts(
    pool: &SqlitePool,
    range: &DateRange,
    key_expr: &str,
    limit: Option<i64>,
) -> Result<Vec<KeyCount>> {
    let mut qb = calls_query(range);
    qb.push(format!(
        "SELECT {expr} AS key, COUNT(*) AS count FROM calls \
         WHERE {expr} IS NOT NULL GROUP BY key ORDER BY count DESC, key",
        expr = key_expr
    ));
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    Ok(qb.build_query_as::<KeyCount>().fetch_all(pool).await?)
}

/// Count the elements of a JSON string array across calls.
async fn array_element_counts(
    pool: &SqlitePool,
    range: &DateRange,
    path: &str,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    let mut qb = calls_query(range);
    qb.push("SELECT item.value AS key, COUNT(*) AS count FROM calls, json_each(calls.document, ")
        .push_bind(path.to_string())
        .push(") AS item WHERE item.value IS NOT NULL GROUP BY item.value ORDER BY count DESC, key LIMIT ")
        .push_bind(limit);

    Ok(qb.build_query_as::<KeyCount>().fetch_all(pool).await?)
}

/// Headline totals for the summary view.
pub async fn summary_totals(pool: &SqlitePool, range: &DateRange) -> Result<SummaryRow> {
    let mut qb = calls_query(range);
    qb.push("SELECT COUNT(*) AS total_calls, COALESCE(SUM(CASE WHEN outcome = ")
        .push_bind(OUTCOME_ACCEPTED)
        .push(
            r#" THEN 1 ELSE 0 END), 0) AS accepted,
            AVG(call_duration) AS avg_duration,
            AVG(rounds) AS avg_rounds,
            AVG(CASE WHEN loadboard_rate IS NOT NULL AND final_rate IS NOT NULL
                THEN (loadboard_rate - final_rate) / loadboard_rate * 100.0 END) AS avg_margin,
            TOTAL(CASE WHEN outcome = "#,
        )
        .push_bind(OUTCOME_ACCEPTED)
        .push(
            r#" THEN final_rate END) AS booked_revenue,
            TOTAL(CASE WHEN outcome = "#,
        )
        .push_bind(OUTCOME_ACCEPTED)
        .push(
            r#" AND loadboard_rate IS NOT NULL THEN loadboard_rate - final_rate END) AS margin_earned,
            AVG(CASE WHEN final_rate IS NOT NULL AND miles > 0
                THEN final_rate / miles END) AS avg_rate_per_mile,
            COUNT(DISTINCT mc_number) AS total_carriers
            FROM calls"#,
        );

    Ok(qb.build_query_as::<SummaryRow>().fetch_one(pool).await?)
}

/// Calls per ingestion day (`YYYY-MM-DD`), oldest first.
pub async fn calls_per_day(pool: &SqlitePool, range: &DateRange) -> Result<Vec<KeyCount>> {
    let mut qb = calls_query(range);
    qb.push("SELECT day AS key, COUNT(*) AS count FROM calls GROUP BY day ORDER BY day");

    Ok(qb.build_query_as::<KeyCount>().fetch_all(pool).await?)
}

pub async fn top_rejection_reasons(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    grouped_counts(pool, range, "rejection_reason", Some(limit)).await
}

/// Calls per furthest funnel stage reached (not cumulative).
pub async fn funnel_stage_counts(pool: &SqlitePool, range: &DateRange) -> Result<Vec<KeyCount>> {
    grouped_counts(pool, range, "funnel_stage", None).await
}

/// Average savings over calls with both a first offer and a final rate.
pub async fn negotiation_savings(pool: &SqlitePool, range: &DateRange) -> Result<SavingsRow> {
    let mut qb = calls_query(range);
    qb.push(
        r#"SELECT
            AVG(first_offer - final_rate) AS avg_savings,
            AVG(CASE WHEN first_offer > 0
                THEN (first_offer - final_rate) / first_offer * 100.0
                ELSE 0.0 END) AS avg_savings_percent,
            AVG(rounds) AS avg_rounds
        FROM calls
        WHERE first_offer IS NOT NULL AND final_rate IS NOT NULL"#,
    );

    Ok(qb.build_query_as::<SavingsRow>().fetch_one(pool).await?)
}

/// Calls per negotiation outcome category.
///
/// Not accepted is "No Deal"; accepted after one or more rounds is
/// "Negotiated & Agreed"; otherwise "Accepted at First Offer".
pub async fn negotiation_outcomes(pool: &SqlitePool, range: &DateRange) -> Result<Vec<KeyCount>> {
    let [first_offer, negotiated, no_deal] = OUTCOME_CATEGORIES;

    let mut qb = calls_query(range);
    qb.push("SELECT CASE WHEN outcome IS NULL OR outcome != ")
        .push_bind(OUTCOME_ACCEPTED)
        .push(" THEN ")
        .push_bind(no_deal)
        .push(" WHEN COALESCE(rounds, 0) > 0 THEN ")
        .push_bind(negotiated)
        .push(" ELSE ")
        .push_bind(first_offer)
        .push(" END AS key, COUNT(*) AS count FROM calls GROUP BY key ORDER BY key");

    Ok(qb.build_query_as::<KeyCount>().fetch_all(pool).await?)
}

/// Calls per margin bucket, ascending by bucket index.
///
/// Bucket `i` holds margins in `[MARGIN_BOUNDARIES[i], MARGIN_BOUNDARIES[i + 1])`;
/// anything else, including a zero listed rate, lands in the last index.
pub async fn margin_buckets(pool: &SqlitePool, range: &DateRange) -> Result<Vec<BucketCount>> {
    let mut qb = calls_query(range);
    qb.push("SELECT bucket, COUNT(*) AS count FROM (SELECT CASE");
    for (index, bounds) in MARGIN_BOUNDARIES.windows(2).enumerate() {
        qb.push(" WHEN margin >= ")
            .push_bind(bounds[0])
            .push(" AND margin < ")
            .push_bind(bounds[1])
            .push(" THEN ")
            .push_bind(index as i64);
    }
    qb.push(" ELSE ")
        .push_bind((MARGIN_BOUNDARIES.len() - 1) as i64)
        .push(
            r#" END AS bucket FROM (
                SELECT (loadboard_rate - final_rate) / loadboard_rate * 100.0 AS margin
                FROM calls
                WHERE loadboard_rate IS NOT NULL AND final_rate IS NOT NULL
            )
        ) GROUP BY bucket ORDER BY bucket"#,
        );

    Ok(qb.build_query_as::<BucketCount>().fetch_all(pool).await?)
}

/// Acceptance and rounds per negotiation strategy, most used first.
pub async fn strategy_stats(pool: &SqlitePool, range: &DateRange) -> Result<Vec<StrategyStats>> {
    let mut qb = calls_query(range);
    qb.push("SELECT strategy, COUNT(*) AS total, COALESCE(SUM(CASE WHEN outcome = ")
        .push_bind(OUTCOME_ACCEPTED)
        .push(
            r#" THEN 1 ELSE 0 END), 0) AS accepted, AVG(rounds) AS avg_rounds
            FROM calls
            WHERE strategy IS NOT NULL
            GROUP BY strategy
            ORDER BY total DESC, strategy"#,
        );

    Ok(qb.build_query_as::<StrategyStats>().fetch_all(pool).await?)
}

pub async fn top_objections(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    array_element_counts(
        pool,
        range,
        "$.transcript_extraction.optional.carrier_objections",
        limit,
    )
    .await
}

/// Busiest carriers by call count. The name is taken from the carrier's
/// earliest ingested call.
pub async fn carrier_leaderboard(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<CarrierStats>> {
    let mut qb = calls_query(range);
    qb.push("SELECT mc_number, carrier_name, MIN(ingested_at) AS first_seen, COUNT(*) AS calls, COALESCE(SUM(CASE WHEN outcome = ")
        .push_bind(OUTCOME_ACCEPTED)
        .push(
            r#" THEN 1 ELSE 0 END), 0) AS accepted
            FROM calls
            WHERE mc_number IS NOT NULL
            GROUP BY mc_number
            ORDER BY calls DESC, mc_number
            LIMIT "#,
        )
        .push_bind(limit);

    Ok(qb.build_query_as::<CarrierStats>().fetch_all(pool).await?)
}

/// Most common free-form lanes carriers asked for.
pub async fn top_requested_lanes(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    grouped_counts(pool, range, "requested_lane", Some(limit)).await
}

/// Most common discussed-load lanes as `"Origin → Destination"`.
pub async fn top_actual_lanes(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    grouped_counts(
        pool,
        range,
        "origin || ' \u{2192} ' || destination",
        Some(limit),
    )
    .await
}

pub async fn equipment_counts(pool: &SqlitePool, range: &DateRange) -> Result<Vec<KeyCount>> {
    grouped_counts(pool, range, "equipment_type", None).await
}

/// Most common discussed-load origin/destination pairs.
pub async fn booked_lanes(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<LaneRow>> {
    let mut qb = calls_query(range);
    qb.push(
        r#"SELECT origin, destination, COUNT(*) AS count
        FROM calls
        WHERE origin IS NOT NULL AND destination IS NOT NULL
        GROUP BY origin, destination
        ORDER BY count DESC, origin, destination
        LIMIT "#,
    )
    .push_bind(limit);

    Ok(qb.build_query_as::<LaneRow>().fetch_all(pool).await?)
}

/// Totals for the AI-quality view. Boolean flags count only when `true`.
pub async fn ai_quality_totals(pool: &SqlitePool, range: &DateRange) -> Result<AiQualityRow> {
    let mut qb = calls_query(range);
    qb.push(
        r#"SELECT
            COUNT(*) AS total,
            COALESCE(SUM(CASE WHEN followed_protocol = 1 THEN 1 ELSE 0 END), 0) AS compliant,
            AVG(interruptions) AS avg_interruptions,
            COALESCE(SUM(CASE WHEN transcription_errors = 1 THEN 1 ELSE 0 END), 0) AS transcription_errors,
            COALESCE(SUM(CASE WHEN carrier_repeat = 1 THEN 1 ELSE 0 END), 0) AS carrier_repeats
        FROM calls"#,
    );

    Ok(qb.build_query_as::<AiQualityRow>().fetch_one(pool).await?)
}

pub async fn top_protocol_violations(
    pool: &SqlitePool,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<KeyCount>> {
    array_element_counts(
        pool,
        range,
        "$.transcript_extraction.performance.protocol_violations",
        limit,
    )
    .await
}

/// Average AI interruptions per ingestion day, oldest first.
pub async fn interruptions_per_day(
    pool: &SqlitePool,
    range: &DateRange,
) -> Result<Vec<DailyAverage>> {
    let mut qb = calls_query(range);
    qb.push("SELECT day, AVG(interruptions) AS avg FROM calls GROUP BY day ORDER BY day");

    Ok(qb.build_query_as::<DailyAverage>().fetch_all(pool).await?)
}

pub async fn tone_counts(pool: &SqlitePool, range: &DateRange) -> Result<Vec<KeyCount>> {
    grouped_counts(pool, range, "tone", None).await
}
