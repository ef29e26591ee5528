//! Call record storage.

use std::collections::HashMap;

use broker_core::analytics::IngestStatus;
use broker_core::call::{OUTCOME_REJECTED, RATE_TOO_LOW};
use broker_core::{CallPressure, CallRecord};
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{CallRecordRow, StoredCallRecord};
use crate::query::format_timestamp;

/// Insert a call record, or replace the document of an existing one.
///
/// `ingested_at` is set from `now` on first insert and never changed
/// afterwards; re-ingesting bumps `revision` and `updated_at`.
pub async fn upsert_call_record(
    pool: &SqlitePool,
    record: &CallRecord,
    now: NaiveDateTime,
) -> Result<IngestStatus> {
    let document = serde_json::to_string(record)?;
    let timestamp = format_timestamp(now);

    let revision = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO call_records (call_id, document, ingested_at, updated_at, revision)
        VALUES (?, ?, ?, ?, 1)
        ON CONFLICT(call_id) DO UPDATE SET
            document = excluded.document,
            updated_at = excluded.updated_at,
            revision = call_records.revision + 1
        RETURNING revision
        "#,
    )
    .bind(record.call_id())
    .bind(&document)
    .bind(&timestamp)
    .bind(&timestamp)
    .fetch_one(pool)
    .await?;

    let status = if revision == 1 {
        IngestStatus::Created
    } else {
        IngestStatus::Updated
    };

    tracing::debug!(call_id = %record.call_id(), revision, ?status, "Call record stored");

    Ok(status)
}

/// Get a stored call record by call ID.
pub async fn get_call_record(pool: &SqlitePool, call_id: &str) -> Result<StoredCallRecord> {
    let row = sqlx::query_as::<_, CallRecordRow>(
        r#"
        SELECT call_id, document, ingested_at, updated_at, revision
        FROM call_records
        WHERE call_id = ?
        "#,
    )
    .bind(call_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "CallRecord",
        id: call_id.to_string(),
    })?;

    StoredCallRecord::try_from(row)
}

/// Count all call records.
#[cfg(test)]
pub(crate) async fn count_call_records(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM call_records")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[derive(sqlx::FromRow)]
struct PressureRow {
    load_id: String,
    total_calls: i64,
    rate_rejections: i64,
}

/// Call activity per load for the given load IDs.
///
/// Loads never discussed on a call are absent from the map.
pub async fn call_pressure(
    pool: &SqlitePool,
    load_ids: &[String],
) -> Result<HashMap<String, CallPressure>> {
    if load_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            json_extract(document, '$.load_data.load_id_discussed') AS load_id,
            COUNT(*) AS total_calls,
            COALESCE(SUM(CASE
                WHEN json_extract(document, '$.transcript_extraction.outcome.call_outcome') = "#,
    );
    qb.push_bind(OUTCOME_REJECTED);
    qb.push(" AND json_extract(document, '$.transcript_extraction.outcome.rejection_reason') = ");
    qb.push_bind(RATE_TOO_LOW);
    qb.push(
        r#" THEN 1 ELSE 0 END), 0) AS rate_rejections
        FROM call_records
        WHERE json_extract(document, '$.load_data.load_id_discussed') IN ("#,
    );
    let mut ids = qb.separated(", ");
    for load_id in load_ids {
        ids.push_bind(load_id.as_str());
    }
    ids.push_unseparated(") GROUP BY load_id");

    let rows = qb.build_query_as::<PressureRow>().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.load_id,
                CallPressure {
                    total_calls: row.total_calls,
                    rate_rejections: row.rate_rejections,
                },
            )
        })
        .collect())
}
