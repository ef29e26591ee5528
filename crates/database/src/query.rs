//! Shared query-building helpers.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite};

/// Format of `call_records.ingested_at` / `updated_at` (naive UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Format of the `from` / `to` query parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a timestamp for storage in `call_records`.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Inclusive ingestion-date window for analytics queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Parse optional `YYYY-MM-DD` bounds. Empty strings count as absent.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, chrono::ParseError> {
        let parse = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| NaiveDate::parse_from_str(v, DATE_FORMAT))
                .transpose()
        };

        Ok(Self {
            from: parse(from)?,
            to: parse(to)?,
        })
    }

    /// First instant of `from`.
    fn lower_bound(&self) -> Option<String> {
        self.from
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(format_timestamp)
    }

    /// Last representable instant of `to`.
    fn upper_bound(&self) -> Option<String> {
        self.to
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
            .map(format_timestamp)
    }

    /// Append `AND ingested_at ...` conditions for the set bounds.
    pub(crate) fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(lower) = self.lower_bound() {
            qb.push(" AND ingested_at >= ").push_bind(lower);
        }
        if let Some(upper) = self.upper_bound() {
            qb.push(" AND ingested_at <= ").push_bind(upper);
        }
    }
}

/// `LIKE` pattern matching `value` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped; use with
/// `ESCAPE '\'`.
///
/// SQLite's `LIKE` folds ASCII letters only, so "QUERÉTARO" does not match
/// "Querétaro". Non-ASCII letters must match case exactly.
pub fn like_contains(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Flattened view over `call_records` used by every analytics query.
///
/// Numeric fields are cast to REAL so averages and sums decode as floats.
const CALLS_CTE: &str = r#"
    WITH calls AS (
        SELECT
            call_id,
            document,
            ingested_at,
            substr(ingested_at, 1, 10) AS day,
            CAST(json_extract(document, '$.system.call_duration') AS REAL) AS call_duration,
            json_extract(document, '$.fmcsa_data.carrier_mc_number') AS mc_number,
            json_extract(document, '$.fmcsa_data.carrier_name') AS carrier_name,
            json_extract(document, '$.load_data.load_id_discussed') AS load_id,
            CAST(json_extract(document, '$.load_data.loadboard_rate') AS REAL) AS loadboard_rate,
            CAST(json_extract(document, '$.load_data.miles') AS REAL) AS miles,
            json_extract(document, '$.load_data.origin') AS origin,
            json_extract(document, '$.load_data.destination') AS destination,
            json_extract(document, '$.load_data.carrier_requested_lane') AS requested_lane,
            json_extract(document, '$.load_data.equipment_type') AS equipment_type,
            CAST(json_extract(document, '$.transcript_extraction.negotiation.carrier_first_offer') AS REAL) AS first_offer,
            CAST(json_extract(document, '$.transcript_extraction.negotiation.final_agreed_rate') AS REAL) AS final_rate,
            CAST(json_extract(document, '$.transcript_extraction.negotiation.negotiation_rounds') AS REAL) AS rounds,
            json_extract(document, '$.transcript_extraction.outcome.call_outcome') AS outcome,
            json_extract(document, '$.transcript_extraction.outcome.rejection_reason') AS rejection_reason,
            json_extract(document, '$.transcript_extraction.outcome.funnel_stage_reached') AS funnel_stage,
            json_extract(document, '$.transcript_extraction.optional.negotiation_strategy_used') AS strategy,
            json_extract(document, '$.transcript_extraction.performance.agent_followed_protocol') AS followed_protocol,
            json_extract(document, '$.transcript_extraction.performance.agent_tone_quality') AS tone,
            CAST(json_extract(document, '$.transcript_extraction.conversation.ai_interruptions_count') AS REAL) AS interruptions,
            json_extract(document, '$.transcript_extraction.conversation.transcription_errors_detected') AS transcription_errors,
            json_extract(document, '$.transcript_extraction.conversation.carrier_had_to_repeat_info') AS carrier_repeat
        FROM call_records
        WHERE 1 = 1"#;

/// Start a query over the `calls` CTE restricted to `range`.
///
/// The returned builder is positioned right after the CTE; callers push the
/// outer `SELECT ... FROM calls ...`.
pub(crate) fn calls_query(range: &DateRange) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(CALLS_CTE);
    range.push_conditions(&mut qb);
    qb.push("\n    )\n");
    qb
}
