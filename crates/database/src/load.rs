//! Load queries.

use broker_core::scoring::is_state_abbreviation;
use broker_core::{Load, LoadStatus, DATETIME_FORMAT};
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::LoadRow;
use crate::query::like_contains;

/// Maximum number of loads a search returns.
pub const SEARCH_LIMIT: i64 = 100;

/// Time appended to date-only delivery bounds so the whole day is included.
const END_OF_DAY: &str = "T23:59:59";

const LOAD_COLUMNS: &str = "load_id, origin, destination, pickup_datetime, delivery_datetime, \
     equipment_type, loadboard_rate, status, notes, weight, commodity_type, num_of_pieces, \
     miles, dimensions";

/// Optional search filters. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSearch {
    /// City substring, or a two-letter state code matched against ", ST".
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Case-insensitive substring.
    pub equipment_type: Option<String>,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub max_weight: Option<f64>,
    /// Earliest pickup (ISO date or datetime); replaces the "now" floor.
    pub pickup_date: Option<String>,
    /// Latest delivery (ISO date or datetime); date-only means end of day.
    pub delivery_date: Option<String>,
}

impl LoadSearch {
    /// Whether an origin or destination was given, i.e. results should be ranked.
    pub fn has_lane(&self) -> bool {
        self.origin.is_some() || self.destination.is_some()
    }
}

/// Find available loads matching `search`, in storage order, at most
/// [`SEARCH_LIMIT`] rows.
///
/// Only loads with status `available` and a pickup at or after `now` (or
/// after `search.pickup_date` when given) are returned.
pub async fn search_loads(
    pool: &SqlitePool,
    search: &LoadSearch,
    now: NaiveDateTime,
) -> Result<Vec<Load>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM loads WHERE status = ",
        LOAD_COLUMNS
    ));
    qb.push_bind(LoadStatus::Available.as_str());

    let pickup_floor = search
        .pickup_date
        .clone()
        .unwrap_or_else(|| now.format(DATETIME_FORMAT).to_string());
    qb.push(" AND pickup_datetime >= ").push_bind(pickup_floor);

    if let Some(origin) = &search.origin {
        push_location_filter(&mut qb, "origin", origin);
    }
    if let Some(destination) = &search.destination {
        push_location_filter(&mut qb, "destination", destination);
    }
    if let Some(equipment_type) = &search.equipment_type {
        qb.push(" AND equipment_type LIKE ")
            .push_bind(like_contains(equipment_type))
            .push(" ESCAPE '\\'");
    }
    if let Some(min_rate) = search.min_rate {
        qb.push(" AND loadboard_rate >= ").push_bind(min_rate);
    }
    if let Some(max_rate) = search.max_rate {
        qb.push(" AND loadboard_rate <= ").push_bind(max_rate);
    }
    if let Some(max_weight) = search.max_weight {
        qb.push(" AND weight <= ").push_bind(max_weight);
    }
    if let Some(delivery_date) = &search.delivery_date {
        qb.push(" AND delivery_datetime <= ")
            .push_bind(delivery_upper_bound(delivery_date));
    }

    qb.push(" ORDER BY rowid LIMIT ").push_bind(SEARCH_LIMIT);

    let rows = qb.build_query_as::<LoadRow>().fetch_all(pool).await?;

    tracing::debug!(rows = rows.len(), "Load search executed");

    rows.into_iter().map(Load::try_from).collect()
}

/// Get a load by ID.
pub async fn get_load(pool: &SqlitePool, load_id: &str) -> Result<Load> {
    let row = sqlx::query_as::<_, LoadRow>(&format!(
        "SELECT {} FROM loads WHERE load_id = ?",
        LOAD_COLUMNS
    ))
    .bind(load_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Load",
        id: load_id.to_string(),
    })?;

    Load::try_from(row)
}

/// Insert or replace a load. Derived rate fields are not stored.
pub async fn upsert_load(pool: &SqlitePool, load: &Load) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO loads (
            load_id, origin, destination, pickup_datetime, delivery_datetime,
            equipment_type, loadboard_rate, status, notes, weight,
            commodity_type, num_of_pieces, miles, dimensions
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(load_id) DO UPDATE SET
            origin = excluded.origin,
            destination = excluded.destination,
            pickup_datetime = excluded.pickup_datetime,
            delivery_datetime = excluded.delivery_datetime,
            equipment_type = excluded.equipment_type,
            loadboard_rate = excluded.loadboard_rate,
            status = excluded.status,
            notes = excluded.notes,
            weight = excluded.weight,
            commodity_type = excluded.commodity_type,
            num_of_pieces = excluded.num_of_pieces,
            miles = excluded.miles,
            dimensions = excluded.dimensions
        "#,
    )
    .bind(&load.load_id)
    .bind(&load.origin)
    .bind(&load.destination)
    .bind(load.pickup_datetime.format(DATETIME_FORMAT).to_string())
    .bind(load.delivery_datetime.format(DATETIME_FORMAT).to_string())
    .bind(&load.equipment_type)
    .bind(load.loadboard_rate)
    .bind(load.status.as_str())
    .bind(&load.notes)
    .bind(load.weight)
    .bind(&load.commodity_type)
    .bind(load.num_of_pieces)
    .bind(load.miles)
    .bind(&load.dimensions)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count all loads.
#[cfg(test)]
pub(crate) async fn count_loads(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM loads")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Inclusive delivery bound; date-only values extend to the end of the day.
fn delivery_upper_bound(value: &str) -> String {
    if value.contains('T') {
        value.to_string()
    } else {
        format!("{}{}", value, END_OF_DAY)
    }
}

/// City substring match, or for a bare state code, a match on the part
/// after the last comma so "CA" cannot hit "Chicago, IL".
///
/// `RTRIM(col, REPLACE(col, ',', ''))` strips the trailing run of non-comma
/// characters, so its length is the position of the last comma.
fn push_location_filter(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: &str) {
    let value = value.trim();
    if is_state_abbreviation(value) {
        qb.push(format!(
            " AND INSTR({col}, ',') > 0 \
             AND LOWER(TRIM(SUBSTR({col}, LENGTH(RTRIM({col}, REPLACE({col}, ',', ''))) + 1))) = ",
            col = column
        ))
        .push_bind(value.to_lowercase());
    } else {
        qb.push(format!(" AND {} LIKE ", column))
            .push_bind(like_contains(value))
            .push(" ESCAPE '\\'");
    }
}
