//! Load search and lookup.

use axum::extract::{Path, Query, State};
use axum::Json;
use broker_core::pricing::apply_pricing;
use broker_core::scoring::rank_loads;
use broker_core::{Load, DATETIME_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use database::{call_record, load, LoadSearch};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{non_empty, parse_number};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// The only `validation_check` value allowed to search.
const CARRIER_VALID: &str = "VALID";

/// Raw search query. Every value arrives as a string so empty values can be
/// treated as absent before parsing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub validation_check: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub equipment_type: Option<String>,
    pub min_rate: Option<String>,
    pub max_rate: Option<String>,
    pub max_weight: Option<String>,
    pub pickup_date: Option<String>,
    pub delivery_date: Option<String>,
}

impl SearchParams {
    fn into_search(self) -> Result<LoadSearch> {
        Ok(LoadSearch {
            origin: non_empty(self.origin),
            destination: non_empty(self.destination),
            equipment_type: non_empty(self.equipment_type),
            min_rate: parse_number("min_rate", self.min_rate)?,
            max_rate: parse_number("max_rate", self.max_rate)?,
            max_weight: parse_number("max_weight", self.max_weight)?,
            pickup_date: checked_date("pickup_date", self.pickup_date)?,
            delivery_date: checked_date("delivery_date", self.delivery_date)?,
        })
    }
}

/// Accept `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`, passed through unchanged.
fn checked_date(name: &str, value: Option<String>) -> Result<Option<String>> {
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };

    let valid = NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(&value, DATETIME_FORMAT).is_ok();
    if !valid {
        return Err(ApiError::BadRequest(format!(
            "{} must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got {:?}",
            name, value
        )));
    }

    Ok(Some(value))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadSearchResponse {
    pub loads: Vec<Load>,
    pub total: usize,
}

/// Search available loads, priced and ranked for the carrier's lane.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<LoadSearchResponse>> {
    if let Some(check) = non_empty(params.validation_check.clone()) {
        if check != CARRIER_VALID {
            return Err(ApiError::CarrierNotValidated);
        }
    }

    let search = params.into_search()?;
    let now = Utc::now().naive_utc();

    let mut loads = load::search_loads(state.db.pool(), &search, now).await?;
    price_loads(&state, &mut loads, now).await?;

    if search.has_lane() {
        rank_loads(
            &mut loads,
            search.origin.as_deref(),
            search.destination.as_deref(),
        );
    }

    info!(
        origin = ?search.origin,
        destination = ?search.destination,
        equipment_type = ?search.equipment_type,
        results = loads.len(),
        "Load search"
    );

    let total = loads.len();
    Ok(Json(LoadSearchResponse { loads, total }))
}

/// Get a single load with its current carrier rates.
pub async fn get_load(
    State(state): State<AppState>,
    Path(load_id): Path<String>,
) -> Result<Json<Load>> {
    let mut load = load::get_load(state.db.pool(), &load_id).await?;
    price_loads(&state, std::slice::from_mut(&mut load), Utc::now().naive_utc()).await?;

    Ok(Json(load))
}

/// Fill in target/cap rates using call history for exactly these loads.
async fn price_loads(state: &AppState, loads: &mut [Load], now: NaiveDateTime) -> Result<()> {
    let ids: Vec<String> = loads.iter().map(|l| l.load_id.clone()).collect();
    let pressure = call_record::call_pressure(state.db.pool(), &ids).await?;

    for load in loads.iter_mut() {
        let history = pressure.get(&load.load_id).copied().unwrap_or_default();
        apply_pricing(load, history, now);
    }

    Ok(())
}
