//! Carrier offer evaluation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use broker_core::negotiation::{ensure_negotiable, evaluate as evaluate_offer};
use broker_core::{NegotiationRequest, NegotiationResponse};
use chrono::Utc;
use database::load;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Accept or reject a carrier's offer against the load's listed rate.
pub async fn evaluate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NegotiationRequest>, JsonRejection>,
) -> Result<Json<NegotiationResponse>> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    let load = load::get_load(state.db.pool(), &request.load_id).await?;
    ensure_negotiable(&load, Utc::now().naive_utc())?;

    let response = evaluate_offer(&load, &request);

    info!(
        load_id = %request.load_id,
        carrier_offer = request.carrier_offer,
        round = request.negotiation_round,
        decision = ?response.decision,
        "Offer evaluated"
    );

    Ok(Json(response))
}
