//! Offer evaluation against the listed rate.
//!
//! One hard rule: a carrier offer may not exceed the load's listed rate.
//! Counter-offers and round strategy belong to the voice agent; the round
//! number is accepted and echoed in logs only.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::NegotiationError;
use crate::models::{Load, DATETIME_FORMAT};

/// Request body for evaluating a carrier's offer.
///
/// The listed rate is looked up server-side, never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationRequest {
    pub load_id: String,
    /// Offer in USD; must be positive.
    pub carrier_offer: f64,
    /// 1-based round counter tracked by the voice agent.
    pub negotiation_round: i64,
}

impl NegotiationRequest {
    /// Check field constraints. Returns a message describing the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.load_id.trim().is_empty() {
            return Err("load_id must not be empty".to_string());
        }
        if !self.carrier_offer.is_finite() || self.carrier_offer <= 0.0 {
            return Err("carrier_offer must be greater than 0".to_string());
        }
        if self.negotiation_round < 1 {
            return Err("negotiation_round must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

/// Evaluation result returned to the voice agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationResponse {
    pub decision: Decision,
    pub loadboard_rate: f64,
    /// How far below the listed rate the offer is; negative when above.
    pub margin_percent: f64,
    pub reasoning: String,
}

/// Ensure a load can be negotiated on at `now`.
///
/// The load must be available and its pickup strictly in the future.
pub fn ensure_negotiable(load: &Load, now: NaiveDateTime) -> Result<(), NegotiationError> {
    if !load.is_available() {
        return Err(NegotiationError::NotAvailable {
            load_id: load.load_id.clone(),
            status: load.status.to_string(),
        });
    }

    if load.pickup_datetime <= now {
        return Err(NegotiationError::Expired {
            load_id: load.load_id.clone(),
            pickup: load.pickup_datetime.format(DATETIME_FORMAT).to_string(),
        });
    }

    Ok(())
}

/// Margin of an offer below the listed rate, as a percentage rounded to 1 dp.
pub fn margin_percent(loadboard_rate: f64, carrier_offer: f64) -> f64 {
    let margin = (loadboard_rate - carrier_offer) / loadboard_rate;
    (margin * 1000.0).round() / 10.0
}

/// Accept an offer at or below the listed rate, reject anything above it.
pub fn evaluate(load: &Load, request: &NegotiationRequest) -> NegotiationResponse {
    let loadboard_rate = load.loadboard_rate;
    let offer = request.carrier_offer;
    let margin_percent = margin_percent(loadboard_rate, offer);

    if offer > loadboard_rate {
        return NegotiationResponse {
            decision: Decision::Reject,
            loadboard_rate,
            margin_percent,
            reasoning: format!(
                "Carrier offer {} exceeds our rate {}. Cannot book above loadboard rate.",
                format_usd(offer),
                format_usd(loadboard_rate)
            ),
        };
    }

    NegotiationResponse {
        decision: Decision::Accept,
        loadboard_rate,
        margin_percent,
        reasoning: format!(
            "Carrier offer {} is within our rate {} ({:.1}% margin). Safe to book.",
            format_usd(offer),
            format_usd(loadboard_rate),
            margin_percent
        ),
    }
}

/// Format a dollar amount as "$1,234.50".
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
