//! Conversion funnel reconstruction.
//!
//! Each call record carries only the furthest stage it reached, so raw
//! counts mean "stopped at exactly this stage". A call that stopped at
//! stage N also passed every stage before it, so the cumulative count for a
//! stage is its raw count plus the raw counts of all later stages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::round_to;

/// Funnel stages in progression order.
pub const FUNNEL_STAGES: [&str; 7] = [
    "call_started",
    "fmcsa_verified",
    "load_matched",
    "offer_pitched",
    "negotiation_entered",
    "deal_agreed",
    "transferred_to_sales",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: String,
    /// Calls that reached this stage or any later one.
    pub count: i64,
    /// Share of first-stage calls lost by this stage, in percent (1 dp).
    pub drop_off_percent: f64,
}

/// Build the cumulative funnel from per-stage "furthest reached" counts.
///
/// Unknown stage names are ignored.
pub fn build_funnel<'a>(raw: impl IntoIterator<Item = (&'a str, i64)>) -> Vec<FunnelStage> {
    let mut raw_counts: HashMap<&str, i64> = HashMap::new();
    for (stage, count) in raw {
        *raw_counts.entry(stage).or_default() += count;
    }

    let mut cumulative = [0i64; FUNNEL_STAGES.len()];
    let mut running = 0;
    for (i, stage) in FUNNEL_STAGES.iter().enumerate().rev() {
        running += raw_counts.get(stage).copied().unwrap_or(0);
        cumulative[i] = running;
    }

    let first = cumulative[0];
    FUNNEL_STAGES
        .iter()
        .zip(cumulative)
        .map(|(stage, count)| FunnelStage {
            stage: stage.to_string(),
            count,
            drop_off_percent: if first > 0 {
                round_to((1.0 - count as f64 / first as f64) * 100.0, 1)
            } else {
                0.0
            },
        })
        .collect()
}
