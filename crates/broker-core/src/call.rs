//! Call transcript records posted by the voice agent after each call.

use serde::{Deserialize, Serialize};

/// Outcome value for a booked call.
pub const OUTCOME_ACCEPTED: &str = "accepted";

/// Outcome value for a call the carrier turned down.
pub const OUTCOME_REJECTED: &str = "rejected";

/// Rejection reason that feeds pricing pressure.
pub const RATE_TOO_LOW: &str = "Rate too low";

/// One voice-agent call, keyed by `system.call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub system: SystemData,
    pub fmcsa_data: FmcsaData,
    pub load_data: LoadData,
    pub transcript_extraction: TranscriptExtraction,
}

impl CallRecord {
    pub fn call_id(&self) -> &str {
        &self.system.call_id
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.system.call_id.trim().is_empty() {
            return Err("system.call_id must not be empty".to_string());
        }
        if self.system.call_duration < 0 {
            return Err("system.call_duration must not be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    pub call_id: String,
    #[serde(default)]
    pub call_startedat: Option<String>,
    /// Seconds.
    pub call_duration: i64,
}

/// Carrier lookup result from the FMCSA registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmcsaData {
    pub carrier_mc_number: i64,
    pub carrier_name: String,
    pub carrier_validation_result: String,
    pub retrieval_date: String,
}

/// The load discussed on the call, denormalised at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadData {
    pub load_id_discussed: String,
    pub alternate_loads_presented: i64,
    #[serde(default)]
    pub loadboard_rate: Option<f64>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    /// Free-form lane as the carrier said it, e.g. "Chicago to Dallas".
    #[serde(default)]
    pub carrier_requested_lane: Option<String>,
    #[serde(default)]
    pub equipment_type: Option<String>,
    #[serde(default)]
    pub miles: Option<f64>,
    #[serde(default)]
    pub pickup_datetime: Option<String>,
    #[serde(default)]
    pub delivery_datetime: Option<String>,
}

/// Structured data extracted from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptExtraction {
    #[serde(default)]
    pub negotiation: Negotiation,
    pub outcome: Outcome,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub performance: Performance,
    #[serde(default)]
    pub conversation: Conversation,
    #[serde(default)]
    pub operational: Operational,
    #[serde(default)]
    pub optional: OptionalData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Negotiation {
    pub carrier_first_offer: Option<f64>,
    pub broker_first_counter: Option<f64>,
    pub carrier_second_offer: Option<f64>,
    pub broker_second_counter: Option<f64>,
    pub carrier_third_offer: Option<f64>,
    pub broker_third_counter: Option<f64>,
    pub final_agreed_rate: Option<f64>,
    pub negotiation_rounds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub call_outcome: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Furthest funnel stage the call reached.
    #[serde(default)]
    pub funnel_stage_reached: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    pub call_sentiment: Option<String>,
    pub sentiment_progression: Option<String>,
    pub engagement_level: Option<String>,
    pub carrier_expressed_interest_future: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Performance {
    pub agent_followed_protocol: Option<bool>,
    pub protocol_violations: Vec<String>,
    pub agent_tone_quality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub ai_interruptions_count: Option<i64>,
    pub transcription_errors_detected: Option<bool>,
    pub carrier_had_to_repeat_info: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operational {
    pub transfer_to_sales_attempted: Option<bool>,
    pub transfer_to_sales_completed: Option<bool>,
    pub transfer_reason: Option<String>,
    pub loads_presented_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalData {
    pub negotiation_strategy_used: Option<String>,
    pub carrier_negotiation_leverage: Vec<String>,
    pub carrier_objections: Vec<String>,
    pub carrier_questions_asked: Vec<String>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_fills_defaults() {
        let json = serde_json::json!({
            "system": {"call_id": "call-1", "call_duration": 60},
            "fmcsa_data": {
                "carrier_mc_number": 99,
                "carrier_name": "ACME",
                "carrier_validation_result": "VALID",
                "retrieval_date": "2026-02-13"
            },
            "load_data": {"load_id_discussed": "LD-9", "alternate_loads_presented": 0},
            "transcript_extraction": {"outcome": {"call_outcome": "rejected"}}
        });

        let record: CallRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.call_id(), "call-1");
        assert!(record.transcript_extraction.optional.carrier_objections.is_empty());
        assert_eq!(record.transcript_extraction.negotiation.final_agreed_rate, None);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_missing_outcome_is_rejected() {
        let json = serde_json::json!({
            "system": {"call_id": "call-1", "call_duration": 60},
            "fmcsa_data": {
                "carrier_mc_number": 99,
                "carrier_name": "ACME",
                "carrier_validation_result": "VALID",
                "retrieval_date": "2026-02-13"
            },
            "load_data": {"load_id_discussed": "LD-9", "alternate_loads_presented": 0},
            "transcript_extraction": {}
        });

        assert!(serde_json::from_value::<CallRecord>(json).is_err());
    }

    #[test]
    fn test_blank_call_id_fails_validation() {
        let record = fixtures::call_record("  ");
        assert!(record.validate().is_err());
    }
}
