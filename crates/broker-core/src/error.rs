//! Error types for negotiation preconditions.

use thiserror::Error;

/// Reasons a load cannot be negotiated on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    /// Load has already been booked.
    #[error("load {load_id} is not available (status: {status})")]
    NotAvailable { load_id: String, status: String },

    /// Pickup time is not in the future.
    #[error("load {load_id} has expired (pickup {pickup})")]
    Expired { load_id: String, pickup: String },
}
