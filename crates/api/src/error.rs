//! Error types for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker_core::NegotiationError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or incorrect API key.
    #[error("Invalid API key")]
    Unauthorized,

    /// Carrier has not passed FMCSA validation.
    #[error("Carrier validation failed")]
    CarrierNotValidated,

    /// Malformed query parameter.
    #[error("{0}")]
    BadRequest(String),

    /// Request body could not be parsed.
    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),

    /// Request body parsed but failed a field constraint.
    #[error("{0}")]
    Validation(String),

    /// Requested entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Load cannot be negotiated on.
    #[error("Load is not available for negotiation (booked or expired)")]
    NotNegotiable(#[from] NegotiationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, .. } => ApiError::NotFound(entity),
            other => ApiError::Database(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::CarrierNotValidated => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::NotNegotiable(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) | ApiError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                "Internal server error".to_string()
            }
            ApiError::NotNegotiable(reason) => {
                tracing::info!(%reason, "Negotiation refused");
                self.to_string()
            }
            ApiError::Unauthorized => {
                tracing::warn!("Unauthorized request");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::CarrierNotValidated.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Validation("carrier_offer must be greater than 0".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let expired = NegotiationError::Expired {
            load_id: "LD-001".into(),
            pickup: "2020-01-01T00:00:00".into(),
        };
        assert_eq!(ApiError::from(expired).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_not_found_maps_to_404() {
        let err = ApiError::from(DatabaseError::NotFound {
            entity: "Load",
            id: "LD-404".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Load not found");
    }
}
