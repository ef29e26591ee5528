//! Shared-secret authentication via the `X-API-Key` header.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `X-API-Key` does not match the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&state.api_key, request.headers())?;
    Ok(next.run(request).await)
}

fn authorize(expected: &str, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(value) = headers.get(API_KEY_HEADER) else {
        return Err(ApiError::Unauthorized);
    };

    let Ok(provided) = value.to_str() else {
        return Err(ApiError::Unauthorized);
    };

    if !keys_match(provided, expected) {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

/// Compare two keys in time independent of where they differ.
///
/// Both sides are hashed first so the comparison always covers 32 bytes
/// regardless of input length.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
