//! API response types

use serde::Serialize;

/// Error response for envelopes that could not be decoded
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
