// ABOUTME: Structured error types for the fetch/derive pipeline
// ABOUTME: Provider errors with retry information, row-scoped derivation errors, stage-tagged pipeline errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling
//!
//! Three error families, matching the three ways this pipeline can fail:
//!
//! - [`ProviderError`] — anything that goes wrong talking to the remote API
//!   (authentication, transport, malformed bodies). Fatal to the run.
//! - [`DeriveError`] — a single workout record with data too degenerate to
//!   derive metrics from. Scoped to that row; the run continues.
//! - [`PipelineError`] — a fatal [`ProviderError`] tagged with the stage that
//!   raised it, so the operator-visible message names auth vs. fetch.

use thiserror::Error;

/// Errors from remote API operations (login and paginated workout fetches)
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Login rejected, or the login response lacked the expected fields.
    /// Always fatal; the session capability cannot be established.
    #[error("{provider} authentication failed: {reason}")]
    AuthenticationFailed {
        /// Provider name (e.g., "peloton")
        provider: String,
        /// Human-readable failure reason
        reason: String,
    },

    /// The API returned a non-success HTTP status
    #[error("{provider} API error (status {status_code}): {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status code returned
        status_code: u16,
        /// Response body or status text
        message: String,
        /// Whether the failure is transient (5xx, 429) and was retry-eligible
        retryable: bool,
    },

    /// Transport-level failure: connection, TLS, or timeout
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be parsed into the expected shape
    #[error("failed to parse {provider} {field}: {source}")]
    ParseError {
        /// Provider name
        provider: String,
        /// Which response document failed to parse
        field: &'static str,
        /// Underlying serde error
        source: serde_json::Error,
    },
}

/// Result type alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Row-scoped data-quality errors raised during metric derivation.
///
/// These never abort the run: the offending record is skipped and reported,
/// and derivation continues with the remaining records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeriveError {
    /// `start_time` is not a representable epoch timestamp
    #[error("workout {workout_id}: start_time {timestamp} is not a valid epoch timestamp")]
    InvalidTimestamp {
        /// Workout identifier from the API
        workout_id: String,
        /// The offending epoch value
        timestamp: i64,
    },

    /// Normalized duration is zero or negative, so `output_per_minute` is undefined
    #[error("workout {workout_id}: non-positive duration of {duration_seconds}s")]
    InvalidDuration {
        /// Workout identifier from the API
        workout_id: String,
        /// The normalized duration that failed validation
        duration_seconds: i64,
    },
}

/// Fatal pipeline failure, tagged with the stage that raised it
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The login call failed; no fetch was attempted
    #[error("authentication failed: {0}")]
    Authentication(#[source] ProviderError),

    /// A page fetch failed; the run aborts with no partial dashboard
    #[error("workout fetch failed: {0}")]
    Fetch(#[source] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = ProviderError::ApiError {
            provider: "peloton".to_owned(),
            status_code: 503,
            message: "service unavailable".to_owned(),
            retryable: true,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("503"));
        assert!(rendered.contains("peloton"));
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let auth = PipelineError::Authentication(ProviderError::AuthenticationFailed {
            provider: "peloton".to_owned(),
            reason: "missing session_id".to_owned(),
        });
        assert!(auth.to_string().starts_with("authentication failed"));

        let fetch = PipelineError::Fetch(ProviderError::NetworkError("timed out".to_owned()));
        assert!(fetch.to_string().starts_with("workout fetch failed"));
    }
}
