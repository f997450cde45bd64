// ABOUTME: Peloton REST API client for session authentication and workout history
// ABOUTME: Handles cookie-based session auth, paginated workout fetches, and retry with backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Peloton REST API client.
//!
//! Peloton uses a session-cookie scheme rather than `OAuth2`: a `POST` to the
//! login endpoint returns `{session_id, user_id}`, and every later call
//! attaches `Cookie: peloton_session_id=<token>`. The session is modeled as
//! an explicit [`Session`] capability value passed into each call, not as
//! hidden client state, so the fetch layer stays agnostic to reuse mechanics.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::{Credentials, FitnessDiscipline, Session, WorkoutPage, WorkoutRecord};
use crate::providers::WorkoutSource;

/// Provider name used in error reporting and logs
pub const PROVIDER_NAME: &str = "peloton";

/// Default login endpoint
pub const DEFAULT_AUTH_URL: &str = "https://api.onepeloton.com/auth/login";

/// Default REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.onepeloton.com/api";

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Peloton API configuration
#[derive(Debug, Clone)]
pub struct PelotonConfig {
    /// Login endpoint URL
    pub auth_url: String,
    /// REST API base URL
    pub api_base: String,
    /// Records requested per page
    pub page_size: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds (doubled per attempt)
    pub initial_backoff_ms: u64,
}

impl Default for PelotonConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

/// Peloton REST client
pub struct PelotonClient {
    config: PelotonConfig,
    client: Client,
}

/// Response from the login endpoint
#[derive(Debug, Deserialize)]
struct AuthResponse {
    session_id: Option<String>,
    user_id: Option<String>,
}

/// Response from the paginated workout list endpoint
#[derive(Debug, Deserialize)]
struct WorkoutListResponse {
    data: Vec<WorkoutSummary>,
    page_count: u32,
}

/// One workout as it appears on the wire; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct WorkoutSummary {
    id: String,
    start_time: i64,
    end_time: i64,
    #[serde(default)]
    total_work: f64,
    fitness_discipline: FitnessDiscipline,
    #[serde(default)]
    has_leaderboard_metrics: bool,
}

impl From<WorkoutSummary> for WorkoutRecord {
    fn from(summary: WorkoutSummary) -> Self {
        Self {
            id: summary.id,
            start_time: summary.start_time,
            end_time: summary.end_time,
            total_work: summary.total_work,
            fitness_discipline: summary.fitness_discipline,
            has_leaderboard_metrics: summary.has_leaderboard_metrics,
        }
    }
}

/// Parse a login response body into a [`Session`].
///
/// Factored out of [`PelotonClient::authenticate`] so the
/// missing-`session_id` contract stays unit-testable without a network.
///
/// # Errors
///
/// Returns [`ProviderError::ParseError`] for a non-JSON body and
/// [`ProviderError::AuthenticationFailed`] when `session_id` or `user_id`
/// is absent.
pub fn parse_auth_response(body: &str) -> ProviderResult<Session> {
    let parsed: AuthResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError {
            provider: PROVIDER_NAME.to_owned(),
            field: "auth_response",
            source: e,
        })?;

    let session_token = parsed
        .session_id
        .ok_or_else(|| ProviderError::AuthenticationFailed {
            provider: PROVIDER_NAME.to_owned(),
            reason: "login response missing session_id".to_owned(),
        })?;
    let account_id = parsed
        .user_id
        .ok_or_else(|| ProviderError::AuthenticationFailed {
            provider: PROVIDER_NAME.to_owned(),
            reason: "login response missing user_id".to_owned(),
        })?;

    Ok(Session {
        session_token,
        account_id,
    })
}

/// Parse a workout list response body into a [`WorkoutPage`].
///
/// # Errors
///
/// Returns [`ProviderError::ParseError`] when the body does not match the
/// expected `{data, page_count}` shape.
pub fn parse_workout_page(body: &str, index: u32) -> ProviderResult<WorkoutPage> {
    let parsed: WorkoutListResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError {
            provider: PROVIDER_NAME.to_owned(),
            field: "workout_list",
            source: e,
        })?;

    Ok(WorkoutPage {
        index,
        workouts: parsed.data.into_iter().map(Into::into).collect(),
        page_count: parsed.page_count,
    })
}

impl PelotonClient {
    /// Create a new client with the given configuration
    #[must_use]
    pub fn new(config: PelotonConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Exchange credentials for a session capability.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::AuthenticationFailed`] when the endpoint
    /// rejects the credentials or the response lacks the expected fields,
    /// and [`ProviderError::NetworkError`] on transport failure. Never
    /// retried: a failed login is fatal to the run.
    pub async fn authenticate(&self, credentials: &Credentials) -> ProviderResult<Session> {
        info!("Authenticating against {}", self.config.auth_url);

        let body = serde_json::json!({
            "username_or_email": credentials.username_or_email,
            "password": credentials.password,
        });

        let response = self
            .client
            .post(&self.config.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ProviderError::AuthenticationFailed {
                provider: PROVIDER_NAME.to_owned(),
                reason: format!("login rejected with status {status}: {text}"),
            });
        }

        let session = parse_auth_response(&text)?;
        info!("Authenticated as account {}", session.account_id);
        Ok(session)
    }

    /// Issue an authenticated GET, retrying transient failures with bounded
    /// exponential backoff. Timeouts and 5xx/429 responses are retryable;
    /// other non-success statuses surface immediately.
    async fn get_with_retry(&self, url: &str, session: &Session) -> ProviderResult<String> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .get(url)
                .header(
                    "Cookie",
                    format!("peloton_session_id={}", session.session_token),
                )
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        return Err(ProviderError::NetworkError(e.to_string()));
                    }
                    self.backoff(attempt, &format!("network error: {e}")).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response
                    .text()
                    .await
                    .map_err(|e| ProviderError::NetworkError(e.to_string()));
            }

            let message = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                // The session capability was rejected; re-authentication is
                // out of scope for a run-once job.
                return Err(ProviderError::AuthenticationFailed {
                    provider: PROVIDER_NAME.to_owned(),
                    reason: format!("session rejected with status {status}: {message}"),
                });
            }

            let retryable =
                status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
            attempt += 1;
            if !retryable || attempt > self.config.max_retries {
                return Err(ProviderError::ApiError {
                    provider: PROVIDER_NAME.to_owned(),
                    status_code: status.as_u16(),
                    message,
                    retryable,
                });
            }

            self.backoff(attempt, &format!("status {status}")).await;
        }
    }

    async fn backoff(&self, attempt: u32, cause: &str) {
        let backoff_ms = self.config.initial_backoff_ms * 2_u64.pow(attempt - 1);
        let max_retries = self.config.max_retries;
        warn!("{PROVIDER_NAME} request failed ({cause}) - retry {attempt}/{max_retries} after {backoff_ms}ms backoff");
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
    }
}

#[async_trait]
impl WorkoutSource for PelotonClient {
    async fn fetch_workout_page(
        &self,
        session: &Session,
        page: u32,
    ) -> ProviderResult<WorkoutPage> {
        let url = format!(
            "{}/user/{}/workouts?limit={}&page={}",
            self.config.api_base, session.account_id, self.config.page_size, page
        );
        info!("Fetching workout page {page}");

        let body = self.get_with_retry(&url, session).await?;
        let parsed = parse_workout_page(&body, page)?;
        info!(
            "Page {page}: {} workouts ({} pages total)",
            parsed.workouts.len(),
            parsed.page_count
        );
        Ok(parsed)
    }
}
