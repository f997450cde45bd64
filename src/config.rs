// ABOUTME: Environment-based configuration read once at startup
// ABOUTME: Credentials, API endpoints, pagination, timeouts, and derivation constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration.
//!
//! Everything is read once at process start and immutable afterwards; the
//! resulting [`AppConfig`] is the explicit context object passed to each
//! pipeline component. There is no config file layer — environment only.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::derive::DeriveConfig;
use crate::models::Credentials;
use crate::providers::PelotonConfig;

/// Default recent-window width when `RECENT_CUTOFF` is unset
const DEFAULT_RECENT_WINDOW_DAYS: i64 = 90;

/// Default joules-to-kilojoules divisor for `output_per_minute`
const DEFAULT_OUTPUT_UNIT_DIVISOR: f64 = 1000.0;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Login credentials
    pub credentials: Credentials,
    /// Peloton API client configuration
    pub peloton: PelotonConfig,
    /// Metric derivation configuration
    pub derive: DeriveConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `PELOTON_USERNAME` and `PELOTON_PASSWORD` are required; everything
    /// else falls back to a sensible default.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a set
    /// variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let username_or_email =
            env::var("PELOTON_USERNAME").context("PELOTON_USERNAME must be set")?;
        let password = env::var("PELOTON_PASSWORD").context("PELOTON_PASSWORD must be set")?;

        let defaults = PelotonConfig::default();
        let peloton = PelotonConfig {
            auth_url: env::var("PELOTON_AUTH_URL").unwrap_or(defaults.auth_url),
            api_base: env::var("PELOTON_API_BASE").unwrap_or(defaults.api_base),
            page_size: env_parse("WORKOUTS_PAGE_SIZE", defaults.page_size)?,
            timeout: Duration::from_secs(env_parse(
                "HTTP_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            connect_timeout: Duration::from_secs(env_parse(
                "HTTP_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
            max_retries: env_parse("FETCH_MAX_RETRIES", defaults.max_retries)?,
            initial_backoff_ms: env_parse(
                "FETCH_INITIAL_BACKOFF_MS",
                defaults.initial_backoff_ms,
            )?,
        };

        let derive = DeriveConfig {
            recent_cutoff: recent_cutoff_from_env()?,
            output_unit_divisor: env_parse("OUTPUT_UNIT_DIVISOR", DEFAULT_OUTPUT_UNIT_DIVISOR)?,
        };

        Ok(Self {
            credentials: Credentials {
                username_or_email,
                password,
            },
            peloton,
            derive,
        })
    }
}

/// Parse the recent-window cutoff from `RECENT_CUTOFF` (RFC 3339), falling
/// back to a fixed window before startup when unset.
fn recent_cutoff_from_env() -> Result<DateTime<Utc>> {
    match env::var("RECENT_CUTOFF") {
        Ok(raw) => parse_cutoff(&raw),
        Err(_) => Ok(Utc::now() - chrono::Duration::days(DEFAULT_RECENT_WINDOW_DAYS)),
    }
}

/// Parse an RFC 3339 instant into the recent-window cutoff
///
/// # Errors
///
/// Returns an error when the value is not a valid RFC 3339 timestamp.
pub fn parse_cutoff(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid RFC 3339 timestamp: {raw}"))
}

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} has an unparseable value: {raw}")),
        Err(_) => Ok(default),
    }
}
