// ABOUTME: Tests for environment-based configuration loading
// ABOUTME: Required credential enforcement, defaults, overrides, and parse failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use peloton_dash::config::{parse_cutoff, AppConfig};
use serial_test::serial;

const MANAGED_VARS: &[&str] = &[
    "PELOTON_USERNAME",
    "PELOTON_PASSWORD",
    "PELOTON_AUTH_URL",
    "PELOTON_API_BASE",
    "WORKOUTS_PAGE_SIZE",
    "HTTP_TIMEOUT_SECS",
    "HTTP_CONNECT_TIMEOUT_SECS",
    "FETCH_MAX_RETRIES",
    "FETCH_INITIAL_BACKOFF_MS",
    "RECENT_CUTOFF",
    "OUTPUT_UNIT_DIVISOR",
];

fn clear_env() {
    for var in MANAGED_VARS {
        env::remove_var(var);
    }
}

fn set_credentials() {
    env::set_var("PELOTON_USERNAME", "rider@example.com");
    env::set_var("PELOTON_PASSWORD", "secret");
}

#[test]
#[serial]
fn test_missing_username_is_an_error() {
    clear_env();
    env::set_var("PELOTON_PASSWORD", "secret");

    let err = AppConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("PELOTON_USERNAME"));
}

#[test]
#[serial]
fn test_missing_password_is_an_error() {
    clear_env();
    env::set_var("PELOTON_USERNAME", "rider@example.com");

    let err = AppConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("PELOTON_PASSWORD"));
}

#[test]
#[serial]
fn test_defaults_when_only_credentials_are_set() {
    clear_env();
    set_credentials();

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.credentials.username_or_email, "rider@example.com");
    assert_eq!(config.peloton.page_size, 100);
    assert_eq!(config.peloton.auth_url, "https://api.onepeloton.com/auth/login");
    assert_eq!(config.peloton.timeout, Duration::from_secs(30));
    assert_eq!(config.peloton.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.peloton.max_retries, 3);
    assert!((config.derive.output_unit_divisor - 1000.0).abs() < f64::EPSILON);

    // Unset cutoff falls back to a window before now.
    assert!(config.derive.recent_cutoff < Utc::now());
}

#[test]
#[serial]
fn test_environment_overrides_are_applied() {
    clear_env();
    set_credentials();
    env::set_var("PELOTON_API_BASE", "http://localhost:8920/api");
    env::set_var("WORKOUTS_PAGE_SIZE", "25");
    env::set_var("RECENT_CUTOFF", "2025-05-01T00:00:00Z");
    env::set_var("OUTPUT_UNIT_DIVISOR", "500");
    env::set_var("FETCH_MAX_RETRIES", "1");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.peloton.api_base, "http://localhost:8920/api");
    assert_eq!(config.peloton.page_size, 25);
    assert_eq!(config.peloton.max_retries, 1);
    assert!((config.derive.output_unit_divisor - 500.0).abs() < f64::EPSILON);
    assert_eq!(
        config.derive.recent_cutoff,
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
    );

    clear_env();
}

#[test]
#[serial]
fn test_unparseable_page_size_is_an_error() {
    clear_env();
    set_credentials();
    env::set_var("WORKOUTS_PAGE_SIZE", "lots");

    let err = AppConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("WORKOUTS_PAGE_SIZE"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_recent_cutoff_is_an_error() {
    clear_env();
    set_credentials();
    env::set_var("RECENT_CUTOFF", "last tuesday");

    assert!(AppConfig::from_env().is_err());

    clear_env();
}

#[test]
fn test_parse_cutoff_accepts_rfc3339() {
    let cutoff = parse_cutoff("2025-05-01T00:00:00Z").unwrap();
    assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());

    assert!(parse_cutoff("2025-05-01").is_err());
}
