// ABOUTME: Peloton workout history pipeline: authenticate, paginate, derive metrics, build dashboard data
// ABOUTME: Library root exposing the pipeline stages and their supporting modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Peloton workout history fetcher and dashboard data builder.
//!
//! A run-once batch pipeline: exchange credentials for a session capability,
//! page through the account's complete workout history, derive per-workout
//! metrics, and aggregate them into serializable dashboard panel data for an
//! external chart renderer.

/// Environment-based configuration
pub mod config;
/// Dashboard panel data built from the derived workout table
pub mod dashboard;
/// Per-workout metric derivation
pub mod derive;
/// Structured error types for every pipeline stage
pub mod errors;
/// Logging configuration and setup
pub mod logging;
/// Core domain models
pub mod models;
/// Lazy page stream and record aggregation
pub mod pagination;
/// Sequential pipeline orchestration
pub mod pipeline;
/// Fitness platform providers
pub mod providers;

pub use config::AppConfig;
pub use dashboard::{build_dashboard, WorkoutDashboard};
pub use derive::{derive_record, derive_rows, normalize_duration, DeriveConfig, DeriveReport};
pub use errors::{DeriveError, PipelineError, ProviderError, ProviderResult};
pub use models::{
    Credentials, DerivedRow, FitnessDiscipline, Session, WorkoutPage, WorkoutRecord,
};
pub use pagination::{collect_workouts, workout_page_stream, WorkoutPageStream};
pub use providers::{PelotonClient, PelotonConfig, WorkoutSource};
