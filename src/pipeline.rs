// ABOUTME: Strictly sequential pipeline orchestration from authentication to dashboard data
// ABOUTME: Stage-tagged fatal error handling; derivation failures stay row-scoped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Pipeline Orchestration
//!
//! Runs the stages in strict order: authenticate, stream pages, aggregate
//! records, derive metrics, build dashboard data. No stage begins before the
//! previous one completes, and no two network calls are ever in flight at
//! once.
//!
//! Authentication and fetch failures abort the run with a stage-tagged
//! [`PipelineError`]; no partial dashboard is produced from partial data.
//! Derivation failures are scoped to the offending row and only lower the
//! row count.

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::dashboard::{build_dashboard, WorkoutDashboard};
use crate::derive::{derive_rows, DeriveConfig};
use crate::errors::PipelineError;
use crate::models::Session;
use crate::pagination::{collect_workouts, workout_page_stream};
use crate::providers::{PelotonClient, WorkoutSource};

/// Run the complete pipeline against the live API.
///
/// # Errors
///
/// Returns [`PipelineError::Authentication`] when login fails (no fetch is
/// attempted) and [`PipelineError::Fetch`] when any page request fails.
pub async fn run(config: &AppConfig) -> Result<WorkoutDashboard, PipelineError> {
    let client = PelotonClient::new(config.peloton.clone());

    let session = client
        .authenticate(&config.credentials)
        .await
        .map_err(PipelineError::Authentication)?;

    run_with_source(&client, &session, &config.derive).await
}

/// Run the fetch/derive/build stages against any workout source.
///
/// Split from [`run`] so the post-authentication pipeline is exercisable
/// against an in-memory source.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] when any page request fails.
pub async fn run_with_source(
    source: &dyn WorkoutSource,
    session: &Session,
    derive_config: &DeriveConfig,
) -> Result<WorkoutDashboard, PipelineError> {
    let pages = workout_page_stream(source, session);
    let workouts = collect_workouts(pages)
        .await
        .map_err(PipelineError::Fetch)?;
    info!("Collected {} workouts", workouts.len());

    let report = derive_rows(&workouts, derive_config);
    if !report.skipped.is_empty() {
        warn!(
            "Skipped {} of {} workouts during derivation",
            report.skipped.len(),
            workouts.len()
        );
    }

    Ok(build_dashboard(&report.rows, derive_config.recent_cutoff))
}
