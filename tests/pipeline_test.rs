// ABOUTME: End-to-end tests for the fetch/derive/build pipeline over an in-memory source
// ABOUTME: Validates stage-tagged fatal errors and dashboard totals across page boundaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use peloton_dash::derive::DeriveConfig;
use peloton_dash::errors::{PipelineError, ProviderError, ProviderResult};
use peloton_dash::models::{FitnessDiscipline, Session, WorkoutPage, WorkoutRecord};
use peloton_dash::pipeline::run_with_source;
use peloton_dash::providers::WorkoutSource;

struct FakeSource {
    pages: Vec<Vec<WorkoutRecord>>,
    fail_at: Option<u32>,
}

#[async_trait]
impl WorkoutSource for FakeSource {
    async fn fetch_workout_page(
        &self,
        _session: &Session,
        page: u32,
    ) -> ProviderResult<WorkoutPage> {
        if self.fail_at == Some(page) {
            return Err(ProviderError::ApiError {
                provider: "peloton".to_owned(),
                status_code: 502,
                message: "bad gateway".to_owned(),
                retryable: true,
            });
        }

        Ok(WorkoutPage {
            index: page,
            workouts: self.pages[page as usize].clone(),
            page_count: self.pages.len() as u32,
        })
    }
}

fn session() -> Session {
    Session {
        session_token: "token".to_owned(),
        account_id: "account".to_owned(),
    }
}

fn derive_config() -> DeriveConfig {
    DeriveConfig {
        recent_cutoff: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        output_unit_divisor: 1000.0,
    }
}

fn cycling(id: &str, start_time: i64, duration: i64, total_work: f64) -> WorkoutRecord {
    WorkoutRecord {
        id: id.to_owned(),
        start_time,
        end_time: start_time + duration,
        total_work,
        fitness_discipline: FitnessDiscipline::Cycling,
        has_leaderboard_metrics: true,
    }
}

#[tokio::test]
async fn test_pipeline_builds_dashboard_across_page_boundaries() {
    // Two workouts in June 2025, split across pages.
    let june_9 = Utc.with_ymd_and_hms(2025, 6, 9, 7, 0, 0).unwrap().timestamp();
    let june_11 = Utc.with_ymd_and_hms(2025, 6, 11, 7, 0, 0).unwrap().timestamp();

    let source = FakeSource {
        pages: vec![
            vec![cycling("w1", june_9, 1800, 300_000.0)],
            vec![cycling("w2", june_11, 1800, 360_000.0)],
        ],
        fail_at: None,
    };

    let dashboard = run_with_source(&source, &session(), &derive_config())
        .await
        .unwrap();

    assert_eq!(dashboard.monthly_class_counts.len(), 1);
    assert_eq!(dashboard.monthly_class_counts[0].month, "2025-06");
    assert_eq!(dashboard.monthly_class_counts[0].cycling, 2);

    // (300 + 360 kJ) over two 30-minute classes averages 11 kJ/min.
    let june = &dashboard.monthly_average_output_thirty[0];
    assert_eq!(june.class_count, 2);
    assert!((june.average_output_per_minute - 11.0).abs() < f64::EPSILON);

    // Both workouts started after the cutoff, so they land in the weekly panels.
    assert_eq!(dashboard.recent_weekly_output_thirty.len(), 1);
    assert_eq!(dashboard.recent_weekly_output_thirty[0].week, "2025-06-09");
}

#[tokio::test]
async fn test_degenerate_rows_are_skipped_not_fatal() {
    let june_9 = Utc.with_ymd_and_hms(2025, 6, 9, 7, 0, 0).unwrap().timestamp();

    let source = FakeSource {
        pages: vec![vec![
            cycling("good", june_9, 1800, 300_000.0),
            // Zero-duration record: skipped during derivation, run continues.
            cycling("degenerate", june_9, 0, 100_000.0),
        ]],
        fail_at: None,
    };

    let dashboard = run_with_source(&source, &session(), &derive_config())
        .await
        .unwrap();

    assert_eq!(dashboard.monthly_class_counts[0].cycling, 1);
}

#[tokio::test]
async fn test_page_failure_aborts_with_fetch_stage_error() {
    let june_9 = Utc.with_ymd_and_hms(2025, 6, 9, 7, 0, 0).unwrap().timestamp();

    let source = FakeSource {
        pages: vec![
            vec![cycling("w1", june_9, 1800, 300_000.0)],
            vec![cycling("w2", june_9, 1800, 300_000.0)],
        ],
        fail_at: Some(1),
    };

    let err = run_with_source(&source, &session(), &derive_config())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert!(err.to_string().starts_with("workout fetch failed"));
}
