// ABOUTME: Per-workout metric derivation into the dashboard input table
// ABOUTME: Duration snapping, week/month bucketing, output-per-minute, recent flagging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Metric Derivation
//!
//! Pure per-record transformation of [`WorkoutRecord`] into [`DerivedRow`].
//! Every rule is a function of the record's own fields plus the
//! [`DeriveConfig`]; there is no cross-record state, so deriving the same
//! record twice yields identical output.
//!
//! Records with degenerate data (unrepresentable timestamps, non-positive
//! durations) are skipped and reported per row rather than aborting the run
//! or silently corrupting downstream aggregates.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use tracing::warn;

use crate::errors::DeriveError;
use crate::models::{DerivedRow, WorkoutRecord};

/// Canonical 30-minute class length in seconds
pub const THIRTY_MINUTE_SECS: i64 = 1800;

/// Canonical 20-minute class length in seconds
pub const TWENTY_MINUTE_SECS: i64 = 1200;

/// Tolerance window (seconds) within which a raw duration snaps to a
/// canonical class length, absorbing minor recording jitter
pub const SNAP_TOLERANCE_SECS: i64 = 20;

/// Configuration for metric derivation
#[derive(Debug, Clone)]
pub struct DeriveConfig {
    /// Workouts starting strictly after this instant are flagged recent
    pub recent_cutoff: DateTime<Utc>,
    /// Divisor converting `total_work` to the dashboard's output unit
    /// (joules to kilojoules). The API does not document its unit, so the
    /// conversion stays configurable rather than hard-coded.
    pub output_unit_divisor: f64,
}

/// Result of deriving a batch of records: the rows that survived plus the
/// per-row errors for the ones that did not
#[derive(Debug)]
pub struct DeriveReport {
    /// Derived rows, one per valid input record, in input order
    pub rows: Vec<DerivedRow>,
    /// Row-scoped errors for skipped records, in input order
    pub skipped: Vec<DeriveError>,
}

/// Snap a raw duration to a canonical class length when within tolerance.
///
/// Raw durations in [1780, 1820] become 1800 and [1180, 1220] become 1200;
/// everything else passes through unchanged. The two windows are disjoint.
#[must_use]
pub fn normalize_duration(raw_secs: i64) -> i64 {
    let thirty = THIRTY_MINUTE_SECS - SNAP_TOLERANCE_SECS..=THIRTY_MINUTE_SECS + SNAP_TOLERANCE_SECS;
    let twenty = TWENTY_MINUTE_SECS - SNAP_TOLERANCE_SECS..=TWENTY_MINUTE_SECS + SNAP_TOLERANCE_SECS;

    if thirty.contains(&raw_secs) {
        THIRTY_MINUTE_SECS
    } else if twenty.contains(&raw_secs) {
        TWENTY_MINUTE_SECS
    } else {
        raw_secs
    }
}

/// The Monday on/before the given timestamp's calendar date
#[must_use]
pub fn week_start(date: DateTime<Utc>) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date.date_naive() - chrono::Duration::days(offset)
}

/// Derive the metric row for one workout record.
///
/// # Errors
///
/// Returns a [`DeriveError`] when `start_time` is not a representable epoch
/// timestamp or the normalized duration is zero or negative (which would
/// make `output_per_minute` a division artifact).
pub fn derive_record(record: &WorkoutRecord, config: &DeriveConfig) -> Result<DerivedRow, DeriveError> {
    let start_date = Utc
        .timestamp_opt(record.start_time, 0)
        .single()
        .ok_or_else(|| DeriveError::InvalidTimestamp {
            workout_id: record.id.clone(),
            timestamp: record.start_time,
        })?;

    let duration_seconds = normalize_duration(record.end_time - record.start_time);
    if duration_seconds <= 0 {
        return Err(DeriveError::InvalidDuration {
            workout_id: record.id.clone(),
            duration_seconds,
        });
    }

    let output_per_minute =
        (record.total_work / config.output_unit_divisor) / (duration_seconds as f64 / 60.0);

    Ok(DerivedRow {
        workout_id: record.id.clone(),
        fitness_discipline: record.fitness_discipline.clone(),
        has_leaderboard_metrics: record.has_leaderboard_metrics,
        start_date,
        month_year: start_date.format("%Y-%m").to_string(),
        week: week_start(start_date).format("%Y-%m-%d").to_string(),
        duration_seconds,
        output_per_minute,
        recent: start_date > config.recent_cutoff,
        count: 1,
    })
}

/// Derive metric rows for a batch of records, skipping and reporting rows
/// whose data is too degenerate to derive from.
///
/// Output order matches input order for the rows that survive. Skipped rows
/// are logged at WARN and returned in the report so the caller can surface
/// the count.
#[must_use]
pub fn derive_rows(records: &[WorkoutRecord], config: &DeriveConfig) -> DeriveReport {
    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        match derive_record(record, config) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Skipping workout during derivation: {e}");
                skipped.push(e);
            }
        }
    }

    DeriveReport { rows, skipped }
}
