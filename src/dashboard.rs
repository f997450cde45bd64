// ABOUTME: Dashboard panel data built from the derived workout table
// ABOUTME: Grouping by month/week, class counts by discipline and duration, average output series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Dashboard Builder
//!
//! Groups and aggregates the derived workout table into the data behind each
//! dashboard panel. Everything visual — panel layout, trace styling — belongs
//! to the external renderer; this module's contract is a serializable
//! document where every series already carries its `month_year`/`week`
//! grouping keys, in ascending key order.
//!
//! Output panels (average output per minute) only consider cycling workouts
//! with leaderboard metrics: free rides have no calibrated output to average.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::derive::{THIRTY_MINUTE_SECS, TWENTY_MINUTE_SECS};
use crate::models::{DerivedRow, FitnessDiscipline};

/// Complete dashboard document handed to the external renderer
#[derive(Debug, Serialize)]
pub struct WorkoutDashboard {
    /// When this document was built
    pub generated_at: DateTime<Utc>,
    /// Cutoff instant behind the recent-window panels
    pub recent_cutoff: DateTime<Utc>,
    /// Class counts by discipline per month
    pub monthly_class_counts: Vec<MonthlyClassCounts>,
    /// Cycling class counts by canonical duration per month
    pub monthly_cycling_durations: Vec<MonthlyDurationCounts>,
    /// Average output per minute per month, cycling classes of 20 minutes or longer
    pub monthly_average_output: Vec<MonthlyAverageOutput>,
    /// Average output per minute per month, 30-minute cycling classes
    pub monthly_average_output_thirty: Vec<MonthlyAverageOutput>,
    /// Average output per minute per month, 20-minute cycling classes
    pub monthly_average_output_twenty: Vec<MonthlyAverageOutput>,
    /// Recent weekly average output per minute, 30-minute cycling classes
    pub recent_weekly_output_thirty: Vec<WeeklyAverageOutput>,
    /// Recent weekly average output per minute, 20-minute cycling classes
    pub recent_weekly_output_twenty: Vec<WeeklyAverageOutput>,
}

/// Class counts for one month, split by discipline
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MonthlyClassCounts {
    /// Grouping key, "YYYY-MM"
    pub month: String,
    /// Cycling classes with leaderboard metrics
    pub cycling: u32,
    /// Cycling classes without leaderboard metrics (free rides)
    pub free_ride: u32,
    /// Strength classes
    pub strength: u32,
}

/// Cycling class counts for one month, split by canonical duration
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MonthlyDurationCounts {
    /// Grouping key, "YYYY-MM"
    pub month: String,
    /// 30-minute classes
    pub thirty_minute: u32,
    /// 20-minute classes
    pub twenty_minute: u32,
}

/// Average output data point for one month
#[derive(Debug, Serialize, PartialEq)]
pub struct MonthlyAverageOutput {
    /// Grouping key, "YYYY-MM"
    pub month: String,
    /// Mean output per minute, rounded to 2 decimals
    pub average_output_per_minute: f64,
    /// Number of classes behind the mean
    pub class_count: u32,
}

/// Average output data point for one ISO-Monday week
#[derive(Debug, Serialize, PartialEq)]
pub struct WeeklyAverageOutput {
    /// Grouping key, "YYYY-MM-DD" (Monday of the week)
    pub week: String,
    /// Mean output per minute, rounded to 2 decimals
    pub average_output_per_minute: f64,
    /// Number of classes behind the mean
    pub class_count: u32,
}

/// Build the full dashboard document from the derived workout table
#[must_use]
pub fn build_dashboard(rows: &[DerivedRow], recent_cutoff: DateTime<Utc>) -> WorkoutDashboard {
    let cycling: Vec<&DerivedRow> = rows.iter().filter(|r| is_cycling(r)).collect();

    WorkoutDashboard {
        generated_at: Utc::now(),
        recent_cutoff,
        monthly_class_counts: monthly_class_counts(rows),
        monthly_cycling_durations: monthly_cycling_durations(&cycling),
        monthly_average_output: monthly_average_output(
            cycling
                .iter()
                .copied()
                .filter(|r| r.duration_seconds >= TWENTY_MINUTE_SECS),
        ),
        monthly_average_output_thirty: monthly_average_output(
            cycling
                .iter()
                .copied()
                .filter(|r| r.duration_seconds == THIRTY_MINUTE_SECS),
        ),
        monthly_average_output_twenty: monthly_average_output(
            cycling
                .iter()
                .copied()
                .filter(|r| r.duration_seconds == TWENTY_MINUTE_SECS),
        ),
        recent_weekly_output_thirty: weekly_average_output(
            cycling
                .iter()
                .copied()
                .filter(|r| r.recent && r.duration_seconds == THIRTY_MINUTE_SECS),
        ),
        recent_weekly_output_twenty: weekly_average_output(
            cycling
                .iter()
                .copied()
                .filter(|r| r.recent && r.duration_seconds == TWENTY_MINUTE_SECS),
        ),
    }
}

/// Cycling class with leaderboard metrics — the only rows with calibrated output
fn is_cycling(row: &DerivedRow) -> bool {
    row.fitness_discipline == FitnessDiscipline::Cycling && row.has_leaderboard_metrics
}

/// Cycling class without leaderboard metrics
fn is_free_ride(row: &DerivedRow) -> bool {
    row.fitness_discipline == FitnessDiscipline::Cycling && !row.has_leaderboard_metrics
}

fn monthly_class_counts(rows: &[DerivedRow]) -> Vec<MonthlyClassCounts> {
    let mut groups: BTreeMap<&str, (u32, u32, u32)> = BTreeMap::new();

    for row in rows {
        let entry = groups.entry(row.month_year.as_str()).or_default();
        if is_cycling(row) {
            entry.0 += row.count;
        } else if is_free_ride(row) {
            entry.1 += row.count;
        } else if row.fitness_discipline == FitnessDiscipline::Strength {
            entry.2 += row.count;
        }
    }

    groups
        .into_iter()
        .map(|(month, (cycling, free_ride, strength))| MonthlyClassCounts {
            month: month.to_owned(),
            cycling,
            free_ride,
            strength,
        })
        .collect()
}

fn monthly_cycling_durations(cycling: &[&DerivedRow]) -> Vec<MonthlyDurationCounts> {
    let mut groups: BTreeMap<&str, (u32, u32)> = BTreeMap::new();

    for row in cycling {
        match row.duration_seconds {
            THIRTY_MINUTE_SECS => groups.entry(row.month_year.as_str()).or_default().0 += row.count,
            TWENTY_MINUTE_SECS => groups.entry(row.month_year.as_str()).or_default().1 += row.count,
            _ => {}
        }
    }

    groups
        .into_iter()
        .map(|(month, (thirty_minute, twenty_minute))| MonthlyDurationCounts {
            month: month.to_owned(),
            thirty_minute,
            twenty_minute,
        })
        .collect()
}

fn monthly_average_output<'a>(
    rows: impl Iterator<Item = &'a DerivedRow>,
) -> Vec<MonthlyAverageOutput> {
    group_average(rows, |row| row.month_year.as_str())
        .into_iter()
        .map(|(month, mean, count)| MonthlyAverageOutput {
            month,
            average_output_per_minute: mean,
            class_count: count,
        })
        .collect()
}

fn weekly_average_output<'a>(
    rows: impl Iterator<Item = &'a DerivedRow>,
) -> Vec<WeeklyAverageOutput> {
    group_average(rows, |row| row.week.as_str())
        .into_iter()
        .map(|(week, mean, count)| WeeklyAverageOutput {
            week,
            average_output_per_minute: mean,
            class_count: count,
        })
        .collect()
}

/// Group rows by key, returning (key, mean output per minute rounded to 2
/// decimals, class count) in ascending key order
fn group_average<'a>(
    rows: impl Iterator<Item = &'a DerivedRow>,
    key: impl Fn(&'a DerivedRow) -> &'a str,
) -> Vec<(String, f64, u32)> {
    let mut groups: BTreeMap<&'a str, (f64, u32)> = BTreeMap::new();

    for row in rows {
        let entry = groups.entry(key(row)).or_default();
        entry.0 += row.output_per_minute;
        entry.1 += row.count;
    }

    groups
        .into_iter()
        .map(|(group_key, (sum, count))| {
            let mean = (sum / f64::from(count) * 100.0).round() / 100.0;
            (group_key.to_owned(), mean, count)
        })
        .collect()
}
