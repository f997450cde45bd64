// ABOUTME: Core domain models for workout history fetching and metric derivation
// ABOUTME: Credentials, Session capability, WorkoutRecord, WorkoutPage, and DerivedRow types

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Domain models shared across the pipeline stages.
//!
//! Records are explicit structured types with a fixed field set, never
//! dynamic maps: a field-name typo is a compile error here, not a silently
//! absent column downstream.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login credentials, read once at process start and immutable thereafter
#[derive(Clone)]
pub struct Credentials {
    /// Username or email accepted by the login endpoint
    pub username_or_email: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session capability returned by authentication.
///
/// Read-only after creation; every subsequent API call carries both fields.
/// No expiry is known client-side — a later authentication rejection is
/// fatal rather than triggering re-authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token attached to every request
    pub session_token: String,
    /// Opaque account identifier scoping the workout collection endpoint
    pub account_id: String,
}

/// Fitness discipline reported by the platform for a workout.
///
/// Only the disciplines the dashboard distinguishes get their own variant;
/// `Other` preserves the provider's original string for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FitnessDiscipline {
    /// Cycling class (studio or free ride)
    Cycling,
    /// Strength class
    Strength,
    /// Any other discipline (yoga, meditation, running, ...)
    Other(String),
}

impl FitnessDiscipline {
    /// The provider's string form of this discipline
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cycling => "cycling",
            Self::Strength => "strength",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for FitnessDiscipline {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cycling" => Self::Cycling,
            "strength" => Self::Strength,
            _ => Self::Other(value),
        }
    }
}

impl From<FitnessDiscipline> for String {
    fn from(value: FitnessDiscipline) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for FitnessDiscipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One completed workout as reported by the platform's list endpoint.
///
/// Immutable once fetched; the raw unit every downstream stage consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Platform identifier for the workout
    pub id: String,
    /// Workout start, epoch seconds
    pub start_time: i64,
    /// Workout end, epoch seconds
    pub end_time: i64,
    /// Total energy output in joules
    pub total_work: f64,
    /// Discipline of the class
    pub fitness_discipline: FitnessDiscipline,
    /// Whether the platform recorded leaderboard metrics for this workout
    pub has_leaderboard_metrics: bool,
}

/// One page of workout records from the paginated list endpoint.
///
/// `page_count` is read from the first page's response and is authoritative
/// for the whole sequence; it is carried on every page for convenience but
/// never re-validated.
#[derive(Debug, Clone)]
pub struct WorkoutPage {
    /// Zero-based page index
    pub index: u32,
    /// Records on this page, in API order
    pub workouts: Vec<WorkoutRecord>,
    /// Total number of pages reported by the API
    pub page_count: u32,
}

/// A workout record augmented with derived temporal and performance fields
#[derive(Debug, Clone, Serialize)]
pub struct DerivedRow {
    /// Platform identifier for the workout
    pub workout_id: String,
    /// Discipline of the class
    pub fitness_discipline: FitnessDiscipline,
    /// Whether the platform recorded leaderboard metrics for this workout
    pub has_leaderboard_metrics: bool,
    /// Parsed start timestamp (UTC)
    pub start_date: DateTime<Utc>,
    /// Grouping key: start date formatted as "YYYY-MM"
    pub month_year: String,
    /// Grouping key: the Monday on/before the start date, formatted "YYYY-MM-DD"
    pub week: String,
    /// Duration in seconds, snapped to a canonical class length when within tolerance
    pub duration_seconds: i64,
    /// Normalized work rate: kilojoules per elapsed minute
    pub output_per_minute: f64,
    /// True when the workout started strictly after the configured recent cutoff
    pub recent: bool,
    /// Aggregation helper field, always 1
    pub count: u32,
}
