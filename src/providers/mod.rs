// ABOUTME: Fitness platform provider implementations
// ABOUTME: Provider seam trait plus the Peloton REST client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Remote fitness-platform providers.
//!
//! The [`WorkoutSource`] trait is the seam between the pagination layer and
//! a concrete platform client: the paginator only needs "give me page N".
//! [`peloton::PelotonClient`] is the production implementation; tests
//! substitute an in-memory source.

use async_trait::async_trait;

use crate::errors::ProviderResult;
use crate::models::{Session, WorkoutPage};

/// Peloton REST API client
pub mod peloton;

pub use peloton::{PelotonClient, PelotonConfig};

/// A source of paginated workout history for an authenticated account
#[async_trait]
pub trait WorkoutSource: Send + Sync {
    /// Fetch one page of the account's workout history.
    ///
    /// Page indices are zero-based. The response's `page_count` must be
    /// populated on every page; callers treat the value from page 0 as
    /// authoritative.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::errors::ProviderError`] if the request fails at the
    /// transport layer, the API returns a non-success status, or the body
    /// cannot be parsed.
    async fn fetch_workout_page(&self, session: &Session, page: u32)
        -> ProviderResult<WorkoutPage>;
}
