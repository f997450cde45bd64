// ABOUTME: Lazy page stream over the paginated workout history endpoint
// ABOUTME: Implements futures::Stream yielding pages in order, plus the eager record aggregator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Workout Page Stream
//!
//! Pagination over the workout history endpoint, as a lazy `futures::Stream`
//! of pages. Page 0 is fetched first and its `page_count` is authoritative
//! for the whole sequence; pages 1..`page_count` follow in strictly
//! increasing order, one request at a time.
//!
//! The stream is finite and non-restartable: a new call re-issues the whole
//! sequence from page 0. Any single page failure terminates the stream with
//! that error — there is no per-page recovery or partial result, so the
//! caller sees an error rather than a silently truncated history.

use std::pin::Pin;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::{Session, WorkoutPage, WorkoutRecord};
use crate::providers::WorkoutSource;

/// Type alias for the page stream returned by [`workout_page_stream`]
pub type WorkoutPageStream<'a> =
    Pin<Box<dyn Stream<Item = Result<WorkoutPage, ProviderError>> + Send + 'a>>;

/// Create a lazy stream over all pages of the account's workout history.
///
/// Yields page 0 as soon as it arrives, then each subsequent page up to the
/// `page_count` reported by page 0. A `page_count` of 0 yields only page 0's
/// (possibly empty) records.
pub fn workout_page_stream<'a>(
    source: &'a dyn WorkoutSource,
    session: &'a Session,
) -> WorkoutPageStream<'a> {
    Box::pin(try_stream! {
        let first = source.fetch_workout_page(session, 0).await?;
        let page_count = first.page_count;
        yield first;

        for page in 1..page_count {
            let next = source.fetch_workout_page(session, page).await?;
            yield next;
        }
    })
}

/// Drain a page stream into one flat record collection.
///
/// Eager by design: nothing is produced until the entire upstream sequence
/// is exhausted, trading streaming for a simpler downstream table build.
/// Records are concatenated in page order, preserving within-page order.
/// Memory cost is O(total records); no bound is enforced.
///
/// # Errors
///
/// Returns the first [`ProviderError`] the stream yields; records collected
/// before the failure are discarded.
pub async fn collect_workouts(
    mut pages: WorkoutPageStream<'_>,
) -> ProviderResult<Vec<WorkoutRecord>> {
    let mut workouts = Vec::new();
    while let Some(page) = pages.next().await {
        workouts.extend(page?.workouts);
    }
    Ok(workouts)
}
