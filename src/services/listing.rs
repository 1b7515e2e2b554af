// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated ride listing.
//!
//! Rides are listed in canonical order, ascending `(start_date_time_utc, id)`.
//! A page is fetched with one range query for `limit + 1` rows starting
//! strictly after the cursor row; the extra row only signals that another
//! page exists. The cursor is the id of the last ride on the previous page.
//!
//! Paging is stateless. If rides are edited between calls, a resumed listing
//! may skip or repeat rows near the page boundary whose sort keys changed.
//! A cursor whose ride has since been deleted ends the listing with an
//! empty page rather than an error.

use crate::db::{RideQuery, RideStore};
use crate::error::{AppError, Result};
use crate::models::{Difficulty, OrganizerType, Ride, RideStatus, RideType};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

/// Listing filter. Enumerated fields are already validated by their types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideFilter {
    pub difficulty: Option<Difficulty>,
    pub ride_type: Option<RideType>,
    pub organizer_type: Option<OrganizerType>,
    pub status: Option<RideStatus>,
    /// Lower bound on start time; only applied when `include_past` is set.
    pub date_from: Option<DateTime<Utc>>,
    /// Upper bound on start time; only applied when `include_past` is set.
    pub date_to: Option<DateTime<Utc>>,
    pub include_past: bool,
}

/// Page size and position. The limit is always within `1..=MAX_LIMIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    limit: u32,
    cursor: Option<String>,
}

impl PageRequest {
    /// Validate a requested page. `None` selects [`DEFAULT_LIMIT`]; an empty
    /// cursor means "from the start".
    pub fn new(limit: Option<i64>, cursor: Option<String>) -> Result<Self> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(n) if (1..=MAX_LIMIT as i64).contains(&n) => n as u32,
            Some(_) => return Err(invalid_limit()),
        };
        Ok(Self {
            limit,
            cursor: cursor.filter(|c| !c.is_empty()),
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

pub(crate) fn invalid_limit() -> AppError {
    AppError::InvalidFilter(format!("Invalid limit (1-{MAX_LIMIT})"))
}

/// One page of rides.
#[derive(Debug, Clone, PartialEq)]
pub struct RidePage {
    pub rides: Vec<Ride>,
    /// Id of the last ride when more rows follow; `None` at end of stream.
    pub next_cursor: Option<String>,
}

/// Read-only ride listing over an injected store.
#[derive(Clone)]
pub struct RideListingService {
    store: Arc<dyn RideStore>,
}

impl RideListingService {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// List one page relative to the current time.
    pub async fn list(&self, filter: &RideFilter, page: &PageRequest) -> Result<RidePage> {
        self.list_at(filter, page, Utc::now()).await
    }

    /// List one page, treating `now` as the current time.
    pub async fn list_at(
        &self,
        filter: &RideFilter,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> Result<RidePage> {
        let limit = page.limit() as usize;
        let query = build_query(filter, page, now);

        tracing::debug!(
            include_past = filter.include_past,
            status = ?query.status,
            cursor = ?query.after_id,
            limit,
            "Listing rides"
        );

        let mut rides = self.store.query_rides(&query).await?;

        let has_more = rides.len() > limit;
        if has_more {
            rides.truncate(limit);
        }
        let next_cursor = if has_more {
            rides.last().map(|r| r.id.clone())
        } else {
            None
        };

        Ok(RidePage { rides, next_cursor })
    }

    /// Fetch one ride by id, regardless of status or date.
    pub async fn get_by_id(&self, id: &str) -> Result<Ride> {
        self.store
            .get_ride(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride not found".to_string()))
    }
}

/// Translate a filter into the store query.
///
/// Without `include_past`, only rides starting at or after `now` match,
/// and if no status was requested only PUBLISHED rides match. An explicit
/// status is honored as given. With `include_past`, no implicit floor or
/// status applies and `date_from`/`date_to` bound the start time.
fn build_query(filter: &RideFilter, page: &PageRequest, now: DateTime<Utc>) -> RideQuery {
    let mut query = RideQuery {
        difficulty: filter.difficulty,
        ride_type: filter.ride_type,
        organizer_type: filter.organizer_type,
        status: filter.status,
        start_from: None,
        start_to: None,
        after_id: page.cursor.clone(),
        take: page.limit() as usize + 1,
    };

    if filter.include_past {
        query.start_from = filter.date_from;
        query.start_to = filter.date_to;
    } else {
        query.start_from = Some(now);
        if filter.status.is_none() {
            query.status = Some(RideStatus::Published);
        }
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn page_request_bounds() {
        assert_eq!(PageRequest::new(None, None).unwrap().limit(), DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(Some(1), None).unwrap().limit(), 1);
        assert_eq!(PageRequest::new(Some(100), None).unwrap().limit(), 100);
        for bad in [0, 101, -1, i64::MAX] {
            assert!(matches!(
                PageRequest::new(Some(bad), None),
                Err(AppError::InvalidFilter(_))
            ));
        }
        assert_eq!(
            PageRequest::new(None, Some(String::new())).unwrap().cursor(),
            None
        );
    }

    #[test]
    fn default_view_is_future_and_published() {
        let query = build_query(&RideFilter::default(), &PageRequest::default(), now());
        assert_eq!(query.start_from, Some(now()));
        assert_eq!(query.start_to, None);
        assert_eq!(query.status, Some(RideStatus::Published));
        assert_eq!(query.take, DEFAULT_LIMIT as usize + 1);
    }

    #[test]
    fn explicit_status_wins_in_default_view() {
        let filter = RideFilter {
            status: Some(RideStatus::Draft),
            ..Default::default()
        };
        let query = build_query(&filter, &PageRequest::default(), now());
        assert_eq!(query.status, Some(RideStatus::Draft));
        assert_eq!(query.start_from, Some(now()));
    }

    #[test]
    fn date_window_only_applies_with_include_past() {
        let from = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        let mut filter = RideFilter {
            date_from: Some(from),
            date_to: Some(to),
            ..Default::default()
        };

        let query = build_query(&filter, &PageRequest::default(), now());
        assert_eq!(query.start_from, Some(now()));
        assert_eq!(query.start_to, None);

        filter.include_past = true;
        let query = build_query(&filter, &PageRequest::default(), now());
        assert_eq!(query.start_from, Some(from));
        assert_eq!(query.start_to, Some(to));
        assert_eq!(query.status, None);
    }
}
