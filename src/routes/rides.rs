// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public ride and group listing routes.

use crate::error::{AppError, Result};
use crate::models::{Group, ParseEnumError, Ride};
use crate::services::listing::invalid_limit;
use crate::services::{PageRequest, RideFilter};
use crate::time_utils::parse_instant;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Public routes (no authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rides", get(get_rides))
        .route("/api/groups", get(get_groups))
}

/// Raw query string for `/api/rides`. Everything arrives as text and is
/// validated here so that bad values map to a 400 with a field-specific
/// message. Empty values are treated as absent, and when a key repeats
/// the first value wins.
#[derive(Debug, Default)]
struct RidesQuery {
    /// Fetch a single ride by id, bypassing every other parameter
    id: Option<String>,
    difficulty: Option<String>,
    ride_type: Option<String>,
    organizer_type: Option<String>,
    status: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    include_past: Option<String>,
    limit: Option<String>,
    cursor: Option<String>,
}

impl RidesQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "id" => &mut query.id,
                "difficulty" => &mut query.difficulty,
                "rideType" => &mut query.ride_type,
                "organizerType" => &mut query.organizer_type,
                "status" => &mut query.status,
                "dateFrom" => &mut query.date_from,
                "dateTo" => &mut query.date_to,
                "includePast" => &mut query.include_past,
                "limit" => &mut query.limit,
                "cursor" => &mut query.cursor,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    fn into_listing(self) -> Result<(RideFilter, PageRequest)> {
        let filter = RideFilter {
            difficulty: parse_enum(self.difficulty.as_deref())?,
            ride_type: parse_enum(self.ride_type.as_deref())?,
            organizer_type: parse_enum(self.organizer_type.as_deref())?,
            status: parse_enum(self.status.as_deref())?,
            date_from: parse_date(self.date_from.as_deref(), "dateFrom")?,
            date_to: parse_date(self.date_to.as_deref(), "dateTo")?,
            include_past: parse_include_past(self.include_past.as_deref())?,
        };
        let page = PageRequest::new(parse_limit(self.limit.as_deref())?, self.cursor)?;
        Ok((filter, page))
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn parse_enum<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = ParseEnumError>,
{
    non_empty(raw)
        .map(|s| s.parse::<T>().map_err(|e| AppError::InvalidFilter(e.to_string())))
        .transpose()
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>> {
    non_empty(raw)
        .map(|s| parse_instant(s).ok_or_else(|| AppError::InvalidFilter(format!("Invalid {field}"))))
        .transpose()
}

fn parse_include_past(raw: Option<&str>) -> Result<bool> {
    match non_empty(raw) {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(_) => Err(AppError::InvalidFilter("Invalid includePast".to_string())),
    }
}

fn parse_limit(raw: Option<&str>) -> Result<Option<i64>> {
    non_empty(raw)
        .map(|s| s.trim().parse::<i64>().map_err(|_| invalid_limit()))
        .transpose()
}

/// One page of rides.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RidesResponse {
    pub data: Vec<Ride>,
    /// Pass back as `cursor` to fetch the next page; absent on the last page
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(optional))]
    pub next_cursor: Option<String>,
}

/// List rides, or fetch one ride when `id` is given.
async fn get_rides(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let params = RidesQuery::from_pairs(pairs);
    if let Some(id) = non_empty(params.id.as_deref()) {
        tracing::debug!(ride_id = %id, "Fetching ride");
        let ride = state.listing.get_by_id(id).await?;
        return Ok(Json(ride).into_response());
    }

    let (filter, page) = params.into_listing()?;
    let page = state.listing.list(&filter, &page).await?;

    tracing::debug!(
        count = page.rides.len(),
        has_more = page.next_cursor.is_some(),
        "Listed rides"
    );

    Ok(Json(RidesResponse {
        data: page.rides,
        next_cursor: page.next_cursor,
    })
    .into_response())
}

/// List active organizing groups, ordered by name. The body is a bare array.
async fn get_groups(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Group>>> {
    Ok(Json(state.store.list_active_groups().await?))
}
