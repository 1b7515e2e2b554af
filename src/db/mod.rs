//! Ride storage: the `RideStore` seam and its implementations.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Difficulty, Group, OrganizerType, Ride, RideStatus, RideType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const RIDES: &str = "rides";
    pub const GROUPS: &str = "groups";
}

/// One range query over ride rows.
///
/// Rows are matched by the equality filters and the closed range
/// `[start_from, start_to]`, ordered ascending by `(start_date_time_utc, id)`,
/// begin strictly after the row whose id is `after_id`, and are capped at
/// `take`. An `after_id` that names no row yields no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideQuery {
    pub difficulty: Option<Difficulty>,
    pub ride_type: Option<RideType>,
    pub organizer_type: Option<OrganizerType>,
    pub status: Option<RideStatus>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub after_id: Option<String>,
    pub take: usize,
}

impl RideQuery {
    /// Equality and range predicate (cursor and limit excluded).
    pub fn matches(&self, ride: &Ride) -> bool {
        self.difficulty.map_or(true, |d| ride.difficulty == d)
            && self.ride_type.map_or(true, |t| ride.ride_type == t)
            && self.organizer_type.map_or(true, |o| ride.organizer_type == o)
            && self.status.map_or(true, |s| ride.status == s)
            && self.start_from.map_or(true, |from| ride.start_date_time_utc >= from)
            && self.start_to.map_or(true, |to| ride.start_date_time_utc <= to)
    }
}

/// Backing store for rides and groups.
///
/// Handles are opened once at startup, shared through `AppState`, and
/// closed after the server stops.
#[async_trait]
pub trait RideStore: Send + Sync {
    /// Run one ordered range query. See [`RideQuery`].
    ///
    /// Resolving `after_id` to its `(start, id)` position may cost a
    /// separate lookup. The Firestore store reads the cursor document
    /// first, so a page with a cursor takes two round trips; the memory
    /// store resolves it from its id index.
    async fn query_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, AppError>;

    /// Get a ride by id regardless of status.
    async fn get_ride(&self, id: &str) -> Result<Option<Ride>, AppError>;

    /// Insert or replace a ride by id.
    async fn put_ride(&self, ride: &Ride) -> Result<(), AppError>;

    /// Delete a ride. Returns whether it existed.
    async fn delete_ride(&self, id: &str) -> Result<bool, AppError>;

    /// Active groups ordered by name.
    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError>;

    /// Insert or replace a group by id.
    async fn put_group(&self, group: &Group) -> Result<(), AppError>;

    /// Release the handle. Called once at shutdown.
    async fn close(&self) -> Result<(), AppError> {
        Ok(())
    }
}
