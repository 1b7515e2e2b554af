// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process ride store for local development and tests.

use super::{RideQuery, RideStore};
use crate::error::AppError;
use crate::models::{Group, Ride};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use tokio::sync::RwLock;

/// `(start_date_time_utc, id)`: the canonical listing order.
type SortKey = (DateTime<Utc>, String);

#[derive(Default)]
struct Rides {
    by_key: BTreeMap<SortKey, Ride>,
    key_by_id: HashMap<String, SortKey>,
}

/// Ride store backed by ordered in-memory maps.
#[derive(Default)]
pub struct MemoryStore {
    rides: RwLock<Rides>,
    groups: RwLock<HashMap<String, Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rides.
    pub async fn ride_count(&self) -> usize {
        self.rides.read().await.by_key.len()
    }
}

#[async_trait]
impl RideStore for MemoryStore {
    async fn query_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, AppError> {
        let rides = self.rides.read().await;

        let lower = match &query.after_id {
            Some(id) => match rides.key_by_id.get(id) {
                Some(key) => Bound::Excluded(key.clone()),
                None => return Ok(Vec::new()),
            },
            None => match query.start_from {
                Some(from) => Bound::Included((from, String::new())),
                None => Bound::Unbounded,
            },
        };

        let page = rides
            .by_key
            .range((lower, Bound::Unbounded))
            .map(|(_, ride)| ride)
            .take_while(|ride| {
                query
                    .start_to
                    .map_or(true, |to| ride.start_date_time_utc <= to)
            })
            .filter(|ride| query.matches(ride))
            .take(query.take)
            .cloned()
            .collect();

        Ok(page)
    }

    async fn get_ride(&self, id: &str) -> Result<Option<Ride>, AppError> {
        let rides = self.rides.read().await;
        Ok(rides
            .key_by_id
            .get(id)
            .and_then(|key| rides.by_key.get(key))
            .cloned())
    }

    async fn put_ride(&self, ride: &Ride) -> Result<(), AppError> {
        let mut rides = self.rides.write().await;
        let key: SortKey = (ride.start_date_time_utc, ride.id.clone());
        if let Some(old_key) = rides.key_by_id.insert(ride.id.clone(), key.clone()) {
            rides.by_key.remove(&old_key);
        }
        rides.by_key.insert(key, ride.clone());
        Ok(())
    }

    async fn delete_ride(&self, id: &str) -> Result<bool, AppError> {
        let mut rides = self.rides.write().await;
        match rides.key_by_id.remove(id) {
            Some(key) => {
                rides.by_key.remove(&key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError> {
        let groups = self.groups.read().await;
        let mut active: Vec<Group> = groups.values().filter(|g| g.is_active).cloned().collect();
        active.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn put_group(&self, group: &Group) -> Result<(), AppError> {
        self.groups
            .write()
            .await
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        let count = self.ride_count().await;
        tracing::info!(rides = count, "Closing in-memory ride store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, OrganizerType, RideStatus, RideType};
    use chrono::TimeZone;

    fn ride(id: &str, day: u32, status: RideStatus) -> Ride {
        let start = Utc.with_ymd_and_hms(2030, 1, day, 9, 0, 0).unwrap();
        Ride {
            id: id.to_string(),
            title: format!("Ride {id}"),
            group: "Metro Cycling Club".to_string(),
            start_date_time_utc: start,
            timezone: "America/New_York".to_string(),
            meetup_location_short: "Lot".to_string(),
            meetup_location_full: None,
            route_url: "https://example.com/route".to_string(),
            route_platform: None,
            difficulty: Difficulty::Easy,
            ride_type: RideType::Road,
            organizer_type: OrganizerType::Group,
            status,
            event_url: None,
            notes: None,
            created_by_user_id: "admin".to_string(),
            created_at_utc: start,
            updated_at_utc: start,
        }
    }

    fn query(take: usize) -> RideQuery {
        RideQuery {
            take,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn query_orders_by_start_then_id() {
        let store = MemoryStore::new();
        store.put_ride(&ride("c", 2, RideStatus::Published)).await.unwrap();
        store.put_ride(&ride("b", 1, RideStatus::Published)).await.unwrap();
        store.put_ride(&ride("a", 1, RideStatus::Published)).await.unwrap();

        let ids: Vec<String> = store
            .query_rides(&query(10))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn query_starts_after_cursor_even_if_cursor_row_is_filtered_out() {
        let store = MemoryStore::new();
        store.put_ride(&ride("a", 1, RideStatus::Published)).await.unwrap();
        store.put_ride(&ride("b", 2, RideStatus::Archived)).await.unwrap();
        store.put_ride(&ride("c", 3, RideStatus::Published)).await.unwrap();

        let page = store
            .query_rides(&RideQuery {
                status: Some(RideStatus::Published),
                after_id: Some("b".to_string()),
                take: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "c");
    }

    #[tokio::test]
    async fn unknown_cursor_yields_nothing() {
        let store = MemoryStore::new();
        store.put_ride(&ride("a", 1, RideStatus::Published)).await.unwrap();

        let page = store
            .query_rides(&RideQuery {
                after_id: Some("zzz".to_string()),
                take: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn closed_range_includes_both_bounds() {
        let store = MemoryStore::new();
        for (id, day) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            store.put_ride(&ride(id, day, RideStatus::Published)).await.unwrap();
        }

        let page = store
            .query_rides(&RideQuery {
                start_from: Some(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap()),
                start_to: Some(Utc.with_ymd_and_hms(2030, 1, 3, 9, 0, 0).unwrap()),
                take: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn put_ride_moves_row_when_start_changes() {
        let store = MemoryStore::new();
        store.put_ride(&ride("a", 1, RideStatus::Published)).await.unwrap();
        store.put_ride(&ride("b", 2, RideStatus::Published)).await.unwrap();

        let mut moved = ride("a", 3, RideStatus::Published);
        moved.title = "Moved".to_string();
        store.put_ride(&moved).await.unwrap();

        assert_eq!(store.ride_count().await, 2);
        let ids: Vec<String> = store
            .query_rides(&query(10))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get_ride("a").await.unwrap().unwrap().title, "Moved");
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryStore::new();
        store.put_ride(&ride("a", 1, RideStatus::Draft)).await.unwrap();
        assert!(store.delete_ride("a").await.unwrap());
        assert!(!store.delete_ride("a").await.unwrap());
        assert!(store.get_ride("a").await.unwrap().is_none());
    }
}
