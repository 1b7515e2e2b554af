// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at a local emulator.
//!
//! The emulator is shared between tests, so every test uses unique ride ids
//! and a far-future date window of its own.

use chrono::{DateTime, Duration, Utc};
use ridebook::db::{RideQuery, RideStore};
use ridebook::models::{Difficulty, Group, OrganizerType, Ride, RideStatus};

mod common;
use common::{parse_time, ride, test_db};

/// Unique suffix for test isolation.
fn unique_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

/// A start time in a year no other test writes to.
fn isolated_start(suffix: u64) -> DateTime<Utc> {
    parse_time("2200-01-01T00:00:00Z") + Duration::days((suffix % 100_000) as i64 * 3)
}

fn window(start: DateTime<Utc>) -> RideQuery {
    RideQuery {
        start_from: Some(start),
        start_to: Some(start + Duration::days(2)),
        take: 100,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ride_round_trip_and_delete() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let mut r = ride(&format!("fs-{suffix}"), isolated_start(suffix));
    r.notes = Some("emulator".to_string());

    assert!(db.get_ride(&r.id).await.unwrap().is_none());
    db.put_ride(&r).await.unwrap();
    assert_eq!(db.get_ride(&r.id).await.unwrap(), Some(r.clone()));

    assert!(db.delete_ride(&r.id).await.unwrap());
    assert!(!db.delete_ride(&r.id).await.unwrap());
    assert!(db.get_ride(&r.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_query_orders_ties_by_id_and_pages_after_cursor() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let start = isolated_start(suffix);

    let rides: Vec<Ride> = vec![
        ride(&format!("{suffix}-c"), start + Duration::hours(1)),
        ride(&format!("{suffix}-b"), start),
        ride(&format!("{suffix}-a"), start),
    ];
    for r in &rides {
        db.put_ride(r).await.unwrap();
    }

    let all = db.query_rides(&window(start)).await.unwrap();
    let ids: Vec<String> = all.iter().map(|r| r.id.clone()).collect();
    assert_eq!(
        ids,
        [
            format!("{suffix}-a"),
            format!("{suffix}-b"),
            format!("{suffix}-c")
        ]
    );

    let after_a = RideQuery {
        after_id: Some(format!("{suffix}-a")),
        take: 1,
        ..window(start)
    };
    let next = db.query_rides(&after_a).await.unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].id, format!("{suffix}-b"));

    let unknown = RideQuery {
        after_id: Some(format!("{suffix}-missing")),
        ..window(start)
    };
    assert!(db.query_rides(&unknown).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_equality_filters() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let start = isolated_start(suffix);

    let mut hard = ride(&format!("{suffix}-hard"), start);
    hard.difficulty = Difficulty::Hard;
    let mut draft = ride(&format!("{suffix}-draft"), start);
    draft.status = RideStatus::Draft;
    db.put_ride(&hard).await.unwrap();
    db.put_ride(&draft).await.unwrap();

    let query = RideQuery {
        difficulty: Some(Difficulty::Hard),
        ..window(start)
    };
    let found = db.query_rides(&query).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, hard.id);

    let query = RideQuery {
        status: Some(RideStatus::Published),
        ..window(start)
    };
    let found = db.query_rides(&query).await.unwrap();
    assert!(found.iter().all(|r| r.status == RideStatus::Published));
    assert!(found.iter().any(|r| r.id == hard.id));
    assert!(!found.iter().any(|r| r.id == draft.id));
}

#[tokio::test]
async fn test_seeded_groups_listed_by_name() {
    require_emulator!();

    let db = test_db().await;
    ridebook::services::seed::seed_demo_data(&db, Utc::now())
        .await
        .unwrap();

    let groups = db.list_active_groups().await.unwrap();
    assert!(groups.len() >= 3);
    assert!(groups.windows(2).all(|w| w[0].name <= w[1].name));
    assert!(groups.iter().all(|g| g.is_active));
}

#[tokio::test]
async fn test_inactive_group_not_listed() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let group = Group {
        id: format!("inactive-{suffix}"),
        name: format!("Inactive {suffix}"),
        website_url: None,
        organizer_type: OrganizerType::Shop,
        region: None,
        is_active: false,
        created_at_utc: Utc::now(),
    };
    db.put_group(&group).await.unwrap();

    let groups = db.list_active_groups().await.unwrap();
    assert!(!groups.iter().any(|g| g.id == group.id));
}
