// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo groups and rides for local development.

use crate::db::RideStore;
use crate::error::AppError;
use crate::models::{Difficulty, Group, OrganizerType, Ride, RideStatus, RideType};
use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};

const MAX_CONCURRENT_WRITES: usize = 8;

/// Counts of seeded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: usize,
    pub rides: usize,
}

/// Three demo organizers, one of each organizer type.
pub fn demo_groups(now: DateTime<Utc>) -> Vec<Group> {
    [
        ("demo-group-shop", "City Bike Shop", "https://citybikeshop.example.com", OrganizerType::Shop),
        ("demo-group-club", "Metro Cycling Club", "https://metrocycling.example.com", OrganizerType::Group),
        ("demo-group-solo", "Solo Adventurer", "https://solo.example.com", OrganizerType::Individual),
    ]
    .into_iter()
    .map(|(id, name, url, organizer_type)| Group {
        id: id.to_string(),
        name: name.to_string(),
        website_url: Some(url.to_string()),
        organizer_type,
        region: Some("Metro".to_string()),
        is_active: true,
        created_at_utc: now,
    })
    .collect()
}

/// Demo rides scheduled relative to `now`, including one past ride and one draft.
pub fn demo_rides(now: DateTime<Utc>) -> Vec<Ride> {
    let ride = |id: &str,
                title: &str,
                group: &str,
                start: DateTime<Utc>,
                meetup: (&str, &str),
                route: (&str, &str),
                kind: (Difficulty, RideType, OrganizerType),
                status: RideStatus,
                notes: &str| Ride {
        id: id.to_string(),
        title: title.to_string(),
        group: group.to_string(),
        start_date_time_utc: start,
        timezone: "America/New_York".to_string(),
        meetup_location_short: meetup.0.to_string(),
        meetup_location_full: Some(meetup.1.to_string()),
        route_url: route.0.to_string(),
        route_platform: Some(route.1.to_string()),
        difficulty: kind.0,
        ride_type: kind.1,
        organizer_type: kind.2,
        status,
        event_url: None,
        notes: Some(notes.to_string()),
        created_by_user_id: "seed".to_string(),
        created_at_utc: now,
        updated_at_utc: now,
    };

    vec![
        ride(
            "demo-ride-road-blast",
            "Saturday Road Blast",
            "City Bike Shop",
            now + Duration::days(2),
            ("Shop Main Entrance", "123 Main St, Metro City"),
            ("https://ridewithgps.com/routes/123456", "RIDEWITHGPS"),
            (Difficulty::Intermediate, RideType::Road, OrganizerType::Shop),
            RideStatus::Published,
            "Helmets required. Coffee after ride.",
        ),
        ride(
            "demo-ride-gravel-adventure",
            "Sunday Gravel Adventure",
            "Metro Cycling Club",
            now + Duration::days(3),
            ("Gravel Lot", "456 Gravel Rd, Metro City"),
            ("https://strava.com/routes/654321", "STRAVA"),
            (Difficulty::Hard, RideType::Gravel, OrganizerType::Group),
            RideStatus::Published,
            "Bring extra water. No drop ride.",
        ),
        ride(
            "demo-ride-mtb-social",
            "Weekday MTB Social",
            "Metro Cycling Club",
            now + Duration::days(5),
            ("Trailhead Parking", "789 Forest Ave, Metro City"),
            ("https://trailforks.com/route/987654", "TRAILFORKS"),
            (Difficulty::Easy, RideType::Mtb, OrganizerType::Group),
            RideStatus::Published,
            "Beginner friendly. Lights recommended.",
        ),
        ride(
            "demo-ride-solo-century",
            "Solo Century Attempt",
            "Solo Adventurer",
            now + Duration::days(10),
            ("Town Square", "1 Square Pl, Metro City"),
            ("https://ridewithgps.com/routes/222333", "RIDEWITHGPS"),
            (Difficulty::Hard, RideType::Road, OrganizerType::Individual),
            RideStatus::Draft,
            "Route still being finalized.",
        ),
        ride(
            "demo-ride-last-week",
            "Last Week's Shop Spin",
            "City Bike Shop",
            now - Duration::days(7),
            ("Shop Main Entrance", "123 Main St, Metro City"),
            ("https://ridewithgps.com/routes/111222", "RIDEWITHGPS"),
            (Difficulty::Easy, RideType::Road, OrganizerType::Shop),
            RideStatus::Archived,
            "Thanks to everyone who came out.",
        ),
    ]
}

/// Write the demo groups and rides. Existing records with the same ids are replaced.
pub async fn seed_demo_data(store: &dyn RideStore, now: DateTime<Utc>) -> Result<SeedSummary, AppError> {
    let groups = demo_groups(now);
    let rides = demo_rides(now);

    stream::iter(groups.iter())
        .map(|group| store.put_group(group))
        .buffer_unordered(MAX_CONCURRENT_WRITES)
        .try_collect::<Vec<()>>()
        .await?;

    stream::iter(rides.iter())
        .map(|ride| store.put_ride(ride))
        .buffer_unordered(MAX_CONCURRENT_WRITES)
        .try_collect::<Vec<()>>()
        .await?;

    let summary = SeedSummary {
        groups: groups.len(),
        rides: rides.len(),
    };
    tracing::info!(groups = summary.groups, rides = summary.rides, "Seeded demo data");
    Ok(summary)
}
