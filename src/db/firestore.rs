// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides the production `RideStore`:
//! - Rides (one document per ride, keyed by ride id)
//! - Groups (one document per group)
//!
//! The ride listing query filters on the enum fields and on
//! `start_date_time_utc`, ordered by `(start_date_time_utc, id)`. Firestore
//! needs a composite index per filter combination for this.

use super::{collections, RideQuery, RideStore};
use crate::error::AppError;
use crate::models::{Difficulty, Group, OrganizerType, Ride, RideStatus, RideType};
use crate::time_utils::{format_sortable_utc, parse_instant};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::{FirestoreQueryCursor, FirestoreQueryDirection};
use serde::{Deserialize, Serialize};

/// Stored ride document.
///
/// Timestamps are fixed-width RFC3339 strings so that string order is
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RideDocument {
    id: String,
    title: String,
    group: String,
    start_date_time_utc: String,
    timezone: String,
    meetup_location_short: String,
    meetup_location_full: Option<String>,
    route_url: String,
    route_platform: Option<String>,
    difficulty: Difficulty,
    ride_type: RideType,
    organizer_type: OrganizerType,
    status: RideStatus,
    event_url: Option<String>,
    notes: Option<String>,
    created_by_user_id: String,
    created_at_utc: String,
    updated_at_utc: String,
}

impl From<&Ride> for RideDocument {
    fn from(ride: &Ride) -> Self {
        Self {
            id: ride.id.clone(),
            title: ride.title.clone(),
            group: ride.group.clone(),
            start_date_time_utc: format_sortable_utc(ride.start_date_time_utc),
            timezone: ride.timezone.clone(),
            meetup_location_short: ride.meetup_location_short.clone(),
            meetup_location_full: ride.meetup_location_full.clone(),
            route_url: ride.route_url.clone(),
            route_platform: ride.route_platform.clone(),
            difficulty: ride.difficulty,
            ride_type: ride.ride_type,
            organizer_type: ride.organizer_type,
            status: ride.status,
            event_url: ride.event_url.clone(),
            notes: ride.notes.clone(),
            created_by_user_id: ride.created_by_user_id.clone(),
            created_at_utc: format_sortable_utc(ride.created_at_utc),
            updated_at_utc: format_sortable_utc(ride.updated_at_utc),
        }
    }
}

impl TryFrom<RideDocument> for Ride {
    type Error = AppError;

    fn try_from(doc: RideDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            start_date_time_utc: stored_instant(&doc.id, &doc.start_date_time_utc)?,
            created_at_utc: stored_instant(&doc.id, &doc.created_at_utc)?,
            updated_at_utc: stored_instant(&doc.id, &doc.updated_at_utc)?,
            id: doc.id,
            title: doc.title,
            group: doc.group,
            timezone: doc.timezone,
            meetup_location_short: doc.meetup_location_short,
            meetup_location_full: doc.meetup_location_full,
            route_url: doc.route_url,
            route_platform: doc.route_platform,
            difficulty: doc.difficulty,
            ride_type: doc.ride_type,
            organizer_type: doc.organizer_type,
            status: doc.status,
            event_url: doc.event_url,
            notes: doc.notes,
            created_by_user_id: doc.created_by_user_id,
        })
    }
}

fn stored_instant(id: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_instant(raw).ok_or_else(|| {
        AppError::StoreUnavailable(format!("Ride {id} has malformed timestamp {raw:?}"))
    })
}

/// Stored group document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GroupDocument {
    id: String,
    name: String,
    website_url: Option<String>,
    organizer_type: OrganizerType,
    region: Option<String>,
    is_active: bool,
    created_at_utc: String,
}

impl From<&Group> for GroupDocument {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            website_url: group.website_url.clone(),
            organizer_type: group.organizer_type,
            region: group.region.clone(),
            is_active: group.is_active,
            created_at_utc: format_sortable_utc(group.created_at_utc),
        }
    }
}

impl TryFrom<GroupDocument> for Group {
    type Error = AppError;

    fn try_from(doc: GroupDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at_utc: stored_instant(&doc.id, &doc.created_at_utc)?,
            id: doc.id,
            name: doc.name,
            website_url: doc.website_url,
            organizer_type: doc.organizer_type,
            region: doc.region,
            is_active: doc.is_active,
        })
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// Every operation fails with `StoreUnavailable`.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::StoreUnavailable("Database not connected (offline mode)".to_string())
        })
    }

    async fn get_ride_document(&self, id: &str) -> Result<Option<RideDocument>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RIDES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl RideStore for FirestoreDb {
    async fn query_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, AppError> {
        let client = self.get_client()?;

        // Resolve the cursor id to its sort key; a vanished cursor ends the stream.
        let start_after = match &query.after_id {
            Some(id) => match self.get_ride_document(id).await? {
                Some(doc) => Some((doc.start_date_time_utc, doc.id)),
                None => {
                    tracing::debug!(cursor = %id, "Cursor ride not found");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let difficulty = query.difficulty.map(Difficulty::as_str);
        let ride_type = query.ride_type.map(RideType::as_str);
        let organizer_type = query.organizer_type.map(OrganizerType::as_str);
        let status = query.status.map(RideStatus::as_str);
        let start_from = query.start_from.map(format_sortable_utc);
        let start_to = query.start_to.map(format_sortable_utc);

        let select = client
            .fluent()
            .select()
            .from(collections::RIDES)
            .filter(move |q| {
                q.for_all([
                    difficulty.and_then(|v| q.field("difficulty").eq(v)),
                    ride_type.and_then(|v| q.field("ride_type").eq(v)),
                    organizer_type.and_then(|v| q.field("organizer_type").eq(v)),
                    status.and_then(|v| q.field("status").eq(v)),
                    start_from
                        .clone()
                        .and_then(|v| q.field("start_date_time_utc").greater_than_or_equal(v)),
                    start_to
                        .clone()
                        .and_then(|v| q.field("start_date_time_utc").less_than_or_equal(v)),
                ])
            })
            .order_by([
                ("start_date_time_utc", FirestoreQueryDirection::Ascending),
                ("id", FirestoreQueryDirection::Ascending),
            ]);

        let select = match start_after {
            Some((start, id)) => {
                select.start_at(FirestoreQueryCursor::AfterValue(vec![start.into(), id.into()]))
            }
            None => select,
        };

        let docs: Vec<RideDocument> = select
            .limit(query.take as u32)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        docs.into_iter().map(Ride::try_from).collect()
    }

    async fn get_ride(&self, id: &str) -> Result<Option<Ride>, AppError> {
        self.get_ride_document(id)
            .await?
            .map(Ride::try_from)
            .transpose()
    }

    async fn put_ride(&self, ride: &Ride) -> Result<(), AppError> {
        let doc = RideDocument::from(ride);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RIDES)
            .document_id(&ride.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete_ride(&self, id: &str) -> Result<bool, AppError> {
        if self.get_ride_document(id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RIDES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(true)
    }

    async fn list_active_groups(&self) -> Result<Vec<Group>, AppError> {
        let docs: Vec<GroupDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GROUPS)
            .filter(|q| q.for_all([q.field("is_active").eq(true)]))
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        docs.into_iter().map(Group::try_from).collect()
    }

    async fn put_group(&self, group: &Group) -> Result<(), AppError> {
        let doc = GroupDocument::from(group);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GROUPS)
            .document_id(&group.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), AppError> {
        if self.client.is_some() {
            tracing::info!("Closing Firestore connection");
        }
        Ok(())
    }
}
