// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Administrative ride writes: create, update, archive, delete.
//!
//! Updates are fetch-modify-write and are not serialized against
//! concurrent writers or readers.

use crate::db::RideStore;
use crate::error::{AppError, Result};
use crate::models::{NewRide, Ride, RidePatch, RideStatus};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct RideAdminService {
    store: Arc<dyn RideStore>,
}

impl RideAdminService {
    pub fn new(store: Arc<dyn RideStore>) -> Self {
        Self { store }
    }

    /// Create a ride with a fresh time-ordered id.
    pub async fn create(&self, new: NewRide, created_by: &str) -> Result<Ride> {
        let id = uuid::Uuid::now_v7().to_string();
        let ride = Ride::from_new(new, id, created_by.to_string(), Utc::now());
        self.store.put_ride(&ride).await?;

        tracing::info!(
            ride_id = %ride.id,
            status = %ride.status,
            created_by,
            "Ride created"
        );
        Ok(ride)
    }

    /// Apply a partial update.
    pub async fn update(&self, id: &str, patch: RidePatch) -> Result<Ride> {
        let mut ride = self.load(id).await?;
        ride.apply_patch(patch, Utc::now());
        self.store.put_ride(&ride).await?;

        tracing::info!(ride_id = %ride.id, "Ride updated");
        Ok(ride)
    }

    /// Force status to ARCHIVED, leaving every other field as is.
    pub async fn archive(&self, id: &str) -> Result<Ride> {
        let patch = RidePatch {
            status: Some(RideStatus::Archived),
            ..Default::default()
        };
        let mut ride = self.load(id).await?;
        ride.apply_patch(patch, Utc::now());
        self.store.put_ride(&ride).await?;

        tracing::info!(ride_id = %ride.id, "Ride archived");
        Ok(ride)
    }

    /// Physically delete a ride.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete_ride(id).await? {
            return Err(not_found());
        }
        tracing::info!(ride_id = %id, "Ride deleted");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Ride> {
        self.store.get_ride(id).await?.ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Ride not found".to_string())
}
