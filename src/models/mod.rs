// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod group;
pub mod ride;

pub use group::Group;
pub use ride::{
    Difficulty, NewRide, OrganizerType, ParseEnumError, Ride, RidePatch, RidePayload, RideStatus,
    RideType,
};
