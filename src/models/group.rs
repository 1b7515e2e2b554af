// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Organizing group model.

use super::ride::OrganizerType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A shop, club or individual that organizes rides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub website_url: Option<String>,
    pub organizer_type: OrganizerType,
    pub region: Option<String>,
    /// Inactive groups are hidden from the public group list
    pub is_active: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at_utc: DateTime<Utc>,
}
