// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ride model, its closed enumerations, and admin write payloads.

use crate::time_utils::parse_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Error for a value outside an enumeration's closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field}")]
pub struct ParseEnumError {
    /// API field name (camelCase)
    pub field: &'static str,
    pub value: String,
}

/// Declares an enumeration whose wire form is the upper-case variant name.
/// Parsing is exact and case-sensitive.
macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[cfg_attr(feature = "binding-generation", derive(TS))]
        #[cfg_attr(
            feature = "binding-generation",
            ts(export, export_to = "web/src/lib/generated/")
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum!(
    /// How demanding a ride is.
    Difficulty, "difficulty", {
        Easy => "EASY",
        Intermediate => "INTERMEDIATE",
        Hard => "HARD",
    }
);

closed_enum!(
    /// Surface / bike type.
    RideType, "rideType", {
        Road => "ROAD",
        Mtb => "MTB",
        Gravel => "GRAVEL",
    }
);

closed_enum!(
    /// Kind of entity organizing a ride or group.
    OrganizerType, "organizerType", {
        Shop => "SHOP",
        Group => "GROUP",
        Individual => "INDIVIDUAL",
    }
);

closed_enum!(
    /// Publication lifecycle of a ride.
    RideStatus, "status", {
        Draft => "DRAFT",
        Published => "PUBLISHED",
        Archived => "ARCHIVED",
    }
);

/// A published (or draft/archived) group ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Ride {
    /// Unique, immutable id. Doubles as the pagination cursor.
    pub id: String,
    pub title: String,
    /// Free-text name of the organizing group
    pub group: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date_time_utc: DateTime<Utc>,
    /// IANA timezone name, display hint only
    pub timezone: String,
    pub meetup_location_short: String,
    pub meetup_location_full: Option<String>,
    pub route_url: String,
    /// e.g. "STRAVA", "RIDEWITHGPS"
    pub route_platform: Option<String>,
    pub difficulty: Difficulty,
    pub ride_type: RideType,
    pub organizer_type: OrganizerType,
    pub status: RideStatus,
    pub event_url: Option<String>,
    pub notes: Option<String>,
    pub created_by_user_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at_utc: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub updated_at_utc: DateTime<Utc>,
}

impl Ride {
    /// Build a new ride from a validated create request.
    pub fn from_new(new: NewRide, id: String, created_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            group: new.group,
            start_date_time_utc: new.start_date_time_utc,
            timezone: new.timezone,
            meetup_location_short: new.meetup_location_short,
            meetup_location_full: new.meetup_location_full,
            route_url: new.route_url,
            route_platform: new.route_platform,
            difficulty: new.difficulty,
            ride_type: new.ride_type,
            organizer_type: new.organizer_type,
            status: new.status,
            event_url: new.event_url,
            notes: new.notes,
            created_by_user_id: created_by,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    /// Canonical listing order key.
    pub fn sort_key(&self) -> (DateTime<Utc>, &str) {
        (self.start_date_time_utc, self.id.as_str())
    }

    /// Apply a validated partial update. The id never changes.
    pub fn apply_patch(&mut self, patch: RidePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.group {
            self.group = v;
        }
        if let Some(v) = patch.start_date_time_utc {
            self.start_date_time_utc = v;
        }
        if let Some(v) = patch.timezone {
            self.timezone = v;
        }
        if let Some(v) = patch.meetup_location_short {
            self.meetup_location_short = v;
        }
        if let Some(v) = patch.meetup_location_full {
            self.meetup_location_full = v;
        }
        if let Some(v) = patch.route_url {
            self.route_url = v;
        }
        if let Some(v) = patch.route_platform {
            self.route_platform = v;
        }
        if let Some(v) = patch.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = patch.ride_type {
            self.ride_type = v;
        }
        if let Some(v) = patch.organizer_type {
            self.organizer_type = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.event_url {
            self.event_url = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
        self.updated_at_utc = now;
    }
}

/// Validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRide {
    pub title: String,
    pub group: String,
    pub start_date_time_utc: DateTime<Utc>,
    pub timezone: String,
    pub meetup_location_short: String,
    pub meetup_location_full: Option<String>,
    pub route_url: String,
    pub route_platform: Option<String>,
    pub difficulty: Difficulty,
    pub ride_type: RideType,
    pub organizer_type: OrganizerType,
    pub status: RideStatus,
    pub event_url: Option<String>,
    pub notes: Option<String>,
}

/// Validated partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidePatch {
    pub title: Option<String>,
    pub group: Option<String>,
    pub start_date_time_utc: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
    pub meetup_location_short: Option<String>,
    pub meetup_location_full: Option<Option<String>>,
    pub route_url: Option<String>,
    pub route_platform: Option<Option<String>>,
    pub difficulty: Option<Difficulty>,
    pub ride_type: Option<RideType>,
    pub organizer_type: Option<OrganizerType>,
    pub status: Option<RideStatus>,
    pub event_url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Admin write body as received. Every field is optional here so that all
/// problems can be reported together; see [`RidePayload::into_new_ride`]
/// and [`RidePayload::into_patch`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RidePayload {
    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 200, message = "group must be at most 200 characters"))]
    pub group: Option<String>,
    pub start_date_time_utc: Option<String>,
    pub timezone: Option<String>,
    pub meetup_location_short: Option<String>,
    pub meetup_location_full: Option<String>,
    #[validate(custom(function = "validate_route_url"))]
    pub route_url: Option<String>,
    pub route_platform: Option<String>,
    pub difficulty: Option<String>,
    pub ride_type: Option<String>,
    pub organizer_type: Option<String>,
    pub status: Option<String>,
    #[validate(custom(function = "validate_event_url"))]
    pub event_url: Option<String>,
    #[validate(length(max = 2000, message = "notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

impl RidePayload {
    /// Validate a create request. Required fields must be present and non-empty.
    pub fn into_new_ride(self) -> Result<NewRide, Vec<String>> {
        let mut errors = Vec::new();

        let title = required(&self.title, "title", &mut errors);
        let group = required(&self.group, "group", &mut errors);
        let start_raw = required(&self.start_date_time_utc, "startDateTimeUtc", &mut errors);
        let timezone = required(&self.timezone, "timezone", &mut errors);
        let meetup_short = required(&self.meetup_location_short, "meetupLocationShort", &mut errors);
        let route_url = required(&self.route_url, "routeUrl", &mut errors);
        let difficulty_raw = required(&self.difficulty, "difficulty", &mut errors);
        let ride_type_raw = required(&self.ride_type, "rideType", &mut errors);
        let organizer_raw = required(&self.organizer_type, "organizerType", &mut errors);

        let start = start_raw.and_then(|raw| parse_start(raw, &mut errors));
        let difficulty = difficulty_raw.and_then(|raw| parse_enum::<Difficulty>(raw, &mut errors));
        let ride_type = ride_type_raw.and_then(|raw| parse_enum::<RideType>(raw, &mut errors));
        let organizer_type =
            organizer_raw.and_then(|raw| parse_enum::<OrganizerType>(raw, &mut errors));
        let status = match non_empty(&self.status) {
            Some(raw) => parse_enum::<RideStatus>(raw, &mut errors),
            None => Some(RideStatus::Published),
        };

        errors.extend(self.field_errors());

        match (
            title,
            group,
            start,
            timezone,
            meetup_short,
            route_url,
            difficulty,
            ride_type,
            organizer_type,
            status,
        ) {
            (
                Some(title),
                Some(group),
                Some(start),
                Some(timezone),
                Some(meetup_short),
                Some(route_url),
                Some(difficulty),
                Some(ride_type),
                Some(organizer_type),
                Some(status),
            ) if errors.is_empty() => Ok(NewRide {
                title: title.to_string(),
                group: group.to_string(),
                start_date_time_utc: start,
                timezone: timezone.to_string(),
                meetup_location_short: meetup_short.to_string(),
                meetup_location_full: optional(self.meetup_location_full),
                route_url: route_url.to_string(),
                route_platform: optional(self.route_platform),
                difficulty,
                ride_type,
                organizer_type,
                status,
                event_url: optional(self.event_url),
                notes: optional(self.notes),
            }),
            _ => Err(errors),
        }
    }

    /// Validate a partial update. Absent fields are left unchanged.
    pub fn into_patch(self) -> Result<RidePatch, Vec<String>> {
        let mut errors = Vec::new();

        let title = present(&self.title, "title", &mut errors);
        let group = present(&self.group, "group", &mut errors);
        let timezone = present(&self.timezone, "timezone", &mut errors);
        let meetup_short = present(&self.meetup_location_short, "meetupLocationShort", &mut errors);
        let route_url = present(&self.route_url, "routeUrl", &mut errors);

        let start = present(&self.start_date_time_utc, "startDateTimeUtc", &mut errors)
            .and_then(|raw| parse_start(&raw, &mut errors));
        let difficulty = present(&self.difficulty, "difficulty", &mut errors)
            .and_then(|raw| parse_enum::<Difficulty>(&raw, &mut errors));
        let ride_type = present(&self.ride_type, "rideType", &mut errors)
            .and_then(|raw| parse_enum::<RideType>(&raw, &mut errors));
        let organizer_type = present(&self.organizer_type, "organizerType", &mut errors)
            .and_then(|raw| parse_enum::<OrganizerType>(&raw, &mut errors));
        let status = present(&self.status, "status", &mut errors)
            .and_then(|raw| parse_enum::<RideStatus>(&raw, &mut errors));

        errors.extend(self.field_errors());

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RidePatch {
            title,
            group,
            start_date_time_utc: start,
            timezone,
            meetup_location_short: meetup_short,
            meetup_location_full: self.meetup_location_full.map(|v| optional(Some(v))),
            route_url,
            route_platform: self.route_platform.map(|v| optional(Some(v))),
            difficulty,
            ride_type,
            organizer_type,
            status,
            event_url: self.event_url.map(|v| optional(Some(v))),
            notes: self.notes.map(|v| optional(Some(v))),
        })
    }

    /// Messages from the derived field rules, in a stable order.
    fn field_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => validation_messages(&errors),
        }
    }
}

fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("invalid {field}"),
            })
        })
        .collect();
    messages.sort();
    messages
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &str, errors: &mut Vec<String>) -> Option<&'a str> {
    let found = non_empty(value);
    if found.is_none() {
        errors.push(format!("{name} required"));
    }
    found
}

/// For patches: a present field must not be blank.
fn present(value: &Option<String>, name: &str, errors: &mut Vec<String>) -> Option<String> {
    let raw = value.as_deref()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(format!("{name} must not be empty"));
        return None;
    }
    Some(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_enum<T: FromStr<Err = ParseEnumError>>(raw: &str, errors: &mut Vec<String>) -> Option<T> {
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

fn parse_start(raw: &str, errors: &mut Vec<String>) -> Option<DateTime<Utc>> {
    let parsed = parse_instant(raw);
    if parsed.is_none() {
        errors.push("Invalid startDateTimeUtc".to_string());
    }
    parsed
}

fn is_http_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn validate_route_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || is_http_url(value) {
        return Ok(());
    }
    Err(ValidationError::new("url").with_message(Cow::Borrowed("routeUrl must be URL")))
}

fn validate_event_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || is_http_url(value) {
        return Ok(());
    }
    Err(ValidationError::new("url").with_message(Cow::Borrowed("eventUrl must be URL")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> RidePayload {
        RidePayload {
            title: Some("Saturday Road Blast".to_string()),
            group: Some("City Bike Shop".to_string()),
            start_date_time_utc: Some("2030-05-04T14:00:00Z".to_string()),
            timezone: Some("America/New_York".to_string()),
            meetup_location_short: Some("Shop Main Entrance".to_string()),
            route_url: Some("https://ridewithgps.com/routes/123456".to_string()),
            difficulty: Some("INTERMEDIATE".to_string()),
            ride_type: Some("ROAD".to_string()),
            organizer_type: Some("SHOP".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn enums_parse_exactly() {
        assert_eq!("EASY".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("MTB".parse::<RideType>(), Ok(RideType::Mtb));
        assert_eq!("INDIVIDUAL".parse::<OrganizerType>(), Ok(OrganizerType::Individual));
        assert_eq!("ARCHIVED".parse::<RideStatus>(), Ok(RideStatus::Archived));

        let err = "easy".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid difficulty");
        assert!("BMX".parse::<RideType>().is_err());
    }

    #[test]
    fn enums_serialize_as_upper_case() {
        assert_eq!(serde_json::to_string(&RideType::Gravel).unwrap(), "\"GRAVEL\"");
        assert_eq!(
            serde_json::from_str::<RideStatus>("\"PUBLISHED\"").unwrap(),
            RideStatus::Published
        );
        assert!(serde_json::from_str::<RideStatus>("\"LIVE\"").is_err());
        assert_eq!(Difficulty::ALL.len(), 3);
    }

    #[test]
    fn create_defaults_status_to_published() {
        let new = full_payload().into_new_ride().expect("valid payload");
        assert_eq!(new.status, RideStatus::Published);
        assert_eq!(new.difficulty, Difficulty::Intermediate);
        assert_eq!(new.meetup_location_full, None);
    }

    #[test]
    fn create_reports_all_errors() {
        let payload = RidePayload {
            title: Some("  ".to_string()),
            difficulty: Some("EXTREME".to_string()),
            route_url: Some("ftp://example.com/route".to_string()),
            event_url: Some("example.com".to_string()),
            start_date_time_utc: Some("next tuesday".to_string()),
            ..full_payload()
        };

        let errors = payload.into_new_ride().unwrap_err();
        assert!(errors.contains(&"title required".to_string()));
        assert!(errors.contains(&"Invalid difficulty".to_string()));
        assert!(errors.contains(&"Invalid startDateTimeUtc".to_string()));
        assert!(errors.contains(&"routeUrl must be URL".to_string()));
        assert!(errors.contains(&"eventUrl must be URL".to_string()));
    }

    #[test]
    fn create_rejects_long_title() {
        let payload = RidePayload {
            title: Some("a".repeat(201)),
            ..full_payload()
        };
        let errors = payload.into_new_ride().unwrap_err();
        assert_eq!(errors, vec!["title must be at most 200 characters".to_string()]);
    }

    #[test]
    fn patch_clears_optional_fields_and_rejects_blank_required() {
        let patch = RidePayload {
            notes: Some(String::new()),
            status: Some("DRAFT".to_string()),
            ..Default::default()
        }
        .into_patch()
        .expect("valid patch");
        assert_eq!(patch.notes, Some(None));
        assert_eq!(patch.status, Some(RideStatus::Draft));
        assert_eq!(patch.title, None);

        let errors = RidePayload {
            title: Some(String::new()),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert_eq!(errors, vec!["title must not be empty".to_string()]);
    }

    #[test]
    fn apply_patch_keeps_id_and_touches_updated_at() {
        let created = chrono::DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = created + chrono::Duration::hours(1);
        let new = full_payload().into_new_ride().unwrap();
        let mut ride = Ride::from_new(new, "ride-1".to_string(), "admin".to_string(), created);

        ride.apply_patch(
            RidePatch {
                title: Some("Renamed".to_string()),
                notes: Some(Some("Lights required".to_string())),
                ..Default::default()
            },
            later,
        );

        assert_eq!(ride.id, "ride-1");
        assert_eq!(ride.title, "Renamed");
        assert_eq!(ride.notes.as_deref(), Some("Lights required"));
        assert_eq!(ride.created_at_utc, created);
        assert_eq!(ride.updated_at_utc, later);
    }
}
