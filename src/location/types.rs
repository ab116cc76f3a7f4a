//! Core types for the resolution pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the globe in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude within -90..=90 and longitude within -180..=180.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Renders as `48.8566°N, 2.3522°E`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Where a resolved zone id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneSource {
    /// The timezone collaborator named the zone.
    Provider,
    /// Derived from the GMT offset through the offset table.
    OffsetTable,
}

impl fmt::Display for ZoneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::OffsetTable => write!(f, "offset table"),
        }
    }
}

/// Result of a successful time-zone resolution.
///
/// There is no "zone-less" variant: when neither the collaborator nor the
/// offset table yields a zone id the resolution fails instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeZoneInfo {
    pub zone_id: String,
    /// Long display name, e.g. "Eastern Standard Time".
    pub zone_name: String,
    /// Wall-clock time in the zone, e.g. "12/25/2024, 3:04:05 PM".
    pub local_time: String,
    /// Raw offset in hours, when the collaborator supplied one.
    pub gmt_offset: Option<f64>,
    pub zone_source: ZoneSource,
}

/// Sunrise and sunset for one coordinate, zone and calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaylightInfo {
    /// e.g. "7:43:21 AM"
    pub sunrise: String,
    pub sunset: String,
    pub date: NaiveDate,
    pub zone_id: String,
}

/// Errors raised inside the pipeline. Resolvers contain these and hand
/// `None` to their callers; they never reach the presentation layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("no geocoding match for '{0}'")]
    NotFound(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("no zone id supplied and offset {} has no table entry", fmt_offset(.0))]
    AmbiguousOffset(Option<f64>),
    #[error("unknown time zone '{0}'")]
    UnknownZone(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

fn fmt_offset(offset: &Option<f64>) -> String {
    match offset {
        Some(o) => o.to_string(),
        None => "(none)".into(),
    }
}

impl From<ureq::Error> for ResolveError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => Self::UpstreamUnavailable(format!("HTTP {}", code)),
            ureq::Error::Transport(t) => Self::Transport(t.to_string()),
        }
    }
}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

/// Why a session command did not produce a result. One message per stage;
/// raw transport errors never surface here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    EmptyQuery,
    InvalidCoordinate,
    LocationNotFound,
    LocalTimeUnavailable,
    DaylightUnavailable,
    NotReady,
}

impl FailureReason {
    /// Key used to look the message up in a translation map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "enter_location",
            Self::InvalidCoordinate => "invalid_coordinate",
            Self::LocationNotFound => "location_not_found",
            Self::LocalTimeUnavailable => "local_time_failed",
            Self::DaylightUnavailable => "daylight_failed",
            Self::NotReady => "no_location",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "please enter a valid location"),
            Self::InvalidCoordinate => write!(f, "invalid coordinates (lat -90..90, lng -180..180)"),
            Self::LocationNotFound => write!(f, "location not found"),
            Self::LocalTimeUnavailable => write!(f, "could not determine local time"),
            Self::DaylightUnavailable => write!(f, "could not determine sunrise/sunset"),
            Self::NotReady => write!(f, "no location selected yet"),
        }
    }
}

impl std::error::Error for FailureReason {}
