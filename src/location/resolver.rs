//! The three pipeline stages: coordinate → timezone → daylight.
//!
//! Each resolver makes a single collaborator call with no retries. `resolve`
//! logs any failure and yields `None`; `try_resolve` exposes the reason.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::format;
use super::offsets;
use super::providers::Backend;
use super::types::{Coordinate, DaylightInfo, ResolveError, TimeZoneInfo, ZoneSource};

/// Source of "now". Swapped out in tests.
pub type Clock = fn() -> DateTime<Utc>;

/// Free-text place name → coordinate. First match wins.
pub struct CoordinateResolver<B> {
    backend: B,
}

impl<B: Backend> CoordinateResolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn resolve(&self, query: &str) -> Option<Coordinate> {
        self.try_resolve(query)
            .map_err(|e| tracing::warn!(query, error = %e, "coordinate resolution failed"))
            .ok()
    }

    pub fn try_resolve(&self, query: &str) -> Result<Coordinate, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::NotFound(String::new()));
        }
        let reply = self.backend.geocode(query)?;
        reply
            .results
            .first()
            .map(|c| c.coordinate())
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }
}

/// Coordinate → zone id, zone name and current local time.
pub struct TimeZoneResolver<B> {
    backend: B,
    clock: Clock,
}

impl<B: Backend> TimeZoneResolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, clock: Utc::now }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn resolve(&self, at: Coordinate) -> Option<TimeZoneInfo> {
        self.try_resolve(at)
            .map_err(|e| tracing::warn!(%at, error = %e, "time zone resolution failed"))
            .ok()
    }

    pub fn try_resolve(&self, at: Coordinate) -> Result<TimeZoneInfo, ResolveError> {
        let reply = self.backend.timezone(at)?;
        if !reply.is_ok() {
            return Err(ResolveError::UpstreamUnavailable(format!("timezone status '{}'", reply.status)));
        }
        let fields = reply.results.unwrap_or_default();

        let (zone_id, zone_source) = match (fields.timezone_id, fields.gmt_offset) {
            (Some(id), _) if !id.trim().is_empty() => (id, ZoneSource::Provider),
            (_, Some(offset)) => match offsets::lookup(offset) {
                Some(id) => (id.to_string(), ZoneSource::OffsetTable),
                None => return Err(ResolveError::AmbiguousOffset(Some(offset))),
            },
            (_, None) => return Err(ResolveError::AmbiguousOffset(None)),
        };
        let tz = format::parse_zone(&zone_id)?;

        tracing::debug!(%at, zone = %zone_id, source = %zone_source, "time zone resolved");

        // Clock is read once the reply is in.
        let now = (self.clock)();

        Ok(TimeZoneInfo {
            local_time: format::local_date_time(&now, tz),
            zone_name: format::zone_long_name(&now, tz),
            zone_id,
            gmt_offset: fields.gmt_offset,
            zone_source,
        })
    }
}

/// Coordinate + zone + date → sunrise and sunset in local time.
pub struct DayLightResolver<B> {
    backend: B,
}

impl<B: Backend> DayLightResolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn resolve(&self, at: Coordinate, zone_id: &str, date: Option<NaiveDate>) -> Option<DaylightInfo> {
        self.try_resolve(at, zone_id, date)
            .map_err(|e| tracing::warn!(%at, zone_id, error = %e, "sunrise/sunset resolution failed"))
            .ok()
    }

    /// `date` defaults to today's local calendar date.
    pub fn try_resolve(
        &self,
        at: Coordinate,
        zone_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<DaylightInfo, ResolveError> {
        let tz = format::parse_zone(zone_id)?;
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let reply = self.backend.sunrise_sunset(at, date)?;
        if !reply.is_ok() {
            return Err(ResolveError::UpstreamUnavailable(format!(
                "sunrise-sunset status '{}'",
                reply.status
            )));
        }
        let fields = reply
            .results
            .ok_or_else(|| ResolveError::InvalidResponse("missing sunrise/sunset results".into()))?;

        Ok(DaylightInfo {
            sunrise: format::time_of_day(&fields.sunrise, tz),
            sunset: format::time_of_day(&fields.sunset, tz),
            date,
            zone_id: zone_id.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory backend for pipeline tests.

    use std::cell::RefCell;

    use chrono::NaiveDate;
    use serde_json::json;

    use crate::location::providers::{Backend, DaylightReply, GeocodeReply, TimezoneReply};
    use crate::location::types::{Coordinate, ResolveError};

    /// A canned reply per collaborator plus a log of every call made.
    pub struct FakeBackend {
        pub geocode: Result<GeocodeReply, ResolveError>,
        pub timezone: Result<TimezoneReply, ResolveError>,
        pub daylight: Result<DaylightReply, ResolveError>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeBackend {
        /// Paris, Europe/Paris, a winter day.
        pub fn paris() -> Self {
            Self {
                geocode: Ok(serde_json::from_value(json!({"results": [{"lat": 48.8566, "lng": 2.3522}]})).unwrap()),
                timezone: Ok(
                    serde_json::from_value(json!({"status": "OK", "results": {"timezoneId": "Europe/Paris"}}))
                        .unwrap(),
                ),
                daylight: DaylightReply::from_json(json!({
                    "status": "OK",
                    "results": {"sunrise": "2024-12-25T07:43:21+00:00", "sunset": "2024-12-25T16:03:55+00:00"}
                })),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn with_geocode(mut self, body: serde_json::Value) -> Self {
            self.geocode = Ok(serde_json::from_value(body).unwrap());
            self
        }

        pub fn with_timezone(mut self, body: serde_json::Value) -> Self {
            self.timezone = Ok(serde_json::from_value(body).unwrap());
            self
        }

        pub fn with_daylight(mut self, body: serde_json::Value) -> Self {
            self.daylight = DaylightReply::from_json(body);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Backend for FakeBackend {
        fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError> {
            self.calls.borrow_mut().push(format!("geocode {}", query));
            self.geocode.clone()
        }

        fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError> {
            self.calls.borrow_mut().push(format!("timezone {} {}", at.latitude, at.longitude));
            self.timezone.clone()
        }

        fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError> {
            self.calls
                .borrow_mut()
                .push(format!("daylight {} {} {}", at.latitude, at.longitude, date));
            self.daylight.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeBackend;
    use super::*;
    use serde_json::json;

    fn christmas_noon() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-12-25T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn paris() -> Coordinate {
        Coordinate::new(48.8566, 2.3522)
    }

    // ── CoordinateResolver ──

    #[test]
    fn test_coordinate_round_trip() {
        let backend = FakeBackend::paris();
        let resolver = CoordinateResolver::new(&backend);
        assert_eq!(resolver.resolve("Paris"), Some(paris()));
        assert_eq!(backend.calls(), vec!["geocode Paris"]);
    }

    #[test]
    fn test_coordinate_first_match_wins() {
        let backend = FakeBackend::paris().with_geocode(json!({"results": [
            {"lat": "33.66", "lng": "-95.55", "display_name": "Paris, Texas"},
            {"lat": 48.8566, "lng": 2.3522}
        ]}));
        let at = CoordinateResolver::new(&backend).resolve("Paris").unwrap();
        assert_eq!(at, Coordinate::new(33.66, -95.55));
    }

    #[test]
    fn test_coordinate_empty_results() {
        let backend = FakeBackend::paris().with_geocode(json!({"results": []}));
        let resolver = CoordinateResolver::new(&backend);
        assert_eq!(resolver.resolve("Unknown Place"), None);
        assert_eq!(
            resolver.try_resolve("Unknown Place"),
            Err(ResolveError::NotFound("Unknown Place".into()))
        );
    }

    #[test]
    fn test_coordinate_blank_query_skips_collaborator() {
        let backend = FakeBackend::paris();
        assert_eq!(CoordinateResolver::new(&backend).resolve("   "), None);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_coordinate_upstream_failure() {
        let mut backend = FakeBackend::paris();
        backend.geocode = Err(ResolveError::UpstreamUnavailable("HTTP 503".into()));
        assert_eq!(CoordinateResolver::new(&backend).resolve("Paris"), None);
    }

    // ── TimeZoneResolver ──

    #[test]
    fn test_timezone_explicit_id() {
        let backend = FakeBackend::paris();
        let info = TimeZoneResolver::new(&backend)
            .with_clock(christmas_noon)
            .resolve(paris())
            .unwrap();
        assert_eq!(info.zone_id, "Europe/Paris");
        assert_eq!(info.zone_source, ZoneSource::Provider);
        assert_eq!(info.zone_name, "Central European Standard Time");
        assert_eq!(info.local_time, "12/25/2024, 1:00:00 PM");
        assert_eq!(info.gmt_offset, None);
    }

    #[test]
    fn test_timezone_offset_fallback() {
        let backend = FakeBackend::paris().with_timezone(json!({"status": "OK", "results": {"gmtOffset": 9}}));
        let info = TimeZoneResolver::new(&backend)
            .with_clock(christmas_noon)
            .resolve(Coordinate::new(35.6762, 139.6503))
            .unwrap();
        assert_eq!(info.zone_id, "Asia/Tokyo");
        assert_eq!(info.zone_source, ZoneSource::OffsetTable);
        assert_eq!(info.gmt_offset, Some(9.0));
        assert_eq!(info.local_time, "12/25/2024, 9:00:00 PM");
    }

    #[test]
    fn test_timezone_explicit_id_beats_offset() {
        let backend = FakeBackend::paris()
            .with_timezone(json!({"status": "OK", "results": {"timezoneId": "Asia/Kolkata", "gmtOffset": 5.5}}));
        let info = TimeZoneResolver::new(&backend).resolve(Coordinate::new(19.07, 72.87)).unwrap();
        assert_eq!(info.zone_id, "Asia/Kolkata");
        assert_eq!(info.zone_name, "India Standard Time");
    }

    #[test]
    fn test_timezone_fractional_offset_without_id_fails() {
        let backend = FakeBackend::paris().with_timezone(json!({"status": "OK", "results": {"gmtOffset": 5.5}}));
        let resolver = TimeZoneResolver::new(&backend);
        assert_eq!(resolver.resolve(Coordinate::new(19.07, 72.87)), None);
        assert_eq!(
            resolver.try_resolve(Coordinate::new(19.07, 72.87)),
            Err(ResolveError::AmbiguousOffset(Some(5.5)))
        );
    }

    #[test]
    fn test_timezone_ok_without_id_or_offset_fails() {
        let backend = FakeBackend::paris().with_timezone(json!({"status": "OK", "results": {}}));
        let resolver = TimeZoneResolver::new(&backend);
        assert_eq!(resolver.try_resolve(paris()), Err(ResolveError::AmbiguousOffset(None)));

        let backend = FakeBackend::paris().with_timezone(json!({"status": "OK"}));
        assert!(TimeZoneResolver::new(&backend).resolve(paris()).is_none());
    }

    #[test]
    fn test_timezone_non_ok_status() {
        let backend = FakeBackend::paris()
            .with_timezone(json!({"status": "OVER_QUERY_LIMIT", "results": {"timezoneId": "Europe/Paris"}}));
        assert!(TimeZoneResolver::new(&backend).resolve(paris()).is_none());
    }

    #[test]
    fn test_timezone_unknown_zone_id() {
        let backend =
            FakeBackend::paris().with_timezone(json!({"status": "OK", "results": {"timezoneId": "Moon/Tranquility"}}));
        assert_eq!(
            TimeZoneResolver::new(&backend).try_resolve(paris()),
            Err(ResolveError::UnknownZone("Moon/Tranquility".into()))
        );
    }

    #[test]
    fn test_timezone_blank_id_uses_offset() {
        let backend = FakeBackend::paris()
            .with_timezone(json!({"status": "OK", "results": {"timezoneId": "", "gmtOffset": -5}}));
        let info = TimeZoneResolver::new(&backend).resolve(paris()).unwrap();
        assert_eq!(info.zone_id, "America/New_York");
    }

    #[test]
    fn test_timezone_is_idempotent() {
        let backend = FakeBackend::paris();
        let resolver = TimeZoneResolver::new(&backend);
        let a = resolver.resolve(paris()).unwrap();
        let b = resolver.resolve(paris()).unwrap();
        assert_eq!(a.zone_id, b.zone_id);
        assert_eq!(a.zone_name, b.zone_name);
    }

    // ── DayLightResolver ──

    #[test]
    fn test_daylight_formats_in_zone() {
        let backend = FakeBackend::paris();
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let info = DayLightResolver::new(&backend)
            .resolve(paris(), "Europe/Paris", Some(date))
            .unwrap();
        assert_eq!(info.sunrise, "8:43:21 AM");
        assert_eq!(info.sunset, "5:03:55 PM");
        assert_eq!(info.date, date);
        assert_eq!(backend.calls(), vec!["daylight 48.8566 2.3522 2024-12-25"]);
    }

    #[test]
    fn test_daylight_defaults_to_today() {
        let backend = FakeBackend::paris();
        let info = DayLightResolver::new(&backend).resolve(paris(), "Europe/Paris", None).unwrap();
        let today = Local::now().date_naive();
        // Allow for the test straddling midnight.
        assert!(info.date == today || info.date.succ_opt() == Some(today));
    }

    #[test]
    fn test_daylight_non_ok_status() {
        let backend = FakeBackend::paris().with_daylight(json!({"status": "INVALID_REQUEST", "results": ""}));
        assert!(DayLightResolver::new(&backend).resolve(paris(), "Europe/Paris", None).is_none());
    }

    #[test]
    fn test_daylight_ok_without_results() {
        let backend = FakeBackend::paris().with_daylight(json!({"status": "OK"}));
        let r = DayLightResolver::new(&backend).try_resolve(paris(), "Europe/Paris", None);
        assert!(matches!(r, Err(ResolveError::InvalidResponse(_))));
    }

    #[test]
    fn test_daylight_bad_zone_skips_collaborator() {
        let backend = FakeBackend::paris();
        assert!(DayLightResolver::new(&backend).resolve(paris(), "Nowhere/Zone", None).is_none());
        assert!(backend.calls().is_empty());
    }
}
