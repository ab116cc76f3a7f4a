//! Collaborator adapters: one normalized response shape per collaborator,
//! one adapter per backend variant.
//!
//! - [`ProxyBackend`] speaks the `/api/*` proxy contract (the default).
//! - [`DirectBackend`] talks to the upstream services the proxy wraps:
//!   LocationIQ (geocoding), GeoNames (timezone), sunrise-sunset.org.
//! - [`IpLocator`] stands in for device geolocation (ipapi.co).
//!
//! The normalized shapes serialize to exactly the proxy wire format, so the
//! server can hand them out unchanged.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::types::{Coordinate, ResolveError};
use crate::config::UpstreamConfig;

pub const USER_AGENT: &str = concat!("geotime/", env!("CARGO_PKG_VERSION"));

/// Status value collaborators use for success.
pub const STATUS_OK: &str = "OK";

/// Build the shared HTTP agent. No deadline unless `timeout` is set.
pub fn http_agent(timeout: Option<Duration>) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new().user_agent(USER_AGENT);
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    builder.build()
}

// ─── Normalized shapes ──────────────────────────────────────────

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    #[serde(deserialize_with = "de_degrees")]
    pub lat: f64,
    #[serde(deserialize_with = "de_degrees")]
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl GeocodeCandidate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeReply {
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Option<TimezoneFields>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_offset: Option<f64>,
}

impl TimezoneReply {
    pub fn ok(fields: TimezoneFields) -> Self {
        Self { status: STATUS_OK.into(), results: Some(fields) }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaylightReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Option<DaylightFields>,
}

/// Sunrise and sunset instants, UTC-normalized by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaylightFields {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

impl DaylightReply {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Decode a sunrise/sunset body. On a non-OK status the `results` member
    /// is not trusted (sunrise-sunset.org sends `""` there).
    pub fn from_json(value: serde_json::Value) -> Result<Self, ResolveError> {
        let status = value
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();
        if status != STATUS_OK {
            return Ok(Self { status, results: None });
        }
        let results = match value.get("results") {
            Some(r) => serde_json::from_value(r.clone())
                .map_err(|e| ResolveError::InvalidResponse(e.to_string()))?,
            None => None,
        };
        Ok(Self { status, results })
    }
}

/// A language offered by the translation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

/// Accept `48.85` as well as `"48.85"`.
fn de_degrees<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Degrees::deserialize(deserializer)? {
        Degrees::Number(v) => Ok(v),
        Degrees::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ─── Collaborator seams ─────────────────────────────────────────

/// The three HTTP collaborators the pipeline depends on.
pub trait Backend {
    fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError>;
    fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError>;
    fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError> {
        (**self).geocode(query)
    }
    fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError> {
        (**self).timezone(at)
    }
    fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError> {
        (**self).sunrise_sunset(at, date)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError> {
        (**self).geocode(query)
    }
    fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError> {
        (**self).timezone(at)
    }
    fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError> {
        (**self).sunrise_sunset(at, date)
    }
}

/// Device / network geolocation.
pub trait Locator {
    fn locate(&self) -> Result<Coordinate, ResolveError>;
}

// ─── Proxy backend ──────────────────────────────────────────────

/// Client for the `/api/*` proxy endpoints.
#[derive(Clone)]
pub struct ProxyBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl ProxyBackend {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            agent: http_agent(timeout),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// UI key → translated string for `lang`.
    pub fn translations(&self, lang: &str) -> Result<BTreeMap<String, String>, ResolveError> {
        let url = self.endpoint("/api/language");
        tracing::debug!(%url, lang, "language request");
        Ok(self.agent.get(&url).query("lang", lang).call()?.into_json()?)
    }

    pub fn supported_languages(&self) -> Result<Vec<LanguageEntry>, ResolveError> {
        let url = self.endpoint("/api/supportedlanguage");
        Ok(self.agent.get(&url).call()?.into_json()?)
    }
}

impl Backend for ProxyBackend {
    fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError> {
        let url = self.endpoint("/api/geocode");
        tracing::debug!(%url, query, "geocode request");
        Ok(self.agent.get(&url).query("address", query).call()?.into_json()?)
    }

    fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError> {
        let url = self.endpoint("/api/timezone");
        tracing::debug!(%url, lat = at.latitude, lng = at.longitude, "timezone request");
        Ok(self
            .agent
            .get(&url)
            .query("lat", &at.latitude.to_string())
            .query("lng", &at.longitude.to_string())
            .call()?
            .into_json()?)
    }

    fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError> {
        let url = self.endpoint("/api/sunrise-sunset");
        tracing::debug!(%url, lat = at.latitude, lng = at.longitude, %date, "sunrise-sunset request");
        let body: serde_json::Value = self
            .agent
            .get(&url)
            .query("lat", &at.latitude.to_string())
            .query("lng", &at.longitude.to_string())
            .query("date", &date.format("%Y-%m-%d").to_string())
            .call()?
            .into_json()?;
        DaylightReply::from_json(body)
    }
}

// ─── Direct backend (upstream services) ─────────────────────────

#[derive(Deserialize)]
struct LocationIqPlace {
    #[serde(deserialize_with = "de_degrees")]
    lat: f64,
    #[serde(deserialize_with = "de_degrees")]
    lon: f64,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoNamesTimezone {
    #[serde(default)]
    timezone_id: Option<String>,
    #[serde(default)]
    gmt_offset: Option<f64>,
    #[serde(default)]
    status: Option<GeoNamesStatus>,
}

#[derive(Deserialize)]
struct GeoNamesStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    value: i64,
}

/// Calls LocationIQ, GeoNames and sunrise-sunset.org directly.
#[derive(Clone)]
pub struct DirectBackend {
    agent: ureq::Agent,
    upstream: UpstreamConfig,
}

impl DirectBackend {
    pub fn new(upstream: UpstreamConfig, timeout: Option<Duration>) -> Self {
        Self {
            agent: http_agent(timeout),
            upstream,
        }
    }
}

impl Backend for DirectBackend {
    fn geocode(&self, query: &str) -> Result<GeocodeReply, ResolveError> {
        let mut request = self
            .agent
            .get(&self.upstream.geocode_url)
            .query("q", query)
            .query("format", "json");
        if let Some(key) = self.upstream.locationiq_key.as_deref() {
            request = request.query("key", key);
        }

        // LocationIQ answers 404 when nothing matches.
        let places: Vec<LocationIqPlace> = match request.call() {
            Ok(response) => response.into_json()?,
            Err(ureq::Error::Status(404, _)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(GeocodeReply {
            results: places
                .into_iter()
                .map(|p| GeocodeCandidate {
                    lat: p.lat,
                    lng: p.lon,
                    display_name: p.display_name,
                })
                .collect(),
            status: Some(STATUS_OK.into()),
        })
    }

    fn timezone(&self, at: Coordinate) -> Result<TimezoneReply, ResolveError> {
        let mut request = self
            .agent
            .get(&self.upstream.timezone_url)
            .query("lat", &at.latitude.to_string())
            .query("lng", &at.longitude.to_string());
        if let Some(user) = self.upstream.geonames_user.as_deref() {
            request = request.query("username", user);
        }

        let body: GeoNamesTimezone = request.call()?.into_json()?;
        if let Some(status) = body.status {
            return Err(ResolveError::UpstreamUnavailable(format!(
                "geonames: {} (code {})",
                status.message, status.value
            )));
        }

        Ok(TimezoneReply::ok(TimezoneFields {
            timezone_id: body.timezone_id,
            gmt_offset: body.gmt_offset,
        }))
    }

    fn sunrise_sunset(&self, at: Coordinate, date: NaiveDate) -> Result<DaylightReply, ResolveError> {
        let body: serde_json::Value = self
            .agent
            .get(&self.upstream.sunrise_url)
            .query("lat", &at.latitude.to_string())
            .query("lng", &at.longitude.to_string())
            .query("formatted", "0")
            .query("date", &date.format("%Y-%m-%d").to_string())
            .call()?
            .into_json()?;
        DaylightReply::from_json(body)
    }
}

// ─── IP-based geolocation ───────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

/// Approximate the caller's position from its public IP.
#[derive(Clone)]
pub struct IpLocator {
    agent: ureq::Agent,
    url: String,
}

impl IpLocator {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            agent: http_agent(timeout),
            url: url.into(),
        }
    }
}

impl Locator for IpLocator {
    fn locate(&self) -> Result<Coordinate, ResolveError> {
        let r: IpApiResult = self.agent.get(&self.url).call()?.into_json()?;

        let lat = r.latitude.ok_or_else(|| ResolveError::InvalidResponse("no latitude".into()))?;
        let lon = r.longitude.ok_or_else(|| ResolveError::InvalidResponse("no longitude".into()))?;
        tracing::debug!(lat, lon, city = r.city.as_deref().unwrap_or("?"), "ip geolocation");

        Ok(Coordinate::new(lat, lon))
    }
}
