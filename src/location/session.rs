//! The location session: owns the current selection and sequences
//! CoordinateResolver → TimeZoneResolver → DayLightResolver.
//!
//! States: `Idle → Resolving → Ready | Failed(reason)`. `Failed` accepts a new
//! search exactly like `Idle`. A failed step never touches the stored
//! selection.
//!
//! Commands come in as [`Command`] values and results go out through a
//! [`Presenter`]; the session itself has no rendering dependency.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::providers::{Backend, Locator};
use super::resolver::{Clock, CoordinateResolver, DayLightResolver, TimeZoneResolver};
use super::types::{Coordinate, DaylightInfo, FailureReason, TimeZoneInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Resolving,
    Ready,
    Failed(FailureReason),
}

/// What a successful time-zone resolution leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub coordinate: Coordinate,
    pub zone_id: String,
}

/// Everything one search / point selection produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub time: TimeZoneInfo,
    /// `None` when the sunrise/sunset step failed; the session is still Ready.
    pub daylight: Option<DaylightInfo>,
}

/// Rendering collaborators (text output, DOM, globe).
pub trait Presenter {
    /// Reset every output to its placeholder.
    fn clear(&mut self);
    fn set_loading(&mut self, _loading: bool) {}
    /// Move the globe (or map) to the selected point.
    fn focus(&mut self, _at: Coordinate) {}
    fn show_time(&mut self, at: Coordinate, info: &TimeZoneInfo);
    fn show_daylight(&mut self, info: &DaylightInfo);
    fn show_failure(&mut self, reason: FailureReason);
}

/// A UI event.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    SelectPoint { lat: f64, lng: f64 },
    Locate,
    ChangeDate(NaiveDate),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseCommandError {}

/// `search <text>`, `point <lat> <lng>`, `date YYYY-MM-DD`, `locate`,
/// `reset`. Anything else is taken as a search query.
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "" => Err(ParseCommandError("empty command".into())),
            "search" => Ok(Self::Search(rest.to_string())),
            "locate" if rest.is_empty() => Ok(Self::Locate),
            "reset" if rest.is_empty() => Ok(Self::Reset),
            "date" => NaiveDate::parse_from_str(rest, "%Y-%m-%d")
                .map(Self::ChangeDate)
                .map_err(|e| ParseCommandError(format!("invalid date '{}': {}", rest, e))),
            "point" => {
                let parts: Vec<&str> = rest
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .collect();
                match parts.as_slice() {
                    [lat, lng] => match (lat.parse(), lng.parse()) {
                        (Ok(lat), Ok(lng)) => Ok(Self::SelectPoint { lat, lng }),
                        _ => Err(ParseCommandError(format!("invalid point '{}'", rest))),
                    },
                    _ => Err(ParseCommandError("usage: point <lat> <lng>".into())),
                }
            }
            _ => Ok(Self::Search(line.to_string())),
        }
    }
}

pub struct LocationSession<B> {
    backend: B,
    locator: Option<Box<dyn Locator>>,
    clock: Clock,
    state: SessionState,
    selection: Option<Selection>,
}

impl<B: Backend> LocationSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            locator: None,
            clock: chrono::Utc::now,
            state: SessionState::Idle,
            selection: None,
        }
    }

    /// Enable [`Command::Locate`].
    pub fn with_locator(mut self, locator: Box<dyn Locator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve a place name, then its time zone, then today's daylight.
    pub fn search(&mut self, query: &str) -> Result<Resolution, FailureReason> {
        if query.trim().is_empty() {
            return Err(self.fail(FailureReason::EmptyQuery));
        }
        self.state = SessionState::Resolving;

        let at = match CoordinateResolver::new(&self.backend).resolve(query) {
            Some(at) => at,
            None => return Err(self.fail(FailureReason::LocationNotFound)),
        };
        self.resolve_point(at)
    }

    /// Same as [`search`](Self::search) for an already known coordinate
    /// (map click, device geolocation).
    pub fn select_point(&mut self, lat: f64, lng: f64) -> Result<Resolution, FailureReason> {
        let at = Coordinate::new(lat, lng);
        if !at.is_valid() {
            return Err(self.fail(FailureReason::InvalidCoordinate));
        }
        self.state = SessionState::Resolving;
        self.resolve_point(at)
    }

    /// Ask the locator where we are, then proceed as a point selection.
    pub fn locate(&mut self) -> Result<Resolution, FailureReason> {
        self.state = SessionState::Resolving;
        let located = match &self.locator {
            Some(locator) => locator.locate(),
            None => return Err(self.fail(FailureReason::LocationNotFound)),
        };
        match located {
            Ok(at) => self.select_point(at.latitude, at.longitude),
            Err(e) => {
                tracing::warn!(error = %e, "geolocation failed");
                Err(self.fail(FailureReason::LocationNotFound))
            }
        }
    }

    /// Re-run the daylight step for another date. Only valid when Ready;
    /// never re-resolves the coordinate or the zone.
    pub fn change_date(&mut self, date: NaiveDate) -> Result<DaylightInfo, FailureReason> {
        let selection = match (&self.state, &self.selection) {
            (SessionState::Ready, Some(selection)) => selection,
            _ => return Err(FailureReason::NotReady),
        };
        DayLightResolver::new(&self.backend)
            .resolve(selection.coordinate, &selection.zone_id, Some(date))
            .ok_or(FailureReason::DaylightUnavailable)
    }

    /// Forget the selection and go back to Idle.
    pub fn reset(&mut self) {
        self.selection = None;
        self.state = SessionState::Idle;
    }

    /// Run one UI command and push its outcome to `presenter`.
    pub fn dispatch<P: Presenter>(&mut self, command: Command, presenter: &mut P) {
        match command {
            Command::ChangeDate(date) => match self.change_date(date) {
                Ok(daylight) => presenter.show_daylight(&daylight),
                Err(reason) => presenter.show_failure(reason),
            },
            Command::Reset => {
                self.reset();
                presenter.clear();
            }
            Command::Search(_) | Command::SelectPoint { .. } | Command::Locate => {
                presenter.clear();
                presenter.set_loading(true);
                let outcome = match command {
                    Command::Search(query) => self.search(&query),
                    Command::SelectPoint { lat, lng } => self.select_point(lat, lng),
                    _ => self.locate(),
                };
                presenter.set_loading(false);
                match outcome {
                    Ok(resolution) => {
                        presenter.focus(resolution.coordinate);
                        presenter.show_time(resolution.coordinate, &resolution.time);
                        match &resolution.daylight {
                            Some(daylight) => presenter.show_daylight(daylight),
                            None => presenter.show_failure(FailureReason::DaylightUnavailable),
                        }
                    }
                    Err(reason) => presenter.show_failure(reason),
                }
            }
        }
    }

    fn resolve_point(&mut self, at: Coordinate) -> Result<Resolution, FailureReason> {
        let time = match TimeZoneResolver::new(&self.backend).with_clock(self.clock).resolve(at) {
            Some(time) => time,
            None => return Err(self.fail(FailureReason::LocalTimeUnavailable)),
        };

        self.selection = Some(Selection {
            coordinate: at,
            zone_id: time.zone_id.clone(),
        });
        self.state = SessionState::Ready;

        let daylight = DayLightResolver::new(&self.backend).resolve(at, &time.zone_id, None);
        Ok(Resolution {
            coordinate: at,
            time,
            daylight,
        })
    }

    fn fail(&mut self, reason: FailureReason) -> FailureReason {
        tracing::debug!(%reason, "session step failed");
        self.state = SessionState::Failed(reason);
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::providers::DaylightReply;
    use crate::location::resolver::fake::FakeBackend;
    use crate::location::types::ResolveError;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Presenter for Recorder {
        fn clear(&mut self) {
            self.events.push("clear".into());
        }
        fn set_loading(&mut self, loading: bool) {
            self.events.push(format!("loading {}", loading));
        }
        fn focus(&mut self, at: Coordinate) {
            self.events.push(format!("focus {} {}", at.latitude, at.longitude));
        }
        fn show_time(&mut self, _at: Coordinate, info: &TimeZoneInfo) {
            self.events.push(format!("time {}", info.zone_id));
        }
        fn show_daylight(&mut self, info: &DaylightInfo) {
            self.events.push(format!("daylight {}", info.date));
        }
        fn show_failure(&mut self, reason: FailureReason) {
            self.events.push(format!("failure {}", reason));
        }
    }

    struct FixedLocator(Result<Coordinate, ResolveError>);

    impl Locator for FixedLocator {
        fn locate(&self) -> Result<Coordinate, ResolveError> {
            self.0.clone()
        }
    }

    fn christmas() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
    }

    #[test]
    fn test_search_paris_reaches_ready() {
        let mut session = LocationSession::new(FakeBackend::paris());
        assert_eq!(session.state(), SessionState::Idle);

        let resolution = session.search("Paris").unwrap();
        assert_eq!(resolution.time.zone_id, "Europe/Paris");
        assert_eq!(resolution.coordinate, Coordinate::new(48.8566, 2.3522));
        assert!(resolution.daylight.is_some());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.selection().unwrap().zone_id, "Europe/Paris");
    }

    #[test]
    fn test_unknown_place_fails_without_further_calls() {
        let backend = FakeBackend::paris().with_geocode(json!({"results": []}));
        let mut session = LocationSession::new(backend);

        assert_eq!(session.search("Unknown Place"), Err(FailureReason::LocationNotFound));
        assert_eq!(session.state(), SessionState::Failed(FailureReason::LocationNotFound));
        assert!(session.selection().is_none());
        assert_eq!(session.backend().calls(), vec!["geocode Unknown Place"]);
    }

    #[test]
    fn test_failed_session_accepts_new_search() {
        let backend = FakeBackend::paris().with_timezone(json!({"status": "ERROR"}));
        let mut session = LocationSession::new(backend);
        assert_eq!(session.search("Paris"), Err(FailureReason::LocalTimeUnavailable));

        session.backend.timezone = FakeBackend::paris().timezone;
        assert!(session.search("Paris").is_ok());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_offset_fallback_selects_tokyo() {
        let backend = FakeBackend::paris().with_timezone(json!({"status": "OK", "results": {"gmtOffset": 9}}));
        let mut session = LocationSession::new(backend);
        let resolution = session.select_point(35.6762, 139.6503).unwrap();
        assert_eq!(resolution.time.zone_id, "Asia/Tokyo");
        assert_eq!(session.selection().unwrap().zone_id, "Asia/Tokyo");
    }

    #[test]
    fn test_timezone_failure_keeps_previous_selection() {
        let mut session = LocationSession::new(FakeBackend::paris());
        session.search("Paris").unwrap();
        let before = session.selection().cloned();

        session.backend.timezone = Ok(serde_json::from_value(json!({"status": "ZERO_RESULTS"})).unwrap());
        assert_eq!(session.select_point(10.0, 10.0), Err(FailureReason::LocalTimeUnavailable));
        assert_eq!(session.selection().cloned(), before);
        assert_eq!(session.state(), SessionState::Failed(FailureReason::LocalTimeUnavailable));
    }

    #[test]
    fn test_daylight_failure_still_ready() {
        let backend = FakeBackend::paris().with_daylight(json!({"status": "INVALID_REQUEST", "results": ""}));
        let mut session = LocationSession::new(backend);
        let resolution = session.search("Paris").unwrap();
        assert!(resolution.daylight.is_none());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_change_date_reuses_selection() {
        let mut session = LocationSession::new(FakeBackend::paris());
        session.search("Paris").unwrap();
        let before = session.selection().cloned();
        let calls_before = session.backend().calls().len();

        let daylight = session.change_date(christmas()).unwrap();
        assert_eq!(daylight.date, christmas());
        assert_eq!(daylight.zone_id, "Europe/Paris");
        assert_eq!(session.selection().cloned(), before);

        let calls = session.backend().calls();
        assert_eq!(&calls[calls_before..], ["daylight 48.8566 2.3522 2024-12-25"]);
    }

    #[test]
    fn test_change_date_failure_leaves_session_untouched() {
        let mut session = LocationSession::new(FakeBackend::paris());
        session.search("Paris").unwrap();
        let before = session.selection().cloned();

        session.backend.daylight = DaylightReply::from_json(json!({"status": "INVALID_DATE", "results": ""}));
        assert_eq!(session.change_date(christmas()), Err(FailureReason::DaylightUnavailable));
        assert_eq!(session.selection().cloned(), before);
        assert_eq!(session.state(), SessionState::Ready);

        session.backend.daylight = Err(ResolveError::Transport("connection reset".into()));
        assert_eq!(session.change_date(christmas()), Err(FailureReason::DaylightUnavailable));
        assert_eq!(session.selection().cloned(), before);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_change_date_requires_ready() {
        let mut session = LocationSession::new(FakeBackend::paris());
        assert_eq!(session.change_date(christmas()), Err(FailureReason::NotReady));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.backend().calls().is_empty());
    }

    #[test]
    fn test_invalid_point_is_rejected() {
        let mut session = LocationSession::new(FakeBackend::paris());
        assert_eq!(session.select_point(95.0, 0.0), Err(FailureReason::InvalidCoordinate));
        assert!(session.backend().calls().is_empty());
    }

    #[test]
    fn test_blank_search() {
        let mut session = LocationSession::new(FakeBackend::paris());
        assert_eq!(session.search("  "), Err(FailureReason::EmptyQuery));
        assert!(session.backend().calls().is_empty());
    }

    #[test]
    fn test_locate_uses_locator() {
        let mut session = LocationSession::new(FakeBackend::paris())
            .with_locator(Box::new(FixedLocator(Ok(Coordinate::new(48.8566, 2.3522)))));
        let resolution = session.locate().unwrap();
        assert_eq!(resolution.time.zone_id, "Europe/Paris");
    }

    #[test]
    fn test_locate_failure() {
        let mut session = LocationSession::new(FakeBackend::paris())
            .with_locator(Box::new(FixedLocator(Err(ResolveError::Transport("offline".into())))));
        assert_eq!(session.locate(), Err(FailureReason::LocationNotFound));

        let mut bare = LocationSession::new(FakeBackend::paris());
        assert_eq!(bare.locate(), Err(FailureReason::LocationNotFound));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = LocationSession::new(FakeBackend::paris());
        session.search("Paris").unwrap();
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.selection().is_none());
        assert_eq!(session.change_date(christmas()), Err(FailureReason::NotReady));
    }

    #[test]
    fn test_dispatch_pushes_to_presenter() {
        let mut session = LocationSession::new(FakeBackend::paris());
        let mut ui = Recorder::default();

        session.dispatch(Command::Search("Paris".into()), &mut ui);
        session.dispatch(Command::ChangeDate(christmas()), &mut ui);

        assert_eq!(ui.events[0], "clear");
        assert_eq!(ui.events[1], "loading true");
        assert_eq!(ui.events[2], "loading false");
        assert_eq!(ui.events[3], "focus 48.8566 2.3522");
        assert_eq!(ui.events[4], "time Europe/Paris");
        assert!(ui.events[5].starts_with("daylight "));
        assert_eq!(ui.events[6], "daylight 2024-12-25");
    }

    #[test]
    fn test_dispatch_failure_message() {
        let backend = FakeBackend::paris().with_geocode(json!({"results": []}));
        let mut session = LocationSession::new(backend);
        let mut ui = Recorder::default();
        session.dispatch(Command::Search("Unknown Place".into()), &mut ui);
        assert_eq!(ui.events.last().unwrap(), "failure location not found");
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("search New York".parse(), Ok(Command::Search("New York".into())));
        assert_eq!("Tokyo".parse(), Ok(Command::Search("Tokyo".into())));
        assert_eq!("Rio de Janeiro".parse(), Ok(Command::Search("Rio de Janeiro".into())));
        assert_eq!("point 48.85, 2.35".parse(), Ok(Command::SelectPoint { lat: 48.85, lng: 2.35 }));
        assert_eq!("point -33.9 151.2".parse(), Ok(Command::SelectPoint { lat: -33.9, lng: 151.2 }));
        assert_eq!("date 2024-12-25".parse(), Ok(Command::ChangeDate(christmas())));
        assert_eq!("LOCATE".parse(), Ok(Command::Locate));
        assert_eq!("reset".parse(), Ok(Command::Reset));
        assert!("date tomorrow".parse::<Command>().is_err());
        assert!("point 1".parse::<Command>().is_err());
        assert!("   ".parse::<Command>().is_err());
    }
}
