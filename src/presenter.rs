//! Terminal rendering of session results, with translatable labels.
//!
//! The presenter keeps a small panel of output fields (the terminal
//! equivalent of the page's result elements). Session pushes update the
//! panel; [`TextPresenter::flush`] writes it out.

use std::collections::BTreeMap;
use std::io::Write;

use crate::location::{Coordinate, DaylightInfo, FailureReason, Presenter, TimeZoneInfo};

const PLACEHOLDER: &str = "--:--";

const ENGLISH: &[(&str, &str)] = &[
    ("location", "Location"),
    ("current_time", "Current Time (Local)"),
    ("time_zone", "Time Zone"),
    ("sunrise", "Sunrise"),
    ("sunset", "Sunset"),
    ("date", "Date"),
    ("error", "Error"),
    ("loading", "Loading..."),
];

const FAILURES: &[FailureReason] = &[
    FailureReason::EmptyQuery,
    FailureReason::InvalidCoordinate,
    FailureReason::LocationNotFound,
    FailureReason::LocalTimeUnavailable,
    FailureReason::DaylightUnavailable,
    FailureReason::NotReady,
];

/// UI key → display string. Unknown keys render as the key itself.
#[derive(Debug, Clone)]
pub struct Labels {
    map: BTreeMap<String, String>,
}

impl Labels {
    pub fn english() -> Self {
        let mut map: BTreeMap<String, String> =
            ENGLISH.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        for reason in FAILURES {
            map.insert(reason.key().to_string(), capitalize(&reason.to_string()));
        }
        Self { map }
    }

    /// Overlay a translation map; keys it lacks keep their English text.
    pub fn with_translations(mut self, translations: BTreeMap<String, String>) -> Self {
        self.map.extend(translations);
        self
    }

    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.map.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn failure(&self, reason: FailureReason) -> &str {
        self.get(reason.key())
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::english()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Panel {
    location: Option<String>,
    current_time: Option<String>,
    time_zone: Option<String>,
    date: Option<String>,
    sunrise: Option<String>,
    sunset: Option<String>,
    error: Option<String>,
}

/// Writes results as labelled lines.
pub struct TextPresenter<W: Write> {
    out: W,
    labels: Labels,
    panel: Panel,
    loading: bool,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W, labels: Labels) -> Self {
        Self {
            out,
            labels,
            panel: Panel::default(),
            loading: false,
        }
    }

    /// Write the panel. Lines with nothing to show use a placeholder; the
    /// location and date lines are left out until known.
    pub fn flush(&mut self) -> std::io::Result<()> {
        let l = &self.labels;
        let p = &self.panel;
        let or_placeholder = |v: &Option<String>| v.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

        if let Some(location) = &p.location {
            writeln!(self.out, "{}: {}", l.get("location"), location)?;
        }
        writeln!(self.out, "{}: {}", l.get("current_time"), or_placeholder(&p.current_time))?;
        writeln!(self.out, "{}: {}", l.get("time_zone"), or_placeholder(&p.time_zone))?;
        if let Some(date) = &p.date {
            writeln!(self.out, "{}: {}", l.get("date"), date)?;
        }
        writeln!(self.out, "{}: {}", l.get("sunrise"), or_placeholder(&p.sunrise))?;
        writeln!(self.out, "{}: {}", l.get("sunset"), or_placeholder(&p.sunset))?;
        if let Some(error) = &p.error {
            writeln!(self.out, "{}: {}", l.get("error"), error)?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn clear(&mut self) {
        self.panel = Panel::default();
    }

    fn set_loading(&mut self, loading: bool) {
        // Only announce the start; a finished lookup is followed by a flush.
        if loading && !self.loading {
            tracing::debug!("{}", self.labels.get("loading"));
        }
        self.loading = loading;
    }

    fn show_time(&mut self, at: Coordinate, info: &TimeZoneInfo) {
        self.panel.location = Some(at.to_string());
        self.panel.current_time = Some(info.local_time.clone());
        self.panel.time_zone = Some(format!("{} ({})", info.zone_name, info.zone_id));
        self.panel.error = None;
    }

    fn show_daylight(&mut self, info: &DaylightInfo) {
        self.panel.date = Some(info.date.format("%Y-%m-%d").to_string());
        self.panel.sunrise = Some(info.sunrise.clone());
        self.panel.sunset = Some(info.sunset.clone());
    }

    fn show_failure(&mut self, reason: FailureReason) {
        self.panel.error = Some(self.labels.failure(reason).to_string());
    }
}
