//! Location → local-time resolution pipeline.
//!
//! Turns a place name (or a point) into a coordinate, a time zone with the
//! current local time, and sunrise/sunset times, using three HTTP
//! collaborators behind the [`Backend`] trait.

pub mod format;
pub mod offsets;
pub mod providers;
pub mod resolver;
pub mod session;
pub mod types;

pub use providers::{Backend, DirectBackend, IpLocator, LanguageEntry, Locator, ProxyBackend};
pub use resolver::{CoordinateResolver, DayLightResolver, TimeZoneResolver};
pub use session::{Command, LocationSession, Presenter, Resolution, Selection, SessionState};
pub use types::{Coordinate, DaylightInfo, FailureReason, ResolveError, TimeZoneInfo, ZoneSource};
