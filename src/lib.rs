//! geotime: resolve a place to its local time, time-zone name and
//! sunrise/sunset times.
//!
//! The [`location`] module holds the resolution pipeline
//! (coordinate → timezone → daylight) and the session that sequences it.
//! [`server`] is the `/api/*` proxy the pipeline talks to by default.

pub mod config;
pub mod location;
pub mod presenter;
pub mod server;
