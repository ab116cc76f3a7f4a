//! Whole-hour GMT offset → IANA zone fallback table.
//!
//! Only used when the timezone collaborator reports an offset but no zone id.
//! Half-hour and quarter-hour zones (India, Nepal, parts of Australia) have no
//! entry and resolve to `None`; callers treat that as a failed resolution
//! rather than guessing a neighbouring zone.

/// Indexed by `offset + 12`.
const ZONE_BY_OFFSET: [&str; 25] = [
    "Etc/GMT+12",
    "Pacific/Midway",
    "Pacific/Honolulu",
    "America/Anchorage",
    "America/Los_Angeles",
    "America/Denver",
    "America/Chicago",
    "America/New_York",
    "America/Caracas", // no DST
    "America/Argentina/Buenos_Aires",
    "Etc/GMT+2",
    "Etc/GMT+1",
    "Etc/GMT",
    "Europe/London",
    "Europe/Paris",
    "Europe/Moscow",
    "Asia/Dubai",
    "Asia/Karachi",
    "Asia/Dhaka",
    "Asia/Bangkok",
    "Asia/Shanghai",
    "Asia/Tokyo",
    "Australia/Sydney",
    "Pacific/Noumea",
    "Pacific/Fiji",
];

pub const MIN_OFFSET: i32 = -12;
pub const MAX_OFFSET: i32 = 12;

/// Map an offset in hours to its canonical zone.
pub fn lookup(offset_hours: f64) -> Option<&'static str> {
    if !offset_hours.is_finite() || offset_hours.fract() != 0.0 {
        return None;
    }
    if offset_hours < MIN_OFFSET as f64 || offset_hours > MAX_OFFSET as f64 {
        return None;
    }
    let index = (offset_hours as i32 - MIN_OFFSET) as usize;
    ZONE_BY_OFFSET.get(index).copied()
}
