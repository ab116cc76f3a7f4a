//! Rendering instants in a target zone, en-US style.
//!
//! Date+time: `12/25/2024, 3:04:05 PM`. Time of day: `3:04:05 PM`.
//! Zone display names follow the long CLDR names ("Eastern Standard Time");
//! zones without one render as `GMT+04:00`.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::types::ResolveError;

pub const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
pub const TIME_FORMAT: &str = "%-I:%M:%S %p";

/// Parse a tz database id.
pub fn parse_zone(zone_id: &str) -> Result<Tz, ResolveError> {
    zone_id
        .parse::<Tz>()
        .map_err(|_| ResolveError::UnknownZone(zone_id.to_string()))
}

/// `instant` as a local date and time in `tz`.
pub fn local_date_time<T: TimeZone>(instant: &DateTime<T>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(DATE_TIME_FORMAT).to_string()
}

/// `instant` as a local time of day in `tz`.
pub fn time_of_day<T: TimeZone>(instant: &DateTime<T>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

/// One named region: its long names and the zones that share them.
struct Metazone {
    standard: &'static str,
    daylight: &'static str,
    /// UTC offset while standard time is in effect.
    standard_offset: i32,
    zones: &'static [&'static str],
}

const fn hours(h: i32, m: i32) -> i32 {
    h * 3600 + m * 60
}

const METAZONES: &[Metazone] = &[
    Metazone {
        standard: "Coordinated Universal Time",
        daylight: "Coordinated Universal Time",
        standard_offset: 0,
        zones: &["UTC", "Etc/UTC", "Etc/UCT", "Etc/Universal", "Etc/Zulu", "UCT", "Universal", "Zulu"],
    },
    Metazone {
        standard: "Greenwich Mean Time",
        daylight: "Greenwich Mean Time",
        standard_offset: 0,
        zones: &[
            "GMT", "Etc/GMT", "Etc/Greenwich", "Atlantic/Reykjavik", "Iceland", "Africa/Abidjan",
            "Africa/Accra", "Africa/Bamako", "Africa/Banjul", "Africa/Bissau", "Africa/Conakry",
            "Africa/Dakar", "Africa/Freetown", "Africa/Lome", "Africa/Monrovia", "Africa/Nouakchott",
            "Africa/Ouagadougou", "America/Danmarkshavn",
        ],
    },
    Metazone {
        standard: "Greenwich Mean Time",
        daylight: "British Summer Time",
        standard_offset: 0,
        zones: &["Europe/London", "Europe/Belfast", "Europe/Guernsey", "Europe/Isle_of_Man", "Europe/Jersey", "GB"],
    },
    // tzdb models Irish summer time as standard and winter as negative DST;
    // going by the offset keeps the names the right way round.
    Metazone {
        standard: "Greenwich Mean Time",
        daylight: "Irish Standard Time",
        standard_offset: 0,
        zones: &["Europe/Dublin", "Eire"],
    },
    Metazone {
        standard: "Western European Standard Time",
        daylight: "Western European Summer Time",
        standard_offset: 0,
        zones: &["Europe/Lisbon", "Portugal", "Atlantic/Madeira", "Atlantic/Canary", "Atlantic/Faroe"],
    },
    Metazone {
        standard: "Central European Standard Time",
        daylight: "Central European Summer Time",
        standard_offset: hours(1, 0),
        zones: &[
            "Europe/Paris", "Europe/Brussels", "Europe/Amsterdam", "Europe/Luxembourg", "Europe/Monaco",
            "Europe/Zurich", "Europe/Vaduz", "Europe/Berlin", "Europe/Busingen", "Europe/Copenhagen",
            "Europe/Oslo", "Europe/Stockholm", "Europe/Vienna", "Europe/Prague", "Europe/Bratislava",
            "Europe/Budapest", "Europe/Warsaw", "Europe/Belgrade", "Europe/Ljubljana", "Europe/Sarajevo",
            "Europe/Zagreb", "Europe/Skopje", "Europe/Podgorica", "Europe/Rome", "Europe/Vatican",
            "Europe/San_Marino", "Europe/Malta", "Europe/Andorra", "Europe/Gibraltar", "Europe/Tirane",
            "Europe/Madrid", "Africa/Ceuta", "Africa/Algiers", "Africa/Tunis", "Arctic/Longyearbyen",
            "Poland", "CET", "MET",
        ],
    },
    Metazone {
        standard: "Eastern European Standard Time",
        daylight: "Eastern European Summer Time",
        standard_offset: hours(2, 0),
        zones: &[
            "Europe/Athens", "Europe/Bucharest", "Europe/Sofia", "Europe/Helsinki", "Europe/Mariehamn",
            "Europe/Tallinn", "Europe/Riga", "Europe/Vilnius", "Europe/Kiev", "Europe/Kyiv",
            "Europe/Uzhgorod", "Europe/Zaporozhye", "Europe/Chisinau", "Europe/Kaliningrad",
            "Asia/Nicosia", "Europe/Nicosia", "Asia/Beirut", "Africa/Cairo", "Egypt", "Africa/Tripoli",
            "Libya", "EET",
        ],
    },
    Metazone {
        standard: "Israel Standard Time",
        daylight: "Israel Daylight Time",
        standard_offset: hours(2, 0),
        zones: &["Asia/Jerusalem", "Asia/Tel_Aviv", "Israel"],
    },
    Metazone {
        standard: "Moscow Standard Time",
        daylight: "Moscow Summer Time",
        standard_offset: hours(3, 0),
        zones: &["Europe/Moscow", "Europe/Kirov", "Europe/Simferopol", "Europe/Volgograd", "Europe/Minsk", "W-SU"],
    },
    Metazone {
        standard: "Arabian Standard Time",
        daylight: "Arabian Daylight Time",
        standard_offset: hours(3, 0),
        zones: &["Asia/Riyadh", "Asia/Aden", "Asia/Bahrain", "Asia/Kuwait", "Asia/Qatar", "Asia/Baghdad"],
    },
    Metazone {
        standard: "East Africa Time",
        daylight: "East Africa Time",
        standard_offset: hours(3, 0),
        zones: &[
            "Africa/Nairobi", "Africa/Addis_Ababa", "Africa/Asmara", "Africa/Dar_es_Salaam",
            "Africa/Djibouti", "Africa/Kampala", "Africa/Mogadishu", "Indian/Antananarivo",
            "Indian/Comoro", "Indian/Mayotte",
        ],
    },
    Metazone {
        standard: "West Africa Standard Time",
        daylight: "West Africa Summer Time",
        standard_offset: hours(1, 0),
        zones: &[
            "Africa/Lagos", "Africa/Bangui", "Africa/Brazzaville", "Africa/Douala", "Africa/Kinshasa",
            "Africa/Libreville", "Africa/Luanda", "Africa/Malabo", "Africa/Niamey", "Africa/Porto-Novo",
            "Africa/Ndjamena",
        ],
    },
    Metazone {
        standard: "Central Africa Time",
        daylight: "Central Africa Time",
        standard_offset: hours(2, 0),
        zones: &[
            "Africa/Maputo", "Africa/Blantyre", "Africa/Bujumbura", "Africa/Gaborone", "Africa/Harare",
            "Africa/Kigali", "Africa/Lubumbashi", "Africa/Lusaka", "Africa/Khartoum", "Africa/Juba",
            "Africa/Windhoek",
        ],
    },
    Metazone {
        standard: "South Africa Standard Time",
        daylight: "South Africa Standard Time",
        standard_offset: hours(2, 0),
        zones: &["Africa/Johannesburg", "Africa/Maseru", "Africa/Mbabane"],
    },
    Metazone {
        standard: "Iran Standard Time",
        daylight: "Iran Daylight Time",
        standard_offset: hours(3, 30),
        zones: &["Asia/Tehran", "Iran"],
    },
    Metazone {
        standard: "Gulf Standard Time",
        daylight: "Gulf Standard Time",
        standard_offset: hours(4, 0),
        zones: &["Asia/Dubai", "Asia/Muscat"],
    },
    Metazone {
        standard: "Pakistan Standard Time",
        daylight: "Pakistan Summer Time",
        standard_offset: hours(5, 0),
        zones: &["Asia/Karachi"],
    },
    Metazone {
        standard: "India Standard Time",
        daylight: "India Standard Time",
        standard_offset: hours(5, 30),
        zones: &["Asia/Kolkata", "Asia/Calcutta", "Asia/Colombo"],
    },
    Metazone {
        standard: "Nepal Time",
        daylight: "Nepal Time",
        standard_offset: hours(5, 45),
        zones: &["Asia/Kathmandu", "Asia/Katmandu"],
    },
    Metazone {
        standard: "Bangladesh Standard Time",
        daylight: "Bangladesh Summer Time",
        standard_offset: hours(6, 0),
        zones: &["Asia/Dhaka", "Asia/Dacca"],
    },
    Metazone {
        standard: "Indochina Time",
        daylight: "Indochina Time",
        standard_offset: hours(7, 0),
        zones: &["Asia/Bangkok", "Asia/Phnom_Penh", "Asia/Vientiane", "Asia/Ho_Chi_Minh", "Asia/Saigon"],
    },
    Metazone {
        standard: "Western Indonesia Time",
        daylight: "Western Indonesia Time",
        standard_offset: hours(7, 0),
        zones: &["Asia/Jakarta", "Asia/Pontianak"],
    },
    Metazone {
        standard: "China Standard Time",
        daylight: "China Daylight Time",
        standard_offset: hours(8, 0),
        zones: &["Asia/Shanghai", "Asia/Chongqing", "Asia/Chungking", "Asia/Harbin", "Asia/Macau", "PRC"],
    },
    Metazone {
        standard: "Hong Kong Standard Time",
        daylight: "Hong Kong Summer Time",
        standard_offset: hours(8, 0),
        zones: &["Asia/Hong_Kong", "Hongkong"],
    },
    Metazone {
        standard: "Taipei Standard Time",
        daylight: "Taipei Daylight Time",
        standard_offset: hours(8, 0),
        zones: &["Asia/Taipei", "ROC"],
    },
    Metazone {
        standard: "Singapore Standard Time",
        daylight: "Singapore Standard Time",
        standard_offset: hours(8, 0),
        zones: &["Asia/Singapore", "Singapore"],
    },
    Metazone {
        standard: "Philippine Standard Time",
        daylight: "Philippine Summer Time",
        standard_offset: hours(8, 0),
        zones: &["Asia/Manila"],
    },
    Metazone {
        standard: "Japan Standard Time",
        daylight: "Japan Daylight Time",
        standard_offset: hours(9, 0),
        zones: &["Asia/Tokyo", "Japan"],
    },
    Metazone {
        standard: "Korean Standard Time",
        daylight: "Korean Daylight Time",
        standard_offset: hours(9, 0),
        zones: &["Asia/Seoul", "ROK"],
    },
    Metazone {
        standard: "Australian Western Standard Time",
        daylight: "Australian Western Daylight Time",
        standard_offset: hours(8, 0),
        zones: &["Australia/Perth", "Australia/West"],
    },
    Metazone {
        standard: "Australian Central Standard Time",
        daylight: "Australian Central Daylight Time",
        standard_offset: hours(9, 30),
        zones: &["Australia/Adelaide", "Australia/Darwin", "Australia/Broken_Hill", "Australia/South", "Australia/North"],
    },
    Metazone {
        standard: "Australian Eastern Standard Time",
        daylight: "Australian Eastern Daylight Time",
        standard_offset: hours(10, 0),
        zones: &[
            "Australia/Sydney", "Australia/Melbourne", "Australia/Brisbane", "Australia/Hobart",
            "Australia/Canberra", "Australia/ACT", "Australia/NSW", "Australia/Victoria",
            "Australia/Queensland", "Australia/Tasmania", "Australia/Lindeman",
        ],
    },
    Metazone {
        standard: "New Caledonia Standard Time",
        daylight: "New Caledonia Summer Time",
        standard_offset: hours(11, 0),
        zones: &["Pacific/Noumea"],
    },
    Metazone {
        standard: "Fiji Standard Time",
        daylight: "Fiji Summer Time",
        standard_offset: hours(12, 0),
        zones: &["Pacific/Fiji"],
    },
    Metazone {
        standard: "New Zealand Standard Time",
        daylight: "New Zealand Daylight Time",
        standard_offset: hours(12, 0),
        zones: &["Pacific/Auckland", "Antarctica/McMurdo", "NZ"],
    },
    Metazone {
        standard: "Samoa Standard Time",
        daylight: "Samoa Daylight Time",
        standard_offset: hours(-11, 0),
        zones: &["Pacific/Pago_Pago", "Pacific/Midway", "Pacific/Samoa", "US/Samoa"],
    },
    Metazone {
        standard: "Hawaii-Aleutian Standard Time",
        daylight: "Hawaii-Aleutian Daylight Time",
        standard_offset: hours(-10, 0),
        zones: &["Pacific/Honolulu", "US/Hawaii", "America/Adak", "America/Atka", "US/Aleutian"],
    },
    Metazone {
        standard: "Alaska Standard Time",
        daylight: "Alaska Daylight Time",
        standard_offset: hours(-9, 0),
        zones: &[
            "America/Anchorage", "America/Juneau", "America/Sitka", "America/Yakutat", "America/Nome",
            "America/Metlakatla", "US/Alaska",
        ],
    },
    Metazone {
        standard: "Pacific Standard Time",
        daylight: "Pacific Daylight Time",
        standard_offset: hours(-8, 0),
        zones: &[
            "America/Los_Angeles", "America/Vancouver", "America/Tijuana", "America/Ensenada",
            "America/Santa_Isabel", "US/Pacific", "Canada/Pacific", "PST8PDT",
        ],
    },
    Metazone {
        standard: "Mountain Standard Time",
        daylight: "Mountain Daylight Time",
        standard_offset: hours(-7, 0),
        zones: &[
            "America/Denver", "America/Boise", "America/Phoenix", "America/Creston", "America/Edmonton",
            "America/Cambridge_Bay", "America/Inuvik", "America/Yellowknife", "America/Ciudad_Juarez",
            "America/Shiprock", "Navajo", "US/Mountain", "US/Arizona", "Canada/Mountain", "MST7MDT",
        ],
    },
    Metazone {
        standard: "Central Standard Time",
        daylight: "Central Daylight Time",
        standard_offset: hours(-6, 0),
        zones: &[
            "America/Chicago", "America/Indiana/Knox", "America/Indiana/Tell_City", "America/Menominee",
            "America/North_Dakota/Beulah", "America/North_Dakota/Center", "America/North_Dakota/New_Salem",
            "America/Knox_IN", "America/Winnipeg", "America/Rainy_River", "America/Rankin_Inlet",
            "America/Resolute", "America/Regina", "America/Swift_Current", "America/Mexico_City",
            "America/Monterrey", "America/Merida", "America/Matamoros", "America/Guatemala",
            "America/Belize", "America/Costa_Rica", "America/El_Salvador", "America/Tegucigalpa",
            "America/Managua", "US/Central", "US/Indiana-Starke", "Canada/Central", "Canada/Saskatchewan",
            "Mexico/General", "CST6CDT",
        ],
    },
    Metazone {
        standard: "Eastern Standard Time",
        daylight: "Eastern Daylight Time",
        standard_offset: hours(-5, 0),
        zones: &[
            "America/New_York", "America/Detroit", "America/Indiana/Indianapolis", "America/Indiana/Vevay",
            "America/Indiana/Vincennes", "America/Indiana/Winamac", "America/Indiana/Marengo",
            "America/Indiana/Petersburg", "America/Kentucky/Louisville", "America/Kentucky/Monticello",
            "America/Indianapolis", "America/Fort_Wayne", "America/Louisville", "America/Toronto",
            "America/Montreal", "America/Nipigon", "America/Thunder_Bay", "America/Iqaluit",
            "America/Pangnirtung", "America/Nassau", "America/Cancun", "America/Panama", "America/Jamaica",
            "America/Cayman", "America/Port-au-Prince", "US/Eastern", "US/East-Indiana", "US/Michigan",
            "Canada/Eastern", "Jamaica", "EST5EDT",
        ],
    },
    Metazone {
        standard: "Cuba Standard Time",
        daylight: "Cuba Daylight Time",
        standard_offset: hours(-5, 0),
        zones: &["America/Havana", "Cuba"],
    },
    Metazone {
        standard: "Colombia Standard Time",
        daylight: "Colombia Summer Time",
        standard_offset: hours(-5, 0),
        zones: &["America/Bogota"],
    },
    Metazone {
        standard: "Peru Standard Time",
        daylight: "Peru Summer Time",
        standard_offset: hours(-5, 0),
        zones: &["America/Lima"],
    },
    Metazone {
        standard: "Venezuela Time",
        daylight: "Venezuela Time",
        standard_offset: hours(-4, 0),
        zones: &["America/Caracas"],
    },
    Metazone {
        standard: "Atlantic Standard Time",
        daylight: "Atlantic Daylight Time",
        standard_offset: hours(-4, 0),
        zones: &[
            "America/Halifax", "America/Glace_Bay", "America/Moncton", "America/Goose_Bay",
            "Atlantic/Bermuda", "America/Puerto_Rico", "America/Santo_Domingo", "America/Barbados",
            "America/Martinique", "Canada/Atlantic",
        ],
    },
    Metazone {
        standard: "Chile Standard Time",
        daylight: "Chile Summer Time",
        standard_offset: hours(-4, 0),
        zones: &["America/Santiago", "Chile/Continental"],
    },
    Metazone {
        standard: "Newfoundland Standard Time",
        daylight: "Newfoundland Daylight Time",
        standard_offset: hours(-3, -30),
        zones: &["America/St_Johns", "Canada/Newfoundland"],
    },
    Metazone {
        standard: "Brasilia Standard Time",
        daylight: "Brasilia Summer Time",
        standard_offset: hours(-3, 0),
        zones: &[
            "America/Sao_Paulo", "America/Bahia", "America/Fortaleza", "America/Recife", "America/Belem",
            "America/Maceio", "America/Araguaina", "America/Santarem", "Brazil/East",
        ],
    },
    Metazone {
        standard: "Argentina Standard Time",
        daylight: "Argentina Summer Time",
        standard_offset: hours(-3, 0),
        zones: &[
            "America/Argentina/Buenos_Aires", "America/Buenos_Aires", "America/Argentina/Cordoba",
            "America/Cordoba", "America/Argentina/Mendoza", "America/Mendoza",
        ],
    },
];

/// Long display name of `tz` at `instant`.
///
/// Standard or daylight is decided by the offset in effect, not by the DST
/// component: zones with negative DST (Europe/Dublin) would otherwise come
/// out inverted.
pub fn zone_long_name(instant: &DateTime<Utc>, tz: Tz) -> String {
    let offset = instant.with_timezone(&tz).offset().fix().local_minus_utc();
    let id = tz.name();

    match METAZONES.iter().find(|m| m.zones.contains(&id)) {
        Some(m) if offset == m.standard_offset => m.standard.to_string(),
        Some(m) => m.daylight.to_string(),
        None => gmt_label(offset),
    }
}

/// `GMT`, `GMT+04:00`, `GMT-09:30`.
pub fn gmt_label(offset_seconds: i32) -> String {
    if offset_seconds == 0 {
        return "GMT".into();
    }
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let abs = offset_seconds.abs();
    format!("GMT{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}
