//! # Timezone Abbreviation Lookup
//!
//! Forecast pages print the issuance time with a bare abbreviation such as
//! `CEST` or `AEDT`. Abbreviations are not unique, so resolution goes through
//! the [`TimezoneResolver`] trait which returns every candidate IANA zone in
//! preference order. The pipeline picks the first one.
//!
//! [`StaticTimezones`] is the built-in table. Tests and callers with better
//! knowledge of a break's location can inject their own resolver.

use std::collections::HashMap;

/// Maps a timezone abbreviation to candidate IANA zone names, best first.
pub trait TimezoneResolver {
    /// An empty result means the abbreviation is unknown.
    fn zones(&self, abbreviation: &str) -> Vec<String>;
}

impl TimezoneResolver for HashMap<String, Vec<String>> {
    fn zones(&self, abbreviation: &str) -> Vec<String> {
        self.get(abbreviation).cloned().unwrap_or_default()
    }
}

/// Built-in abbreviation table covering the zones surf breaks are found in.
///
/// When an abbreviation is shared by several zones with different rules
/// (`CST`, `IST`, `AST`), the most populous surf coast is listed first.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTimezones;

// Ordered: the first zone of each entry wins.
const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("UTC", &["Etc/UTC"]),
    ("GMT", &["Europe/London", "Africa/Abidjan", "Atlantic/Reykjavik", "Africa/Dakar"]),
    ("BST", &["Europe/London"]),
    ("IST", &["Asia/Kolkata", "Europe/Dublin", "Asia/Jerusalem"]),
    ("WET", &["Europe/Lisbon", "Atlantic/Canary", "Atlantic/Madeira", "Africa/Casablanca"]),
    ("WEST", &["Europe/Lisbon", "Atlantic/Canary", "Atlantic/Madeira"]),
    (
        "CET",
        &["Europe/Paris", "Europe/Madrid", "Europe/Berlin", "Europe/Rome", "Europe/Amsterdam", "Africa/Ceuta"],
    ),
    (
        "CEST",
        &["Europe/Paris", "Europe/Madrid", "Europe/Berlin", "Europe/Rome", "Europe/Amsterdam", "Africa/Ceuta"],
    ),
    ("EET", &["Europe/Athens", "Europe/Helsinki", "Africa/Cairo", "Asia/Beirut"]),
    ("EEST", &["Europe/Athens", "Europe/Helsinki", "Asia/Beirut"]),
    ("IDT", &["Asia/Jerusalem"]),
    ("MET", &["MET"]),
    ("MEST", &["MET"]),
    ("MSK", &["Europe/Moscow", "Europe/Simferopol"]),
    ("SAST", &["Africa/Johannesburg"]),
    ("WAT", &["Africa/Lagos", "Africa/Luanda"]),
    ("CAT", &["Africa/Maputo", "Africa/Windhoek"]),
    ("EAT", &["Africa/Nairobi", "Africa/Dar_es_Salaam", "Indian/Mayotte"]),
    ("PKT", &["Asia/Karachi"]),
    ("WIB", &["Asia/Jakarta", "Asia/Pontianak"]),
    ("WITA", &["Asia/Makassar"]),
    ("WIT", &["Asia/Jayapura"]),
    ("PST", &["America/Los_Angeles", "Asia/Manila"]),
    ("PDT", &["America/Los_Angeles", "America/Tijuana"]),
    ("MST", &["America/Denver", "America/Phoenix", "America/Hermosillo"]),
    ("MDT", &["America/Denver", "America/Boise"]),
    ("CST", &["America/Chicago", "Asia/Shanghai", "America/Havana", "America/Costa_Rica"]),
    ("CDT", &["America/Chicago", "America/Havana", "America/Mexico_City"]),
    ("EST", &["America/New_York", "America/Panama", "America/Cancun"]),
    ("EDT", &["America/New_York", "America/Toronto"]),
    ("AKST", &["America/Anchorage"]),
    ("AKDT", &["America/Anchorage"]),
    ("HST", &["Pacific/Honolulu", "America/Adak"]),
    ("HDT", &["America/Adak"]),
    ("AST", &["America/Puerto_Rico", "America/Halifax", "America/Barbados"]),
    ("ADT", &["America/Halifax"]),
    ("NST", &["America/St_Johns"]),
    ("NDT", &["America/St_Johns"]),
    ("JST", &["Asia/Tokyo"]),
    ("KST", &["Asia/Seoul"]),
    ("HKT", &["Asia/Hong_Kong"]),
    ("AEST", &["Australia/Sydney", "Australia/Brisbane", "Australia/Melbourne", "Australia/Hobart"]),
    ("AEDT", &["Australia/Sydney", "Australia/Melbourne", "Australia/Hobart"]),
    ("ACST", &["Australia/Adelaide", "Australia/Darwin"]),
    ("ACDT", &["Australia/Adelaide"]),
    ("AWST", &["Australia/Perth"]),
    ("NZST", &["Pacific/Auckland"]),
    ("NZDT", &["Pacific/Auckland"]),
    ("ChST", &["Pacific/Guam"]),
    ("SST", &["Pacific/Pago_Pago"]),
];

impl TimezoneResolver for StaticTimezones {
    fn zones(&self, abbreviation: &str) -> Vec<String> {
        ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| *abbr == abbreviation)
            .map(|(_, zones)| zones.iter().map(|z| z.to_string()).collect())
            .unwrap_or_default()
    }
}
