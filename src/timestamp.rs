//! # Timestamp Reconstruction
//!
//! The forecast page never prints a complete timestamp. What it does print:
//! - an "issued at" sentence with a 12-hour clock, day, short month, year and a
//!   timezone token that is either a raw offset (`+06`) or an abbreviation (`CEST`)
//! - one day-of-month number per table column, with no month or year at all
//! - a 12-hour clock label per hourly column
//!
//! This module turns those fragments back into absolute instants.

use crate::error::ExtractError;
use crate::timezones::TimezoneResolver;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone,
};
use chrono_tz::Tz;
use std::fmt;

/// Number of space-separated tokens in the issuance sentence.
pub const BANNER_TOKENS: usize = 12;

const BANNER_HOUR: usize = 5;
const BANNER_PERIOD: usize = 6;
const BANNER_DAY: usize = 8;
const BANNER_MONTH: usize = 9;
const BANNER_YEAR: usize = 10;
const BANNER_ZONE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPeriod {
    Am,
    Pm,
}

pub fn parse_clock_period(s: &str) -> Result<ClockPeriod, ExtractError> {
    match s.trim().to_ascii_uppercase().as_str() {
        "AM" => Ok(ClockPeriod::Am),
        "PM" => Ok(ClockPeriod::Pm),
        _ => Err(ExtractError::invalid("clock period", s)),
    }
}

/// Parses a 12-hour clock hour in `0..=12`. `0` is read as `12`.
pub fn parse_twelve_hour(s: &str) -> Result<u32, ExtractError> {
    let hour: i64 = s
        .trim()
        .parse()
        .map_err(|_| ExtractError::NotNumeric(s.to_string()))?;

    match hour {
        0 => Ok(12),
        1..=12 => Ok(hour as u32),
        _ => Err(ExtractError::out_of_range("12-hour clock hour", s)),
    }
}

pub fn to_twenty_four_hour(hour: u32, period: ClockPeriod) -> u32 {
    match (hour, period) {
        (12, ClockPeriod::Am) => 0,
        (12, ClockPeriod::Pm) => 12,
        (h, ClockPeriod::Am) => h,
        (h, ClockPeriod::Pm) => h + 12,
    }
}

/// Hour text plus AM/PM text to a 24-hour clock hour.
pub fn convert_hour(hour: &str, period: &str) -> Result<u32, ExtractError> {
    let hour = parse_twelve_hour(hour)?;
    let period = parse_clock_period(period)?;
    Ok(to_twenty_four_hour(hour, period))
}

pub fn parse_day_of_month(s: &str) -> Result<u32, ExtractError> {
    let day: i64 = s
        .trim()
        .parse()
        .map_err(|_| ExtractError::NotNumeric(s.to_string()))?;

    if !(1..=31).contains(&day) {
        return Err(ExtractError::out_of_range("day of month", s));
    }
    Ok(day as u32)
}

pub fn parse_short_month(s: &str) -> Result<u32, ExtractError> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    MONTHS
        .iter()
        .position(|m| *m == s)
        .map(|i| i as u32 + 1)
        .ok_or_else(|| ExtractError::invalid("short month", s))
}

/// The zone a break's timestamps are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteZone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl SiteZone {
    /// Pins a wall-clock time to this zone.
    ///
    /// Wall-clock times skipped by a DST jump move forward by the size of the
    /// jump; repeated ones resolve to the earlier instant.
    pub fn localize(&self, local: NaiveDateTime) -> Result<DateTime<FixedOffset>, ExtractError> {
        let instant = match self {
            SiteZone::Fixed(offset) => localize_in(offset, local),
            SiteZone::Named(tz) => localize_in(tz, local),
        };
        instant.ok_or_else(|| ExtractError::UnexpectedFormat(format!("{local} in {self}")))
    }
}

impl fmt::Display for SiteZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteZone::Fixed(offset) => write!(f, "{offset}"),
            SiteZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn localize_in<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        LocalResult::None => {
            let before = local.checked_sub_signed(Duration::days(1))?;
            let offset = zone.offset_from_utc_datetime(&before).fix();
            let utc = local.checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))?;
            Some(zone.from_utc_datetime(&utc).fixed_offset())
        }
    }
}

/// Resolves a timezone token: `+HH`/`-HH` offsets directly, anything else
/// through `resolver`, taking its first candidate.
pub fn parse_timezone(
    token: &str,
    resolver: &dyn TimezoneResolver,
) -> Result<SiteZone, ExtractError> {
    if token.starts_with('+') || token.starts_with('-') {
        return parse_offset(token).map(SiteZone::Fixed);
    }

    let zones = resolver.zones(token);
    let first = zones
        .first()
        .ok_or_else(|| ExtractError::UnknownTimezone(token.to_string()))?;
    let tz: Tz = first
        .parse()
        .map_err(|_| ExtractError::UnknownTimezone(first.clone()))?;

    if zones.len() > 1 {
        tracing::debug!(
            abbreviation = token,
            zone = %first,
            candidates = zones.len(),
            "ambiguous timezone abbreviation, using first candidate"
        );
    }

    Ok(SiteZone::Named(tz))
}

fn parse_offset(token: &str) -> Result<FixedOffset, ExtractError> {
    let (sign, digits) = token.split_at(1);
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExtractError::invalid("timezone offset", token));
    }

    let hours: i32 = digits
        .parse()
        .map_err(|_| ExtractError::invalid("timezone offset", token))?;
    let seconds = if sign == "-" { -hours * 3600 } else { hours * 3600 };

    FixedOffset::east_opt(seconds).ok_or_else(|| ExtractError::out_of_range("timezone offset", token))
}

/// When a forecast was issued, as printed on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueStamp {
    pub local: NaiveDateTime,
    pub zone: SiteZone,
}

impl IssueStamp {
    pub fn instant(&self) -> Result<DateTime<FixedOffset>, ExtractError> {
        self.zone.localize(self.local)
    }
}

/// Parses the issuance sentence, e.g. `" Wave forecast issued at 5 AM on 14 Jun 2024 CEST"`.
///
/// Tokens are split on single spaces, so a leading space counts as an empty token.
pub fn parse_issue_banner(
    text: &str,
    resolver: &dyn TimezoneResolver,
) -> Result<IssueStamp, ExtractError> {
    let parts: Vec<&str> = text.split(' ').collect();
    if parts.len() != BANNER_TOKENS {
        return Err(ExtractError::UnexpectedFormat(format!("issue text {text:?}")));
    }

    let hour = convert_hour(parts[BANNER_HOUR], parts[BANNER_PERIOD])?;
    let day = parse_day_of_month(parts[BANNER_DAY])?;
    let month = parse_short_month(parts[BANNER_MONTH])?;
    let year: i32 = parts[BANNER_YEAR]
        .parse()
        .map_err(|_| ExtractError::NotNumeric(parts[BANNER_YEAR].to_string()))?;
    let zone = parse_timezone(parts[BANNER_ZONE].trim_end(), resolver)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ExtractError::UnexpectedFormat(format!("issue date {year}-{month:02}-{day:02}")))?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| ExtractError::out_of_range("hour", hour.to_string()))?;

    Ok(IssueStamp {
        local: date.and_time(time),
        zone,
    })
}

/// Rebuilds full dates for a run of day-of-month numbers.
///
/// Starts in `year`/`month`; whenever the day number drops the month
/// advances (December wraps to January), and whenever the month then drops
/// below the previous date's month the year advances. Only sound for the
/// short consecutive-day windows forecast tables cover.
pub fn infer_dates(year: i32, month: u32, days: &[u32]) -> Result<Vec<NaiveDate>, ExtractError> {
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(days.len());
    let (mut year, mut month) = (year, month);

    for &day in days {
        if let Some(previous) = dates.last() {
            if day < previous.day() {
                month = if month == 12 { 1 } else { month + 1 };
            }
            if month < previous.month() {
                year += 1;
            }
        }

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ExtractError::UnexpectedFormat(format!("day {day} does not exist in {year}-{month:02}"))
        })?;
        dates.push(date);
    }

    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolver() -> HashMap<String, Vec<String>> {
        let mut map = HashMap::new();
        map.insert(
            "CEST".to_string(),
            vec!["Europe/Paris".to_string(), "Africa/Ceuta".to_string()],
        );
        map.insert("BAD".to_string(), vec!["Not/AZone".to_string()]);
        map
    }

    #[test]
    fn test_hour_conversion_covers_every_valid_pair() {
        assert_eq!(convert_hour("12", "AM").unwrap(), 0);
        assert_eq!(convert_hour("12", "PM").unwrap(), 12);
        for h in 1..=11 {
            assert_eq!(convert_hour(&h.to_string(), "AM").unwrap(), h);
            assert_eq!(convert_hour(&h.to_string(), "PM").unwrap(), h + 12);
        }
    }

    #[test]
    fn test_zero_hour_behaves_like_twelve() {
        assert_eq!(convert_hour("0", "AM").unwrap(), 0);
        assert_eq!(convert_hour("0", "PM").unwrap(), 12);
    }

    #[test]
    fn test_invalid_hours_fail() {
        assert!(matches!(
            convert_hour("13", "AM"),
            Err(ExtractError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert_hour("-1", "PM"),
            Err(ExtractError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert_hour("noon", "PM"),
            Err(ExtractError::NotNumeric(_))
        ));
        assert!(matches!(
            convert_hour("5", "XM"),
            Err(ExtractError::Invalid { .. })
        ));
        assert_eq!(convert_hour("5", "pm").unwrap(), 17);
    }

    #[test]
    fn test_short_months() {
        assert_eq!(parse_short_month("Jan").unwrap(), 1);
        assert_eq!(parse_short_month("Dec").unwrap(), 12);
        assert!(parse_short_month("June").is_err());
    }

    #[test]
    fn test_banner_with_abbreviation_takes_first_zone() {
        let stamp =
            parse_issue_banner(" Wave forecast issued at 5 PM on 14 Jun 2024 CEST", &resolver())
                .unwrap();

        assert_eq!(stamp.zone, SiteZone::Named(chrono_tz::Europe::Paris));
        let at = stamp.instant().unwrap();
        assert_eq!(at.to_rfc3339(), "2024-06-14T17:00:00+02:00");
    }

    #[test]
    fn test_banner_with_raw_offset() {
        let stamp =
            parse_issue_banner(" Wave forecast issued at 12 AM on 3 Feb 2025 -05", &resolver())
                .unwrap();
        assert_eq!(stamp.instant().unwrap().to_rfc3339(), "2025-02-03T00:00:00-05:00");

        let stamp =
            parse_issue_banner(" Wave forecast issued at 7 AM on 3 Feb 2025 +06", &resolver())
                .unwrap();
        assert_eq!(stamp.instant().unwrap().to_rfc3339(), "2025-02-03T07:00:00+06:00");
    }

    #[test]
    fn test_banner_with_daylight_abbreviations() {
        use crate::timezones::StaticTimezones;

        let stamp =
            parse_issue_banner(" Wave forecast issued at 5 PM on 14 Jun 2024 IDT", &StaticTimezones)
                .unwrap();
        assert_eq!(stamp.zone, SiteZone::Named(chrono_tz::Asia::Jerusalem));
        assert_eq!(stamp.instant().unwrap().to_rfc3339(), "2024-06-14T17:00:00+03:00");

        let stamp =
            parse_issue_banner(" Wave forecast issued at 8 AM on 2 Jul 2024 HDT", &StaticTimezones)
                .unwrap();
        assert_eq!(stamp.zone, SiteZone::Named(chrono_tz::America::Adak));
        assert_eq!(stamp.instant().unwrap().to_rfc3339(), "2024-07-02T08:00:00-09:00");

        assert!(parse_issue_banner(
            " Wave forecast issued at 5 PM on 14 Jun 2024 MEST",
            &StaticTimezones
        )
        .is_ok());
    }

    #[test]
    fn test_banner_token_count_must_match() {
        let err = parse_issue_banner("Wave forecast issued at 5 PM on 14 Jun 2024 CEST", &resolver())
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }

    #[test]
    fn test_unknown_timezones() {
        let err = parse_timezone("XYZ", &resolver()).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownTimezone(ref t) if t == "XYZ"));

        let err = parse_timezone("BAD", &resolver()).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownTimezone(ref t) if t == "Not/AZone"));

        assert!(parse_timezone("+6", &resolver()).is_err());
        assert!(parse_timezone("+0a", &resolver()).is_err());
    }

    #[test]
    fn test_rollover_advances_month_once() {
        let dates = infer_dates(2024, 4, &[28, 29, 30, 1, 2]).unwrap();
        let months: Vec<u32> = dates.iter().map(|d| d.month()).collect();
        assert_eq!(months, vec![4, 4, 4, 5, 5]);
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_rollover_crosses_year() {
        let dates = infer_dates(2024, 12, &[30, 31, 1, 2]).unwrap();
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn test_rollover_rejects_impossible_day() {
        let err = infer_dates(2024, 4, &[31]).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }

    #[test]
    fn test_localize_moves_through_dst_gap() {
        let zone = SiteZone::Named(chrono_tz::Europe::Paris);
        let gap = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(zone.localize(gap).unwrap().to_rfc3339(), "2024-03-31T03:30:00+02:00");

        let fold = NaiveDate::from_ymd_opt(2024, 10, 27)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(zone.localize(fold).unwrap().to_rfc3339(), "2024-10-27T02:30:00+02:00");
    }
}
