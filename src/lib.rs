//! # Surf Glass Core Library
//!
//! Turns surf-forecast.com break pages into typed, timezone-aware forecasts.
//!
//! ## Data Flow
//! 1. **Fetch**: [`surf_data::SurfClient`] downloads the latest forecast page for a break
//! 2. **Locate**: [`extract`] finds the forecast table and the "issued at" banner
//! 3. **Extract**: [`rows`] walks each series row, [`fields`] parses every cell
//! 4. **Reconstruct**: [`timestamp`] rebuilds the issuance instant and each day's date
//! 5. **Assemble**: [`assemble`] checks that all series line up and builds a [`ForecastIssue`]
//!
//! Extraction is all-or-nothing: if the upstream markup changes shape, the
//! caller gets an [`error::ExtractError`] naming the stage that broke rather
//! than a forecast with misaligned hours.
//!
//! ## Core Types
//! - [`ForecastIssue`]: one scrape result, several days at hourly resolution
//! - [`DailyForecast`]: one calendar day of hourly forecasts
//! - [`HourlyForecast`]: rating, swells, wave energy and wind for one hour

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod assemble;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod fields;
pub mod renderer;
pub mod rows;
pub mod surf_data;
pub mod timestamp;
pub mod timezones;

/// A forecast as issued by the site at one point in time.
///
/// All timestamps share the break's local timezone, which is recorded in
/// `timezone` as either an IANA name or a fixed offset such as `+06:00`.
///
/// # Example
/// ```
/// use surf_glass::ForecastIssue;
///
/// let json = r#"{"issued_at":"2024-06-14T05:00:00+02:00","timezone":"Europe/Paris","daily":[]}"#;
/// let issue: ForecastIssue = serde_json::from_str(json).unwrap();
/// assert!(issue.daily.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastIssue {
    /// When the site issued this forecast
    pub issued_at: DateTime<FixedOffset>,
    /// Zone the timestamps are expressed in
    pub timezone: String,
    /// Days in strictly increasing order
    pub daily: Vec<DailyForecast>,
}

/// One day of hourly forecasts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Local midnight of the day
    pub date: DateTime<FixedOffset>,
    pub hourly: Vec<HourlyForecast>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub timestamp: DateTime<FixedOffset>,
    /// Surf quality 0-10, or [`fields::EXTREME_RATING`] when the site shows `!`
    pub rating: u8,
    pub swells: Swells,
    pub wave_energy_kj: f64,
    pub wind: Wind,
}

/// Primary swell plus any secondary components.
///
/// An hour without swell data holds the default value: a zeroed primary
/// swell and no secondaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Swells {
    pub primary: Swell,
    pub secondary: Vec<Swell>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Swell {
    pub period_s: f64,
    /// Direction the swell travels towards, 0-360
    pub direction_to_degrees: f64,
    /// Compass point the swell comes from, e.g. `WSW`
    pub direction_from_compass: String,
    pub wave_height_m: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_kmh: f64,
    /// Direction the wind blows towards, 0-360
    pub direction_to_degrees: f64,
    /// Compass point the wind comes from
    pub direction_from_compass: String,
    /// Free text such as `off` or `cross-on`
    pub state: String,
}

impl HourlyForecast {
    pub fn is_extreme(&self) -> bool {
        self.rating == fields::EXTREME_RATING
    }
}
