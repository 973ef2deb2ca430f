//! # Cell Parsers
//!
//! One parser per table series. Each takes a single table cell and returns a
//! validated value; anything malformed or out of range is an error, never a
//! silently clamped value.

use crate::dom::{self, DomNode, Matcher};
use crate::error::ExtractError;
use crate::timestamp::{convert_hour, parse_day_of_month};
use crate::{Swell, Swells};
use chrono::Weekday;
use serde::Deserialize;

/// Rating stored for cells that show `!` instead of a score.
pub const EXTREME_RATING: u8 = 11;

const DAY_NAME_ATTR: &str = "data-day-name";
const SWELL_STATE_ATTR: &str = "data-swell-state";
const WIND_SPEED_ATTR: &str = "data-speed";
const TRANSFORM_ATTR: &str = "transform";

const TIME_VALUE: Matcher<'static> = Matcher::ClassEquals("forecast-table__value");
const RATING_VALUE: Matcher<'static> = Matcher::HasClasses(&["star-rating__rating"]);
const WIND_ICON: Matcher<'static> = Matcher::ClassEquals("wind-icon");
const WIND_ARROW: Matcher<'static> = Matcher::ClassEquals("wind-icon__arrow");
const WIND_LETTERS: Matcher<'static> = Matcher::ClassEquals("wind-icon__letters");

/// Parses a day column token such as `Mon_02` into its day of month.
pub fn parse_day_name(value: &str) -> Result<u32, ExtractError> {
    let (weekday, day) = value
        .split_once('_')
        .ok_or_else(|| ExtractError::invalid("day name", value))?;

    if weekday.len() != 3 || weekday.parse::<Weekday>().is_err() || day.len() != 2 {
        return Err(ExtractError::invalid("day name", value));
    }

    parse_day_of_month(day)
}

pub fn scrape_day<'a, N: DomNode<'a>>(cell: N) -> Result<u32, ExtractError> {
    let value = cell
        .attr(DAY_NAME_ATTR)
        .ok_or(ExtractError::StructureNotFound("day name attribute"))?;
    parse_day_name(value)
}

/// Hour cells hold two values: the 12-hour number and AM/PM.
pub fn scrape_hour<'a, N: DomNode<'a>>(cell: N) -> Result<u32, ExtractError> {
    let values = dom::find_all(cell, &TIME_VALUE);
    let [hour, period] = values.as_slice() else {
        return Err(ExtractError::UnexpectedFormat(format!(
            "expected 2 time values, found {}",
            values.len()
        )));
    };

    let hour = dom::first_text(*hour).ok_or(ExtractError::StructureNotFound("hour text"))?;
    let period =
        dom::first_text(*period).ok_or(ExtractError::StructureNotFound("clock period text"))?;

    convert_hour(hour, period)
}

pub fn parse_rating(s: &str) -> Result<u8, ExtractError> {
    if s == "!" {
        return Ok(EXTREME_RATING);
    }

    let rating: i64 = s
        .parse()
        .map_err(|_| ExtractError::NotNumeric(s.to_string()))?;

    if !(0..=10).contains(&rating) {
        return Err(ExtractError::out_of_range("rating", s));
    }
    Ok(rating as u8)
}

pub fn scrape_rating<'a, N: DomNode<'a>>(cell: N) -> Result<u8, ExtractError> {
    let node = dom::find_first(cell, &RATING_VALUE)
        .ok_or(ExtractError::StructureNotFound("rating node"))?;
    let text = dom::first_text(node).ok_or(ExtractError::StructureNotFound("rating text"))?;
    parse_rating(text)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SwellPayload {
    period: f64,
    angle: f64,
    letters: String,
    height: f64,
}

impl TryFrom<SwellPayload> for Swell {
    type Error = ExtractError;

    fn try_from(p: SwellPayload) -> Result<Self, Self::Error> {
        if p.period < 0.0 {
            return Err(ExtractError::out_of_range("swell period", p.period.to_string()));
        }
        if p.height < 0.0 {
            return Err(ExtractError::out_of_range("swell height", p.height.to_string()));
        }

        Ok(Swell {
            period_s: p.period,
            direction_to_degrees: check_degrees(p.angle, &p.angle.to_string())?,
            direction_from_compass: p.letters,
            wave_height_m: p.height,
        })
    }
}

/// Decodes a swell-state payload; `null` entries are skipped and an empty
/// array gives the default [`Swells`].
pub fn parse_swells(payload: &str) -> Result<Swells, ExtractError> {
    let raw: Vec<Option<SwellPayload>> = serde_json::from_str(payload)?;

    let mut swells = raw
        .into_iter()
        .flatten()
        .map(Swell::try_from)
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    Ok(match swells.next() {
        Some(primary) => Swells {
            primary,
            secondary: swells.collect(),
        },
        None => Swells::default(),
    })
}

pub fn scrape_swells<'a, N: DomNode<'a>>(cell: N) -> Result<Swells, ExtractError> {
    let payload = cell
        .attr(SWELL_STATE_ATTR)
        .ok_or(ExtractError::StructureNotFound("swell state attribute"))?;
    parse_swells(payload)
}

fn parse_float(s: &str) -> Result<f64, ExtractError> {
    match s.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ExtractError::NotNumeric(s.to_string())),
    }
}

fn parse_non_negative(field: &'static str, s: &str) -> Result<f64, ExtractError> {
    let value = parse_float(s)?;
    if value < 0.0 {
        return Err(ExtractError::out_of_range(field, s));
    }
    Ok(value)
}

fn check_degrees(value: f64, raw: &str) -> Result<f64, ExtractError> {
    if !(0.0..=360.0).contains(&value) {
        return Err(ExtractError::out_of_range("direction degrees", raw));
    }
    Ok(value)
}

pub fn parse_wave_energy(s: &str) -> Result<f64, ExtractError> {
    parse_non_negative("wave energy", s)
}

pub fn scrape_wave_energy<'a, N: DomNode<'a>>(cell: N) -> Result<f64, ExtractError> {
    let text = dom::first_text(cell).ok_or(ExtractError::StructureNotFound("wave energy text"))?;
    parse_wave_energy(text)
}

pub fn parse_wind_speed(s: &str) -> Result<f64, ExtractError> {
    parse_non_negative("wind speed", s)
}

/// Reads the degrees out of an SVG `rotate(<deg>)` transform.
pub fn parse_rotation(transform: &str) -> Result<f64, ExtractError> {
    let degrees = transform.strip_prefix("rotate(").unwrap_or(transform);
    let degrees = degrees.strip_suffix(')').unwrap_or(degrees);
    check_degrees(parse_float(degrees)?, degrees)
}

/// Wind reading from an icon cell; the state lives in its own row.
#[derive(Debug, Clone, PartialEq)]
pub struct WindVector {
    pub speed_kmh: f64,
    pub direction_to_degrees: f64,
    pub direction_from_compass: String,
}

pub fn scrape_wind<'a, N: DomNode<'a>>(cell: N) -> Result<WindVector, ExtractError> {
    let icon =
        dom::find_first(cell, &WIND_ICON).ok_or(ExtractError::StructureNotFound("wind icon"))?;

    let speed = icon
        .attr(WIND_SPEED_ATTR)
        .ok_or(ExtractError::StructureNotFound("wind speed attribute"))?;
    let speed_kmh = parse_wind_speed(speed)?;

    let arrow =
        dom::find_first(icon, &WIND_ARROW).ok_or(ExtractError::StructureNotFound("wind arrow"))?;
    let transform = arrow
        .attr(TRANSFORM_ATTR)
        .ok_or(ExtractError::StructureNotFound("wind arrow transform"))?;
    let direction_to_degrees = parse_rotation(transform)?;

    let letters = dom::find_first(icon, &WIND_LETTERS)
        .and_then(dom::first_text)
        .ok_or(ExtractError::StructureNotFound("wind direction letters"))?;

    Ok(WindVector {
        speed_kmh,
        direction_to_degrees,
        direction_from_compass: letters.to_string(),
    })
}

/// Every text node of the cell, joined as-is; only a cell with no text at
/// all is rejected.
pub fn scrape_wind_state<'a, N: DomNode<'a>>(cell: N) -> Result<String, ExtractError> {
    let state = dom::text_content(cell);
    if state.is_empty() {
        return Err(ExtractError::invalid("wind state", state));
    }
    Ok(state)
}
