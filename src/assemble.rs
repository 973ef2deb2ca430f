//! # Forecast Assembly
//!
//! Zips the seven parallel series into the nested [`ForecastIssue`] model.
//! Nothing is built until every series has been checked against the days
//! (outer length) and, day by day, against the hours (inner length): an hour
//! label paired with a wind reading from a different hour is worse than no
//! forecast at all.

use crate::error::ExtractError;
use crate::fields::WindVector;
use crate::timestamp::{infer_dates, IssueStamp, SiteZone};
use crate::{DailyForecast, ForecastIssue, HourlyForecast, Swells, Wind};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Raw per-series output of the row extractor.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub days: Vec<u32>,
    pub hours: Vec<Vec<u32>>,
    pub ratings: Vec<Vec<u8>>,
    pub swells: Vec<Vec<Swells>>,
    pub wave_energies: Vec<Vec<f64>>,
    pub winds: Vec<Vec<WindVector>>,
    pub wind_states: Vec<Vec<String>>,
}

impl RawSeries {
    fn check_days(&self) -> Result<(), ExtractError> {
        let outer = [
            ("hours", self.hours.len()),
            ("ratings", self.ratings.len()),
            ("swells", self.swells.len()),
            ("wave energies", self.wave_energies.len()),
            ("winds", self.winds.len()),
            ("wind states", self.wind_states.len()),
        ];
        check_lengths(&outer, self.days.len(), || "days".to_string())
    }

    fn check_hours(&self, day: usize) -> Result<(), ExtractError> {
        let inner = [
            ("ratings", self.ratings[day].len()),
            ("swells", self.swells[day].len()),
            ("wave energies", self.wave_energies[day].len()),
            ("winds", self.winds[day].len()),
            ("wind states", self.wind_states[day].len()),
        ];
        check_lengths(&inner, self.hours[day].len(), || {
            format!("hours of day {}", day + 1)
        })
    }
}

fn check_lengths(
    lengths: &[(&'static str, usize)],
    expected: usize,
    scope: impl Fn() -> String,
) -> Result<(), ExtractError> {
    match lengths.iter().find(|(_, actual)| *actual != expected) {
        Some(&(series, actual)) => Err(ExtractError::MisalignedSeries {
            series,
            scope: scope(),
            expected,
            actual,
        }),
        None => Ok(()),
    }
}

/// Validates alignment, then builds the forecast.
pub fn assemble(issue: IssueStamp, series: RawSeries) -> Result<ForecastIssue, ExtractError> {
    series.check_days()?;
    for day in 0..series.days.len() {
        series.check_hours(day)?;
    }

    let issued_at = issue.instant()?;
    let dates = infer_dates(issue.local.year(), issue.local.month(), &series.days)?;
    if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(ExtractError::UnexpectedFormat(format!(
            "day {} does not follow {}",
            pair[1], pair[0]
        )));
    }

    let RawSeries {
        hours,
        ratings,
        swells,
        wave_energies,
        winds,
        wind_states,
        ..
    } = series;

    let daily = dates
        .into_iter()
        .zip(hours)
        .zip(ratings)
        .zip(swells)
        .zip(wave_energies)
        .zip(winds)
        .zip(wind_states)
        .map(|((((((date, hours), ratings), swells), energies), winds), states)| {
            let columns = DayColumns {
                hours,
                ratings,
                swells,
                energies,
                winds,
                states,
            };
            build_day(&issue.zone, date, columns)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ForecastIssue {
        issued_at,
        timezone: issue.zone.to_string(),
        daily,
    })
}

struct DayColumns {
    hours: Vec<u32>,
    ratings: Vec<u8>,
    swells: Vec<Swells>,
    energies: Vec<f64>,
    winds: Vec<WindVector>,
    states: Vec<String>,
}

fn build_day(
    zone: &SiteZone,
    date: NaiveDate,
    columns: DayColumns,
) -> Result<DailyForecast, ExtractError> {
    let midnight = zone.localize(date.and_time(NaiveTime::MIN))?;

    let hourly = columns
        .hours
        .into_iter()
        .zip(columns.ratings)
        .zip(columns.swells)
        .zip(columns.energies)
        .zip(columns.winds)
        .zip(columns.states)
        .map(|(((((hour, rating), swells), energy), wind), state)| {
            let time = NaiveTime::from_hms_opt(hour, 0, 0)
                .ok_or_else(|| ExtractError::out_of_range("hour", hour.to_string()))?;

            Ok(HourlyForecast {
                timestamp: zone.localize(date.and_time(time))?,
                rating,
                swells,
                wave_energy_kj: energy,
                wind: Wind {
                    speed_kmh: wind.speed_kmh,
                    direction_to_degrees: wind.direction_to_degrees,
                    direction_from_compass: wind.direction_from_compass,
                    state,
                },
            })
        })
        .collect::<Result<Vec<_>, ExtractError>>()?;

    Ok(DailyForecast {
        date: midnight,
        hourly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn stamp(year: i32, month: u32, day: u32) -> IssueStamp {
        IssueStamp {
            local: NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(5, 0, 0)
                .unwrap(),
            zone: SiteZone::Fixed(FixedOffset::east_opt(3600).unwrap()),
        }
    }

    fn wind() -> WindVector {
        WindVector {
            speed_kmh: 12.0,
            direction_to_degrees: 90.0,
            direction_from_compass: "W".to_string(),
        }
    }

    /// Series for `days`, each with the given hours.
    fn series(days: &[u32], hours: &[u32]) -> RawSeries {
        fn per_day<T: Clone>(days: &[u32], hourly: Vec<T>) -> Vec<Vec<T>> {
            vec![hourly; days.len()]
        }

        let n = hours.len();
        RawSeries {
            days: days.to_vec(),
            hours: per_day(days, hours.to_vec()),
            ratings: per_day(days, vec![3; n]),
            swells: per_day(days, vec![Swells::default(); n]),
            wave_energies: per_day(days, vec![150.0; n]),
            winds: per_day(days, vec![wind(); n]),
            wind_states: per_day(days, vec!["off".to_string(); n]),
        }
    }

    #[test]
    fn test_builds_nested_forecast() {
        let issue = assemble(stamp(2024, 4, 28), series(&[28, 29, 30, 1, 2], &[2, 14])).unwrap();

        assert_eq!(issue.issued_at.to_rfc3339(), "2024-04-28T05:00:00+01:00");
        assert_eq!(issue.timezone, "+01:00");
        assert_eq!(issue.daily.len(), 5);
        assert_eq!(issue.daily[3].date.to_rfc3339(), "2024-05-01T00:00:00+01:00");

        let hour = &issue.daily[4].hourly[1];
        assert_eq!(hour.timestamp.to_rfc3339(), "2024-05-02T14:00:00+01:00");
        assert_eq!(hour.wind.state, "off");
        assert_eq!(hour.wind.direction_from_compass, "W");
        assert_eq!(hour.wave_energy_kj, 150.0);
    }

    #[test]
    fn test_missing_hour_group_is_misaligned() {
        let mut raw = series(&[10, 11, 12, 13, 14], &[2, 5]);
        raw.hours.pop();

        let err = assemble(stamp(2024, 6, 10), raw).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MisalignedSeries {
                series: "hours",
                expected: 5,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_short_day_is_misaligned() {
        let mut raw = series(&[10, 11], &[2, 5, 8]);
        raw.winds[1].pop();

        let err = assemble(stamp(2024, 6, 10), raw).unwrap_err();
        match err {
            ExtractError::MisalignedSeries {
                series,
                scope,
                expected,
                actual,
            } => {
                assert_eq!(series, "winds");
                assert_eq!(scope, "hours of day 2");
                assert_eq!((expected, actual), (3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeated_day_is_rejected() {
        let err = assemble(stamp(2024, 6, 10), series(&[10, 10], &[2])).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedFormat(_)));
    }
}
