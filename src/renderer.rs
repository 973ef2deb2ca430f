//! # Forecast Terminal Rendering
//!
//! Formats forecasts, search results and break details as plain text. The
//! `render_*` functions build strings so output can be checked in tests; the
//! `draw_*` functions print them.
//!
//! ## Layout
//! ```text
//! Sat 15 Jun 2024
//!   Time  Rating      Swell             Energy   Wind
//!   02:00 ***         1.2m 10s W        312 kJ   24 km/h NNE off
//!                     + 0.4m 6s WSW
//! ```
//! In compact mode each day collapses to a single summary line.

use crate::config::DisplayConfig;
use crate::fields::EXTREME_RATING;
use crate::surf_data::{Break, BreakSearchResult};
use crate::{DailyForecast, ForecastIssue, HourlyForecast, Swell, Wind};
use std::fmt::Write;

const RATING_WIDTH: usize = 10;
const SWELL_WIDTH: usize = 17;
const ENERGY_WIDTH: usize = 8;

/// Stars for 0-10, `!` marker for extreme conditions.
fn format_rating(hour: &HourlyForecast) -> String {
    let rating = if hour.is_extreme() {
        "! extreme".to_string()
    } else {
        "*".repeat(usize::from(hour.rating))
    };
    format!("{rating:<RATING_WIDTH$}")
}

/// Height with one decimal, period in whole seconds, origin compass point.
fn format_swell(swell: &Swell) -> String {
    format!(
        "{:.1}m {:.0}s {}",
        swell.wave_height_m, swell.period_s, swell.direction_from_compass
    )
    .trim_end()
    .to_string()
}

fn format_energy(kj: f64) -> String {
    format!("{kj:.0} kJ")
}

fn format_wind(wind: &Wind) -> String {
    format!(
        "{:.0} km/h {} {}",
        wind.speed_kmh, wind.direction_from_compass, wind.state
    )
}

fn render_hour(out: &mut String, hour: &HourlyForecast, display: &DisplayConfig) {
    let _ = writeln!(
        out,
        "  {} {} {:<SWELL_WIDTH$} {:<ENERGY_WIDTH$} {}",
        hour.timestamp.format("%H:%M"),
        format_rating(hour),
        format_swell(&hour.swells.primary),
        format_energy(hour.wave_energy_kj),
        format_wind(&hour.wind),
    );

    if display.show_secondary_swells {
        let indent = " ".repeat(2 + 5 + 1 + RATING_WIDTH + 1);
        for swell in &hour.swells.secondary {
            let _ = writeln!(out, "{indent}+ {}", format_swell(swell));
        }
    }
}

/// `(min, max)` of a value over a day's hours.
fn day_range(day: &DailyForecast, value: impl Fn(&HourlyForecast) -> f64) -> (f64, f64) {
    day.hourly
        .iter()
        .map(value)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        })
}

fn render_day_summary(day: &DailyForecast) -> String {
    let date = day.date.format("%a %d %b");
    if day.hourly.is_empty() {
        return format!("{date}  no data");
    }

    let best = day.hourly.iter().map(|h| h.rating).max().unwrap_or_default();
    let (low, high) = day_range(day, |h| h.swells.primary.wave_height_m);
    let (_, energy) = day_range(day, |h| h.wave_energy_kj);
    let (calm, gust) = day_range(day, |h| h.wind.speed_kmh);

    let best = if best == EXTREME_RATING {
        "!".to_string()
    } else {
        format!("{best}/10")
    };

    format!(
        "{date}  best {best:<5} swell {low:.1}-{high:.1}m  energy {energy:.0} kJ  wind {calm:.0}-{gust:.0} km/h"
    )
}

/// Renders a forecast as text, honoring the display settings.
pub fn render_forecast(issue: &ForecastIssue, display: &DisplayConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Issued {} ({})",
        issue.issued_at.format("%a %-d %b %Y %H:%M"),
        issue.timezone
    );

    for day in issue.daily.iter().take(display.max_days) {
        if display.compact {
            let _ = writeln!(out, "{}", render_day_summary(day));
            continue;
        }

        let _ = writeln!(out, "\n{}", day.date.format("%a %-d %b %Y"));
        let _ = writeln!(
            out,
            "  Time  {:<RATING_WIDTH$} {:<SWELL_WIDTH$} {:<ENERGY_WIDTH$} Wind",
            "Rating", "Swell", "Energy"
        );
        for hour in &day.hourly {
            render_hour(&mut out, hour, display);
        }
    }

    let hidden = issue.daily.len().saturating_sub(display.max_days);
    if hidden > 0 {
        let _ = writeln!(out, "\n({hidden} more days not shown)");
    }

    out
}

pub fn render_break(spot: &Break) -> String {
    format!("{}, {} (#{}, {})", spot.name, spot.country_name, spot.id, spot.slug)
}

pub fn render_search_results(results: &[BreakSearchResult]) -> String {
    if results.is_empty() {
        return "No surf breaks found\n".to_string();
    }

    let width = results
        .iter()
        .map(|r| r.id.to_string().len())
        .max()
        .unwrap_or_default();

    results.iter().fold(String::new(), |mut out, result| {
        let _ = writeln!(
            out,
            "{:>width$}  {}, {}",
            result.id, result.name, result.country_name
        );
        out
    })
}

/// Render a forecast to the terminal.
pub fn draw_ascii(issue: &ForecastIssue, display: &DisplayConfig) {
    print!("{}", render_forecast(issue, display));
}
