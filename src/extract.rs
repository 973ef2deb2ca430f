//! # Forecast Page Extraction
//!
//! Entry points that take a parsed page and return typed data. The table
//! locator here is deliberately strict: if either anchor is missing the page
//! layout has changed upstream and extraction stops with
//! [`ExtractError::StructureNotFound`] instead of guessing.

use crate::assemble::{assemble, RawSeries};
use crate::dom::{self, DomNode, Matcher};
use crate::error::{ExtractError, StageExt};
use crate::fields;
use crate::rows::{self, extract_grouped};
use crate::timestamp::{parse_issue_banner, IssueStamp};
use crate::timezones::TimezoneResolver;
use crate::ForecastIssue;
use scraper::Html;

const FORECAST_TABLE: Matcher<'static> = Matcher::ClassEquals("forecast-table__basic");
const ISSUE_BANNER: Matcher<'static> = Matcher::ClassEquals("break-header-dynamic__issued");

const BREAK_NAV: Matcher<'static> = Matcher::IdEquals("dropformcont-nav");
const COUNTRY_SELECT: Matcher<'static> = Matcher::IdEquals("country_id");
const BREAK_SELECT: Matcher<'static> = Matcher::IdEquals("location_filename_part");
const SELECTED: Matcher<'static> = Matcher::HasAttr("selected");

/// The two nodes every forecast page must have.
#[derive(Debug, Clone, Copy)]
pub struct Anchors<N> {
    pub banner: N,
    pub table: N,
}

pub fn locate<'a, N: DomNode<'a>>(root: N) -> Result<Anchors<N>, ExtractError> {
    let banner = dom::find_first(root, &ISSUE_BANNER)
        .ok_or(ExtractError::StructureNotFound("issue banner"))?;
    let table = dom::find_first(root, &FORECAST_TABLE)
        .ok_or(ExtractError::StructureNotFound("forecast table"))?;

    Ok(Anchors { banner, table })
}

fn scrape_issue_stamp<'a, N: DomNode<'a>>(
    banner: N,
    resolver: &dyn TimezoneResolver,
) -> Result<IssueStamp, ExtractError> {
    let text = dom::last_child(banner)
        .and_then(|node| node.text())
        .ok_or(ExtractError::StructureNotFound("issue text"))?;
    parse_issue_banner(text, resolver)
}

/// Runs the whole pipeline below `root`.
pub fn scrape_forecast<'a, N: DomNode<'a> + 'a>(
    root: N,
    resolver: &dyn TimezoneResolver,
) -> Result<ForecastIssue, ExtractError> {
    let Anchors { banner, table } = locate(root).stage("forecast page")?;

    let issue = scrape_issue_stamp(banner, resolver).stage("issue date")?;

    let series = RawSeries {
        days: rows::extract_days(table).stage("days")?,
        hours: extract_grouped(table, &rows::HOURS, fields::scrape_hour).stage("hours")?,
        ratings: extract_grouped(table, &rows::RATINGS, fields::scrape_rating).stage("ratings")?,
        swells: extract_grouped(table, &rows::SWELLS, fields::scrape_swells).stage("swells")?,
        wave_energies: extract_grouped(table, &rows::WAVE_ENERGIES, fields::scrape_wave_energy)
            .stage("wave energies")?,
        winds: extract_grouped(table, &rows::WINDS, fields::scrape_wind).stage("winds")?,
        wind_states: extract_grouped(table, &rows::WIND_STATES, fields::scrape_wind_state)
            .stage("wind states")?,
    };

    tracing::debug!(
        days = series.days.len(),
        hours = series.hours.iter().map(Vec::len).sum::<usize>(),
        "extracted forecast series"
    );

    assemble(issue, series).stage("forecast")
}

/// Extracts the forecast from a parsed latest-forecast page.
pub fn extract_forecast(
    doc: &Html,
    resolver: &dyn TimezoneResolver,
) -> Result<ForecastIssue, ExtractError> {
    scrape_forecast(dom::document_root(doc), resolver)
}

/// Break name and country as shown in a break page's navigation selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakPage {
    pub name: String,
    pub country_name: String,
}

fn selected_option<'a, N: DomNode<'a>>(
    nav: N,
    select: &Matcher<'_>,
    missing_select: &'static str,
    missing_option: &'static str,
) -> Result<String, ExtractError> {
    let select = dom::find_first(nav, select).ok_or(ExtractError::StructureNotFound(missing_select))?;
    dom::find_first(select, &SELECTED)
        .and_then(dom::first_text)
        .map(str::to_string)
        .ok_or(ExtractError::StructureNotFound(missing_option))
}

pub fn scrape_break_page<'a, N: DomNode<'a>>(root: N) -> Result<BreakPage, ExtractError> {
    let nav =
        dom::find_first(root, &BREAK_NAV).ok_or(ExtractError::StructureNotFound("navigation"))?;

    let country_name =
        selected_option(nav, &COUNTRY_SELECT, "country select", "selected country")?;
    let name = selected_option(nav, &BREAK_SELECT, "surf break select", "selected surf break")?;

    Ok(BreakPage { name, country_name })
}

pub fn extract_break_page(doc: &Html) -> Result<BreakPage, ExtractError> {
    scrape_break_page(dom::document_root(doc)).stage("surf break")
}
