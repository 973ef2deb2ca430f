//! # Row Extraction
//!
//! The forecast table is laid out as one row per series, with one cell per
//! hour across all days. Cells that close a day carry an `is-day-end` class,
//! which is the only signal for regrouping the flat cell run into days.

use crate::dom::{self, DomNode, Matcher};
use crate::error::{ExtractError, StageExt};
use crate::fields;

const CELL: Matcher<'static> = Matcher::HasClasses(&["forecast-table__cell"]);
const DAY_END: &str = "is-day-end";

/// Locates one series row beneath the table root.
#[derive(Debug, Clone, Copy)]
pub struct RowAnchor {
    /// Name of a single cell value, used in errors
    pub cell: &'static str,
    pub matcher: Matcher<'static>,
}

const fn named_row(cell: &'static str, matchers: &'static [Matcher<'static>]) -> RowAnchor {
    RowAnchor {
        cell,
        matcher: Matcher::All(matchers),
    }
}

pub const DAYS: RowAnchor = named_row(
    "day",
    &[
        Matcher::HasClasses(&["forecast-table__row", "forecast-table-days"]),
        Matcher::AttrEquals("data-row-name", "days"),
    ],
);

pub const HOURS: RowAnchor = named_row(
    "hour",
    &[
        Matcher::HasClasses(&["forecast-table__row", "forecast-table-time"]),
        Matcher::AttrEquals("data-row-name", "time"),
    ],
);

pub const RATINGS: RowAnchor = named_row(
    "rating",
    &[
        Matcher::HasClasses(&["forecast-table__row", "forecast-table-rating"]),
        Matcher::AttrEquals("data-row-name", "rating"),
    ],
);

pub const SWELLS: RowAnchor = named_row(
    "swell",
    &[
        Matcher::ClassEquals("forecast-table__row"),
        Matcher::AttrEquals("data-row-name", "wave-height"),
    ],
);

pub const WAVE_ENERGIES: RowAnchor = named_row(
    "wave energy",
    &[
        Matcher::ClassEquals("forecast-table__row"),
        Matcher::AttrEquals("data-row-name", "energy"),
    ],
);

pub const WINDS: RowAnchor = named_row(
    "wind",
    &[
        Matcher::ClassEquals("forecast-table__row"),
        Matcher::AttrEquals("data-row-name", "wind"),
    ],
);

pub const WIND_STATES: RowAnchor = named_row(
    "wind state",
    &[
        Matcher::ClassEquals("forecast-table__row"),
        Matcher::AttrEquals("data-row-name", "wind-state"),
    ],
);

fn find_row<'a, N: DomNode<'a>>(table: N, anchor: &RowAnchor) -> Result<N, ExtractError> {
    dom::find_first(table, &anchor.matcher).ok_or(ExtractError::RowNotFound(anchor.cell))
}

fn cells<'a, N: DomNode<'a>>(row: N) -> impl Iterator<Item = N> + 'a
where
    N: 'a,
{
    dom::descendants(row).filter(|n| CELL.matches(*n))
}

/// Day-of-month per day column.
pub fn extract_days<'a, N: DomNode<'a> + 'a>(table: N) -> Result<Vec<u32>, ExtractError> {
    let row = find_row(table, &DAYS)?;
    cells(row)
        .map(|cell| fields::scrape_day(cell).stage(DAYS.cell))
        .collect()
}

/// Parses every cell of a series row and groups the values by day.
///
/// Cells after the last day-end marker belong to no complete day and are
/// dropped; the assembler's length checks report the shortfall.
pub fn extract_grouped<'a, N, T, F>(
    table: N,
    anchor: &RowAnchor,
    parse: F,
) -> Result<Vec<Vec<T>>, ExtractError>
where
    N: DomNode<'a> + 'a,
    F: Fn(N) -> Result<T, ExtractError>,
{
    let row = find_row(table, anchor)?;

    let (days, unfinished) = cells(row).try_fold(
        (Vec::new(), Vec::new()),
        |(mut days, mut day), cell| {
            day.push(parse(cell).stage(anchor.cell)?);
            if cell.has_class(DAY_END) {
                days.push(std::mem::take(&mut day));
            }
            Ok::<_, ExtractError>((days, day))
        },
    )?;

    if !unfinished.is_empty() {
        tracing::debug!(
            row = anchor.cell,
            cells = unfinished.len(),
            "dropping cells after the last day end"
        );
    }

    Ok(days)
}
