//! # Extraction Errors
//!
//! Every failure the extraction pipeline can produce. Extraction is
//! all-or-nothing, so a single error aborts the whole forecast.
//!
//! Pipeline stages wrap whatever fails beneath them in [`ExtractError::Stage`],
//! which keeps the message readable ("could not scrape winds: ...") while the
//! original cause stays reachable through [`ExtractError::root`].

use thiserror::Error;

/// Errors raised while turning a forecast page into a [`crate::ForecastIssue`].
#[derive(Error, Debug)]
pub enum ExtractError {
    /// An anchor node is missing, which usually means the upstream markup changed
    #[error("could not find {0}")]
    StructureNotFound(&'static str),

    /// The table has no row for the named series
    #[error("could not find {0} row")]
    RowNotFound(&'static str),

    /// Token count or shape did not match what the page is known to render
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),

    /// The timezone token could not be resolved to a zone
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    /// Parallel series disagree on length
    #[error("{series} has {actual} entries but {scope} has {expected}")]
    MisalignedSeries {
        series: &'static str,
        scope: String,
        expected: usize,
        actual: usize,
    },

    #[error("not a number: {0:?}")]
    NotNumeric(String),

    #[error("{field} out of range: {value:?}")]
    OutOfRange { field: &'static str, value: String },

    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },

    #[error("malformed swell payload: {0}")]
    SwellPayload(#[from] serde_json::Error),

    /// Failure inside a named pipeline stage
    #[error("could not scrape {stage}: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<ExtractError>,
    },
}

impl ExtractError {
    /// Strips every stage wrapper and returns the error that started it all.
    pub fn root(&self) -> &ExtractError {
        match self {
            ExtractError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn out_of_range(field: &'static str, value: impl Into<String>) -> Self {
        ExtractError::OutOfRange {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        ExtractError::Invalid {
            field,
            value: value.into(),
        }
    }
}

/// Attaches a stage name to a failing result.
pub trait StageExt<T> {
    fn stage(self, stage: &'static str) -> Result<T, ExtractError>;
}

impl<T> StageExt<T> for Result<T, ExtractError> {
    fn stage(self, stage: &'static str) -> Result<T, ExtractError> {
        self.map_err(|source| ExtractError::Stage {
            stage,
            source: Box::new(source),
        })
    }
}
