use thiserror::Error;

use super::catalog::FieldKind;

/// Errors raised by catalog, selection and session operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportingError {
    #[error("unknown {kind} '{id}'")]
    UnknownField { kind: FieldKind, id: String },

    #[error("duplicate {kind} '{id}' in metadata")]
    DuplicateField { kind: FieldKind, id: String },

    #[error("reporting metadata has not been loaded")]
    MetadataNotLoaded,

    #[error("no account selected")]
    NoAccountSelected,

    #[error("no date range set for the report")]
    MissingDateRange,

    #[error("invalid date '{value}' (expected format {format})")]
    InvalidDate { value: String, format: String },

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("incompatible selection: {0}")]
    IncompatibleSelection(String),

    #[error("unsupported report layout: {0}")]
    UnsupportedReport(String),
}

pub type ReportingResult<T> = Result<T, ReportingError>;
