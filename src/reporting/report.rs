use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{ReportingError, ReportingResult};

/// Cell value used for periods the report has no row for
pub const NO_DATA: &str = "no data";

/// Column type of a report header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderType {
    Dimension,
    MetricTally,
    MetricRatio,
    MetricCurrency,
    MetricMilliseconds,
    MetricDecimal,
    /// Any type this crate does not know about
    #[serde(other)]
    Other,
}

impl HeaderType {
    pub fn is_metric(&self) -> bool {
        !matches!(self, HeaderType::Dimension | HeaderType::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub name: String,
    #[serde(rename = "type")]
    pub header_type: HeaderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Body of an `accounts.reports.generate` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub headers: Vec<ReportHeader>,
    /// Rows of cells, one cell per header, in header order
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub totals: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub total_matched_rows: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Granularity of the time dimension a report is broken down by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimePeriod {
    Day,
    Month,
}

impl TimePeriod {
    fn from_dimension(name: &str) -> Option<Self> {
        match name {
            "DATE" => Some(TimePeriod::Day),
            "MONTH" => Some(TimePeriod::Month),
            _ => None,
        }
    }

    fn format(&self) -> &'static str {
        match self {
            TimePeriod::Day => "%Y-%m-%d",
            TimePeriod::Month => "%Y-%m",
        }
    }

    fn first_period(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimePeriod::Day => Some(date),
            TimePeriod::Month => date.with_day0(0),
        }
    }

    fn next(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimePeriod::Day => date.succ_opt(),
            TimePeriod::Month => date.checked_add_months(Months::new(1)),
        }
    }

    /// Parse a row's time cell, normalised to the start of its period
    fn parse(&self, value: &str) -> ReportingResult<NaiveDate> {
        let parsed = match self {
            TimePeriod::Day => NaiveDate::parse_from_str(value, "%Y-%m-%d"),
            TimePeriod::Month => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d"),
        };
        parsed.map_err(|_| ReportingError::InvalidDate {
            value: value.to_string(),
            format: self.format().to_string(),
        })
    }
}

impl ReportResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse report response")
    }

    pub fn dimension_headers(&self) -> impl Iterator<Item = &ReportHeader> {
        self.headers
            .iter()
            .filter(|h| h.header_type == HeaderType::Dimension)
    }

    pub fn metric_headers(&self) -> impl Iterator<Item = &ReportHeader> {
        self.headers.iter().filter(|h| h.header_type.is_metric())
    }

    /// Return the rows with one row per day (DATE) or month (MONTH) between
    /// the start and end dates, inclusive. Periods without data get a row of
    /// [`NO_DATA`] cells.
    ///
    /// The report must have exactly one dimension, DATE or MONTH, in the
    /// first column, followed by at least one metric. Rows are expected in
    /// ascending date order.
    pub fn fill_missing_dates(&self) -> ReportingResult<Vec<Vec<String>>> {
        let period = self.time_period()?;

        let mut filled = Vec::new();
        let mut rows = self.rows.iter().peekable();
        let mut cursor = period.first_period(self.start_date);

        while let Some(date) = cursor.filter(|date| *date <= self.end_date) {
            let mut matched = None;
            while let Some(row) = rows.peek() {
                let row_date = period.parse(row.first().map(String::as_str).unwrap_or(""))?;
                if row_date < date {
                    warn!(row = ?row, "Skipping report row out of date order");
                    rows.next();
                    continue;
                }
                if row_date == date {
                    matched = rows.next();
                }
                break;
            }

            match matched {
                Some(row) => filled.push(row.clone()),
                None => {
                    let mut row = Vec::with_capacity(self.headers.len());
                    row.push(date.format(period.format()).to_string());
                    row.resize(self.headers.len(), NO_DATA.to_string());
                    filled.push(row);
                }
            }

            cursor = period.next(date);
        }

        debug!(
            returned = self.rows.len(),
            filled = filled.len(),
            "Filled missing report dates"
        );
        Ok(filled)
    }

    fn time_period(&self) -> ReportingResult<TimePeriod> {
        let Some(first) = self.headers.first() else {
            return Err(unsupported("no headers defined in report results"));
        };
        if self.headers.len() < 2 || first.header_type != HeaderType::Dimension {
            return Err(unsupported("insufficient dimensions and metrics defined"));
        }
        if self.headers[1].header_type == HeaderType::Dimension {
            return Err(unsupported("only one dimension allowed"));
        }
        TimePeriod::from_dimension(&first.name)
            .ok_or_else(|| unsupported("results require a DATE or MONTH dimension"))
    }
}

fn unsupported(reason: &str) -> ReportingError {
    ReportingError::UnsupportedReport(reason.to_string())
}
