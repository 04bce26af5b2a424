use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{Catalog, FieldKind};
use super::compat_checker::CompatChecker;
use super::error::{ReportingError, ReportingResult};

/// One dimension or metric in the custom report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub id: String,
    pub checked: bool,
    /// False when the item cannot be combined with the current picks
    pub enabled: bool,
}

impl ReportItem {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            checked: false,
            enabled: true,
        }
    }
}

/// A change made by the user to the report configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Toggle {
        kind: FieldKind,
        id: String,
        checked: bool,
    },
    /// Uncheck and re-enable every item
    Clear,
}

impl SelectionEvent {
    pub fn check(kind: FieldKind, id: impl Into<String>) -> Self {
        SelectionEvent::Toggle {
            kind,
            id: id.into(),
            checked: true,
        }
    }

    pub fn uncheck(kind: FieldKind, id: impl Into<String>) -> Self {
        SelectionEvent::Toggle {
            kind,
            id: id.into(),
            checked: false,
        }
    }
}

/// A validated request for a custom report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
}

/// Checked/enabled state of every catalog item plus the chosen date range
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    dimensions: Vec<ReportItem>,
    metrics: Vec<ReportItem>,
    date_range: Option<(String, String)>,
}

impl ReportConfig {
    /// All items unchecked and enabled, in catalog order
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            dimensions: catalog.dimensions().iter().map(|d| ReportItem::new(&d.id)).collect(),
            metrics: catalog.metrics().iter().map(|m| ReportItem::new(&m.id)).collect(),
            date_range: None,
        }
    }

    pub fn dimensions(&self) -> &[ReportItem] {
        &self.dimensions
    }

    pub fn metrics(&self) -> &[ReportItem] {
        &self.metrics
    }

    pub fn items(&self, kind: FieldKind) -> &[ReportItem] {
        match kind {
            FieldKind::Dimension => &self.dimensions,
            FieldKind::Metric => &self.metrics,
        }
    }

    pub fn checked_dimensions(&self) -> Vec<String> {
        checked_ids(&self.dimensions)
    }

    pub fn checked_metrics(&self) -> Vec<String> {
        checked_ids(&self.metrics)
    }

    pub fn is_enabled(&self, kind: FieldKind, id: &str) -> Option<bool> {
        self.items(kind).iter().find(|item| item.id == id).map(|item| item.enabled)
    }

    pub fn is_checked(&self, kind: FieldKind, id: &str) -> Option<bool> {
        self.items(kind).iter().find(|item| item.id == id).map(|item| item.checked)
    }

    /// Apply a user change and recompute which items stay enabled
    pub fn apply(
        &mut self,
        checker: &CompatChecker<'_>,
        event: SelectionEvent,
    ) -> ReportingResult<()> {
        match event {
            SelectionEvent::Clear => {
                for item in self.dimensions.iter_mut().chain(self.metrics.iter_mut()) {
                    item.checked = false;
                    item.enabled = true;
                }
            }
            SelectionEvent::Toggle { kind, id, checked } => {
                let items = match kind {
                    FieldKind::Dimension => &mut self.dimensions,
                    FieldKind::Metric => &mut self.metrics,
                };
                let item = items
                    .iter_mut()
                    .find(|item| item.id == id)
                    .ok_or_else(|| ReportingError::UnknownField { kind, id: id.clone() })?;
                item.checked = checked;
                debug!(%kind, id = %id, checked, "Report selection changed");

                match kind {
                    FieldKind::Metric => self.refresh_after_metric_change(checker),
                    FieldKind::Dimension => self.refresh_after_dimension_change(checker),
                }
            }
        }
        Ok(())
    }

    // Metric picks only narrow the dimensions; metric availability is left as is.
    fn refresh_after_metric_change(&mut self, checker: &CompatChecker<'_>) {
        let checked_metrics = self.checked_metrics();
        for dimension in &mut self.dimensions {
            dimension.enabled =
                checker.is_dimension_compatible_with_metrics(&dimension.id, &checked_metrics);
        }
    }

    fn refresh_after_dimension_change(&mut self, checker: &CompatChecker<'_>) {
        let checked_dimensions = self.checked_dimensions();
        for dimension in &mut self.dimensions {
            dimension.enabled =
                checker.is_dimension_compatible_with_dimensions(&dimension.id, &checked_dimensions);
        }
        for metric in &mut self.metrics {
            metric.enabled =
                checker.is_metric_compatible_with_dimensions(&metric.id, &checked_dimensions);
        }
    }

    pub fn set_date_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.date_range = Some((start.into(), end.into()));
    }

    pub fn date_range(&self) -> Option<(&str, &str)> {
        self.date_range
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()))
    }

    /// Validate the current picks and dates and turn them into a request
    pub fn build_request(
        &self,
        checker: &CompatChecker<'_>,
        account_id: &str,
        date_format: &str,
    ) -> ReportingResult<ReportRequest> {
        let (start, end) = self.date_range().ok_or(ReportingError::MissingDateRange)?;
        let start_date = parse_date(start, date_format)?;
        let end_date = parse_date(end, date_format)?;
        if start_date > end_date {
            return Err(ReportingError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let dimensions = self.checked_dimensions();
        let metrics = self.checked_metrics();
        let report = checker.check_selection(&metrics, &dimensions)?;
        if !report.is_compatible() {
            return Err(ReportingError::IncompatibleSelection(report.summary()));
        }

        Ok(ReportRequest {
            account_id: account_id.to_string(),
            start_date,
            end_date,
            dimensions,
            metrics,
        })
    }
}

fn checked_ids(items: &[ReportItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.checked)
        .map(|item| item.id.clone())
        .collect()
}

fn parse_date(value: &str, format: &str) -> ReportingResult<NaiveDate> {
    NaiveDate::parse_from_str(value, format).map_err(|_| ReportingError::InvalidDate {
        value: value.to_string(),
        format: format.to_string(),
    })
}
