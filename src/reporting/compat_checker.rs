use serde::{Deserialize, Serialize};
use tracing::trace;

use super::catalog::{Catalog, FieldKind, ReportingField};
use super::error::{ReportingError, ReportingResult};

/// A dimension/metric pair that cannot appear in the same report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompatiblePair {
    pub dimension: String,
    pub metric: String,
}

/// Full outcome of checking a selection against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// All selected dimensions share a compatibility group
    pub dimensions_compatible: bool,
    /// Every selected metric accepts every other selected metric
    pub metrics_compatible: bool,
    /// Selected dimensions whose metric group lacks a selected metric
    pub incompatible_pairs: Vec<IncompatiblePair>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.dimensions_compatible && self.metrics_compatible && self.incompatible_pairs.is_empty()
    }

    /// One-line description of what is wrong, empty when compatible
    pub fn summary(&self) -> String {
        let mut problems = Vec::new();
        if !self.dimensions_compatible {
            problems.push("dimensions do not share a compatibility group".to_string());
        }
        if !self.metrics_compatible {
            problems.push("metrics cannot be combined".to_string());
        }
        for pair in &self.incompatible_pairs {
            problems.push(format!("{} does not support {}", pair.dimension, pair.metric));
        }
        problems.join("; ")
    }
}

/// Answers compatibility queries over a borrowed catalog snapshot.
///
/// Dimensions fall into mutually exclusive compatibility clusters, so a set of
/// dimensions is usable only when the intersection of their
/// compatible-dimension groups is non-empty. Metrics each list every metric
/// they can coexist with, so metric sets are checked by plain containment.
///
/// Boolean queries treat unknown ids as incompatible. Use
/// [`CompatChecker::check_selection`] to tell unknown ids apart.
#[derive(Debug, Clone, Copy)]
pub struct CompatChecker<'a> {
    catalog: &'a Catalog,
}

impl<'a> CompatChecker<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn get_field(&self, kind: FieldKind, id: &str) -> Option<&'a ReportingField> {
        self.catalog.get_field(kind, id)
    }

    pub fn dimension(&self, id: &str) -> Option<&'a ReportingField> {
        self.catalog.dimension(id)
    }

    pub fn metric(&self, id: &str) -> Option<&'a ReportingField> {
        self.catalog.metric(id)
    }

    /// True if the dimension supports every selected metric
    pub fn is_dimension_compatible_with_metrics<S: AsRef<str>>(
        &self,
        dimension_id: &str,
        metric_ids: &[S],
    ) -> bool {
        match self.dimension(dimension_id) {
            Some(dimension) => dimension.accepts_metrics(metric_ids),
            None => {
                trace!(dimension = dimension_id, "Unknown dimension treated as incompatible");
                false
            }
        }
    }

    /// True if the metric supports every selected dimension
    pub fn is_metric_compatible_with_dimensions<S: AsRef<str>>(
        &self,
        metric_id: &str,
        dimension_ids: &[S],
    ) -> bool {
        match self.metric(metric_id) {
            Some(metric) => metric.accepts_dimensions(dimension_ids),
            None => {
                trace!(metric = metric_id, "Unknown metric treated as incompatible");
                false
            }
        }
    }

    /// True if the dimension shares a compatibility group with all selected dimensions
    pub fn is_dimension_compatible_with_dimensions<S: AsRef<str>>(
        &self,
        dimension_id: &str,
        dimension_ids: &[S],
    ) -> bool {
        match self.dimension(dimension_id) {
            Some(dimension) => self.shares_group(dimension, dimension_ids),
            None => {
                trace!(dimension = dimension_id, "Unknown dimension treated as incompatible");
                false
            }
        }
    }

    /// True if all selected dimensions share a compatibility group.
    ///
    /// An empty selection is compatible.
    pub fn are_dimensions_compatible<S: AsRef<str>>(&self, dimension_ids: &[S]) -> bool {
        let Some(first) = dimension_ids.first() else {
            return true;
        };
        match self.dimension(first.as_ref()) {
            Some(seed) => self.shares_group(seed, dimension_ids),
            None => false,
        }
    }

    /// True if every selected metric accepts the whole selection.
    ///
    /// An empty selection is compatible.
    pub fn are_metrics_compatible<S: AsRef<str>>(&self, metric_ids: &[S]) -> bool {
        metric_ids.iter().all(|id| match self.metric(id.as_ref()) {
            Some(metric) => metric.accepts_metrics(metric_ids),
            None => false,
        })
    }

    /// Group checks on both halves of the selection. Does not check
    /// dimension/metric pairs; see [`CompatChecker::check_selection`].
    pub fn are_metrics_and_dimensions_compatible<M, D>(
        &self,
        metric_ids: &[M],
        dimension_ids: &[D],
    ) -> bool
    where
        M: AsRef<str>,
        D: AsRef<str>,
    {
        self.are_dimensions_compatible(dimension_ids) && self.are_metrics_compatible(metric_ids)
    }

    /// Check a whole selection, failing on the first id missing from the catalog
    pub fn check_selection<M, D>(
        &self,
        metric_ids: &[M],
        dimension_ids: &[D],
    ) -> ReportingResult<CompatibilityReport>
    where
        M: AsRef<str>,
        D: AsRef<str>,
    {
        let dimensions = self.resolve(FieldKind::Dimension, dimension_ids)?;
        self.resolve(FieldKind::Metric, metric_ids)?;

        let mut incompatible_pairs: Vec<IncompatiblePair> = Vec::new();
        for dimension in dimensions {
            for metric_id in metric_ids {
                let metric_id = metric_id.as_ref();
                if dimension.accepts_metrics(&[metric_id]) {
                    continue;
                }
                let pair = IncompatiblePair {
                    dimension: dimension.id.clone(),
                    metric: metric_id.to_string(),
                };
                if !incompatible_pairs.contains(&pair) {
                    incompatible_pairs.push(pair);
                }
            }
        }

        let report = CompatibilityReport {
            dimensions_compatible: self.are_dimensions_compatible(dimension_ids),
            metrics_compatible: self.are_metrics_compatible(metric_ids),
            incompatible_pairs,
        };
        trace!(compatible = report.is_compatible(), "Checked selection");
        Ok(report)
    }

    fn resolve<S: AsRef<str>>(
        &self,
        kind: FieldKind,
        ids: &[S],
    ) -> ReportingResult<Vec<&'a ReportingField>> {
        ids.iter()
            .map(|id| {
                self.get_field(kind, id.as_ref())
                    .ok_or_else(|| ReportingError::UnknownField {
                        kind,
                        id: id.as_ref().to_string(),
                    })
            })
            .collect()
    }

    /// Intersect `seed`'s dimension group with each selected dimension's group.
    /// Works on a copy; catalog groups are never modified.
    fn shares_group<S: AsRef<str>>(&self, seed: &ReportingField, dimension_ids: &[S]) -> bool {
        let mut common: Vec<&str> = seed
            .compatible_dimensions
            .iter()
            .map(String::as_str)
            .collect();

        for id in dimension_ids {
            let Some(other) = self.dimension(id.as_ref()) else {
                return false;
            };
            common.retain(|group| other.compatible_dimensions.iter().any(|g| g == group));
            if common.is_empty() {
                break;
            }
        }

        !common.is_empty()
    }
}
