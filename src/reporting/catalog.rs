use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ReportingError, ReportingResult};

/// Which half of the catalog a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Categorical axis used to slice a report
    Dimension,
    /// Numeric measure reported per dimension combination
    Metric,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Dimension => f.write_str("dimension"),
            FieldKind::Metric => f.write_str("metric"),
        }
    }
}

/// A dimension or metric entry as published by the reporting metadata service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingField {
    pub id: String,
    /// Dimensions this field may be combined with
    #[serde(default)]
    pub compatible_dimensions: Vec<String>,
    /// Metrics this field may be combined with
    #[serde(default)]
    pub compatible_metrics: Vec<String>,
    /// Products (AFC, AFS, ...) whose reports can use this field
    #[serde(default)]
    pub supported_products: Vec<String>,
}

impl ReportingField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            compatible_dimensions: Vec::new(),
            compatible_metrics: Vec::new(),
            supported_products: Vec::new(),
        }
    }

    pub fn with_compatible_dimensions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_dimensions = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_compatible_metrics<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_metrics = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_supported_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn supports_product(&self, product: &str) -> bool {
        self.supported_products.iter().any(|p| p == product)
    }

    /// True if `ids` are all listed in this field's compatible-dimension group
    pub fn accepts_dimensions<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        contains_all(&self.compatible_dimensions, ids)
    }

    /// True if `ids` are all listed in this field's compatible-metric group
    pub fn accepts_metrics<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        contains_all(&self.compatible_metrics, ids)
    }
}

fn contains_all<S: AsRef<str>>(group: &[String], ids: &[S]) -> bool {
    ids.iter()
        .all(|id| group.iter().any(|member| member == id.as_ref()))
}

/// Body of a `metadata.dimensions.list` or `metadata.metrics.list` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataResponse {
    #[serde(default)]
    pub items: Vec<ReportingField>,
}

impl MetadataResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse reporting metadata response")
    }
}

/// Ordered set of fields of one kind, indexed by id
#[derive(Debug, Clone, Default)]
struct FieldSet {
    fields: Vec<ReportingField>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    fn build(kind: FieldKind, fields: Vec<ReportingField>) -> ReportingResult<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id.clone(), position).is_some() {
                return Err(ReportingError::DuplicateField {
                    kind,
                    id: field.id.clone(),
                });
            }
        }
        Ok(Self { fields, index })
    }

    fn get(&self, id: &str) -> Option<&ReportingField> {
        self.index.get(id).map(|&position| &self.fields[position])
    }
}

/// Immutable snapshot of every dimension and metric available for reporting
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dimensions: FieldSet,
    metrics: FieldSet,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids within either set
    pub fn new(
        dimensions: Vec<ReportingField>,
        metrics: Vec<ReportingField>,
    ) -> ReportingResult<Self> {
        let catalog = Self {
            dimensions: FieldSet::build(FieldKind::Dimension, dimensions)?,
            metrics: FieldSet::build(FieldKind::Metric, metrics)?,
        };
        debug!(
            dimensions = catalog.dimensions.fields.len(),
            metrics = catalog.metrics.fields.len(),
            "Built reporting catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from the JSON bodies of the two metadata list calls
    pub fn from_json(dimensions_json: &str, metrics_json: &str) -> Result<Self> {
        let dimensions = MetadataResponse::from_json(dimensions_json)
            .context("Failed to read dimension metadata")?;
        let metrics = MetadataResponse::from_json(metrics_json)
            .context("Failed to read metric metadata")?;
        Ok(Self::new(dimensions.items, metrics.items)?)
    }

    /// Load a catalog from two metadata response files
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        dimensions_path: P,
        metrics_path: Q,
    ) -> Result<Self> {
        let dimensions_path = dimensions_path.as_ref();
        let metrics_path = metrics_path.as_ref();

        let dimensions_json = fs::read_to_string(dimensions_path).with_context(|| {
            format!("Failed to read dimension metadata from {:?}", dimensions_path)
        })?;
        let metrics_json = fs::read_to_string(metrics_path)
            .with_context(|| format!("Failed to read metric metadata from {:?}", metrics_path))?;

        Self::from_json(&dimensions_json, &metrics_json)
    }

    /// Look up a field by kind and id
    pub fn get_field(&self, kind: FieldKind, id: &str) -> Option<&ReportingField> {
        match kind {
            FieldKind::Dimension => self.dimensions.get(id),
            FieldKind::Metric => self.metrics.get(id),
        }
    }

    pub fn dimension(&self, id: &str) -> Option<&ReportingField> {
        self.dimensions.get(id)
    }

    pub fn metric(&self, id: &str) -> Option<&ReportingField> {
        self.metrics.get(id)
    }

    pub fn contains(&self, kind: FieldKind, id: &str) -> bool {
        self.get_field(kind, id).is_some()
    }

    /// All fields of one kind, in metadata order
    pub fn fields(&self, kind: FieldKind) -> &[ReportingField] {
        match kind {
            FieldKind::Dimension => &self.dimensions.fields,
            FieldKind::Metric => &self.metrics.fields,
        }
    }

    /// Fields of one kind usable in reports for `product`, in metadata order
    pub fn fields_for_product(&self, kind: FieldKind, product: &str) -> Vec<&ReportingField> {
        self.fields(kind)
            .iter()
            .filter(|field| field.supports_product(product))
            .collect()
    }

    pub fn dimensions(&self) -> &[ReportingField] {
        self.fields(FieldKind::Dimension)
    }

    pub fn metrics(&self) -> &[ReportingField] {
        self.fields(FieldKind::Metric)
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.fields.is_empty() && self.metrics.fields.is_empty()
    }
}
