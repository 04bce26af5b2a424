//! AdSense Reporting - Catalog and compatibility checks for custom AdSense reports
//!
//! This library provides utilities for:
//! - Loading the reporting catalog (dimensions and metrics) from metadata responses
//! - Checking whether picked dimensions and metrics can share one report
//! - Tracking a custom report configuration and turning it into a request
//! - Filling missing days or months in a fetched report
//! - Holding per-session state (catalog, inventory, accounts, last report, status)
//!
//! # Examples
//!
//! ```rust
//! use adsense_reporting::{Catalog, CompatChecker, ReportingField};
//!
//! let catalog = Catalog::new(
//!     vec![
//!         ReportingField::new("DATE").with_compatible_dimensions(["DATE", "PLATFORM_TYPE_NAME"]),
//!         ReportingField::new("PLATFORM_TYPE_NAME")
//!             .with_compatible_dimensions(["DATE", "PLATFORM_TYPE_NAME"]),
//!     ],
//!     vec![ReportingField::new("CLICKS").with_compatible_metrics(["CLICKS"])],
//! )
//! .unwrap();
//!
//! let checker = CompatChecker::new(&catalog);
//! assert!(checker.are_dimensions_compatible(&["DATE", "PLATFORM_TYPE_NAME"]));
//! assert!(!checker.is_dimension_compatible_with_metrics("UNKNOWN", &["CLICKS"]));
//! ```

pub mod reporting;

pub use reporting::*;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Version of the adsense-reporting library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default format for report start and end dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get the default session configuration
pub fn get_default_session_config() -> SessionConfig {
    SessionConfig::default()
}

/// Configuration for a reporting session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Saved `metadata.dimensions.list` response
    pub dimensions_path: Option<PathBuf>,
    /// Saved `metadata.metrics.list` response
    pub metrics_path: Option<PathBuf>,
    /// Account selected when the session starts
    pub account_id: Option<String>,
    /// Name reported to the API client
    pub application_name: String,
    /// chrono format string for report dates
    pub date_format: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dimensions_path: None,
            metrics_path: None,
            account_id: None,
            application_name: "AdSense Reporting".to_string(),
            date_format: DATE_FORMAT.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration that reads metadata from two saved responses
    pub fn with_metadata<P: Into<PathBuf>, Q: Into<PathBuf>>(
        dimensions_path: P,
        metrics_path: Q,
    ) -> Self {
        Self {
            dimensions_path: Some(dimensions_path.into()),
            metrics_path: Some(metrics_path.into()),
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session config: {:?}", path))?;
        let config: SessionConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session config: {:?}", path))?;
        Ok(config)
    }
}
