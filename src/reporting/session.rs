use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::catalog::{Catalog, ReportingField};
use super::compat_checker::CompatChecker;
use super::error::{ReportingError, ReportingResult};
use super::inventory::{Account, Inventory};
use super::report::ReportResponse;
use super::selection::{ReportConfig, ReportRequest, SelectionEvent};
use crate::SessionConfig;

/// Where the application is in its account/inventory/report flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppStatus {
    #[default]
    None,
    GettingAccountId,
    FetchingInventory,
    ShowingInventory,
    FetchingMetadata,
    ShowingCustomConfig,
    FetchingReport,
    ShowingReport,
    FetchingSimpleReport,
    PickingAccount,
}

/// State shared by one user session: catalog, inventory, accounts and the
/// custom report being configured.
///
/// Created by the caller and passed by reference to whatever needs it.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    catalog: Option<Arc<Catalog>>,
    report_config: ReportConfig,
    inventory: Option<Inventory>,
    report_response: Option<ReportResponse>,
    accounts: Vec<Account>,
    account_id: Option<String>,
    status: AppStatus,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        debug!(application = %config.application_name, "Starting reporting session");
        Self {
            account_id: config.account_id.clone(),
            config,
            catalog: None,
            report_config: ReportConfig::default(),
            inventory: None,
            report_response: None,
            accounts: Vec::new(),
            status: AppStatus::None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    pub fn set_status(&mut self, status: AppStatus) {
        debug!(from = ?self.status, to = ?status, "Session status changed");
        self.status = status;
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn select_account_id(&mut self, account_id: impl Into<String>) {
        let account_id = account_id.into();
        if !self.accounts.is_empty() && !self.accounts.iter().any(|a| a.id == account_id) {
            warn!(account = %account_id, "Selected account is not in the fetched account list");
        }
        self.account_id = Some(account_id);
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn on_accounts_fetched(&mut self, accounts: Vec<Account>) {
        info!(count = accounts.len(), "Accounts fetched");
        // A single account needs no picking.
        if self.account_id.is_none() && accounts.len() == 1 {
            self.account_id = Some(accounts[0].id.clone());
        }
        self.accounts = accounts;
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn on_inventory_fetched(&mut self, inventory: Inventory) {
        info!(accounts = inventory.accounts().len(), "Inventory fetched");
        self.inventory = Some(inventory);
        self.set_status(AppStatus::ShowingInventory);
    }

    /// Install a catalog built from freshly fetched metadata
    pub fn on_metadata_fetched(
        &mut self,
        dimensions: Vec<ReportingField>,
        metrics: Vec<ReportingField>,
    ) -> ReportingResult<()> {
        let catalog = Catalog::new(dimensions, metrics)?;
        self.install_catalog(catalog);
        Ok(())
    }

    /// Load metadata from the response files named in the config
    pub fn load_metadata(&mut self) -> Result<()> {
        let (Some(dimensions_path), Some(metrics_path)) = (
            self.config.dimensions_path.clone(),
            self.config.metrics_path.clone(),
        ) else {
            bail!("Session config does not name both metadata files");
        };

        self.set_status(AppStatus::FetchingMetadata);
        let catalog = Catalog::load(&dimensions_path, &metrics_path)
            .context("Failed to load reporting metadata")?;
        self.install_catalog(catalog);
        Ok(())
    }

    fn install_catalog(&mut self, catalog: Catalog) {
        info!(
            dimensions = catalog.dimensions().len(),
            metrics = catalog.metrics().len(),
            "Reporting metadata loaded"
        );
        self.report_config = ReportConfig::new(&catalog);
        self.catalog = Some(Arc::new(catalog));
        self.set_status(AppStatus::ShowingCustomConfig);
    }

    /// Shared handle to the catalog snapshot, if metadata has been loaded
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.clone()
    }

    pub fn checker(&self) -> ReportingResult<CompatChecker<'_>> {
        self.catalog
            .as_deref()
            .map(CompatChecker::new)
            .ok_or(ReportingError::MetadataNotLoaded)
    }

    pub fn report_config(&self) -> &ReportConfig {
        &self.report_config
    }

    pub fn apply_selection(&mut self, event: SelectionEvent) -> ReportingResult<()> {
        let catalog = self
            .catalog
            .as_deref()
            .ok_or(ReportingError::MetadataNotLoaded)?;
        let checker = CompatChecker::new(catalog);
        self.report_config.apply(&checker, event)
    }

    pub fn set_date_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.report_config.set_date_range(start, end);
    }

    /// Build a request for the selected account from the current configuration
    pub fn build_report_request(&self) -> ReportingResult<ReportRequest> {
        let checker = self.checker()?;
        let account_id = self
            .account_id
            .as_deref()
            .ok_or(ReportingError::NoAccountSelected)?;
        self.report_config
            .build_request(&checker, account_id, &self.config.date_format)
    }

    /// Most recently fetched report, custom or simple
    pub fn report_response(&self) -> Option<&ReportResponse> {
        self.report_response.as_ref()
    }

    pub fn on_report_fetched(&mut self, response: ReportResponse) {
        info!(
            rows = response.rows.len(),
            start = %response.start_date,
            end = %response.end_date,
            "Report fetched"
        );
        self.report_response = Some(response);
        self.set_status(AppStatus::ShowingReport);
    }

    /// Drop metadata, inventory, the last report and the report configuration.
    /// Accounts and the selected account are kept.
    pub fn reset(&mut self) {
        debug!("Resetting reporting session");
        self.catalog = None;
        self.inventory = None;
        self.report_response = None;
        self.report_config = ReportConfig::default();
        self.status = AppStatus::None;
    }
}
