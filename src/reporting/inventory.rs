use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// An AdSense account as returned by the accounts list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Inventory of a publisher: accounts, their ad clients, and the ad units and
/// custom channels of each ad client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default)]
    ad_clients: HashMap<String, Vec<String>>,
    #[serde(default)]
    ad_units: HashMap<String, Vec<String>>,
    #[serde(default)]
    custom_channels: HashMap<String, Vec<String>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse inventory")
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub fn set_accounts(&mut self, accounts: Vec<String>) {
        self.accounts = accounts;
    }

    pub fn ad_clients(&self, account_id: &str) -> Option<&[String]> {
        self.ad_clients.get(account_id).map(Vec::as_slice)
    }

    pub fn set_ad_clients(&mut self, account_id: impl Into<String>, ad_clients: Vec<String>) {
        self.ad_clients.insert(account_id.into(), ad_clients);
    }

    pub fn ad_units(&self, ad_client_id: &str) -> Option<&[String]> {
        self.ad_units.get(ad_client_id).map(Vec::as_slice)
    }

    pub fn set_ad_units(&mut self, ad_client_id: impl Into<String>, ad_units: Vec<String>) {
        self.ad_units.insert(ad_client_id.into(), ad_units);
    }

    pub fn custom_channels(&self, ad_client_id: &str) -> Option<&[String]> {
        self.custom_channels.get(ad_client_id).map(Vec::as_slice)
    }

    pub fn set_custom_channels(
        &mut self,
        ad_client_id: impl Into<String>,
        custom_channels: Vec<String>,
    ) {
        self.custom_channels.insert(ad_client_id.into(), custom_channels);
    }
}
