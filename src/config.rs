// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::HomologyError;

pub const CONFIG_FILE_NAME: &str = ".homsearchconfig";
pub const DEFAULT_SERVICE_URL: &str = "https://blast.ncbi.nlm.nih.gov/Blast.cgi";
pub const DEFAULT_STAGING_FILE: &str = "blast_output.xml";

/// Settings for the remote search service. Every key is optional in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub service_url: String,
    pub email: Option<String>,
    pub tool: String,
    pub poll_interval_secs: u64,
    pub max_wait_secs: Option<u64>,
    pub hitlist_size: u32,
    // Each result document is written here before being parsed; overwritten for every query.
    pub staging_file: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            service_url: String::from(DEFAULT_SERVICE_URL),
            email: None,
            tool: String::from(env!("CARGO_PKG_NAME")),
            poll_interval_secs: 60,
            max_wait_secs: None,
            hitlist_size: 50,
            staging_file: PathBuf::from(DEFAULT_STAGING_FILE),
        }
    }
}

impl ServiceConfig {
    pub fn from_value(value: &Value) -> Result<Self, HomologyError> {
        Ok(ServiceConfig::deserialize(value)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, HomologyError> {
        let text = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_value(&value)
    }
}

pub fn find_config() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let path = PathBuf::from(home).join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// An explicitly requested config file must be valid; a discovered one that isn't is only
/// warned about.
pub fn load_config(explicit: Option<&Path>) -> Result<ServiceConfig, HomologyError> {
    if let Some(path) = explicit {
        return ServiceConfig::from_file(path);
    }
    match find_config() {
        Some(path) => match ServiceConfig::from_file(&path) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Ok(ServiceConfig::default())
            }
        },
        None => Ok(ServiceConfig::default()),
    }
}
