//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./placement.toml or ./.placement/config.toml
//! 2. User config: ~/.placement/config.toml
//! 3. Built-in defaults

use crate::assessment::{AssessmentRules, SessionConfig};
use crate::env;
use crate::session::ServiceConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Where sessions are stored; defaults to ./.placement
    pub data_dir: Option<PathBuf>,
    pub shuffle_seed: Option<u64>,
    pub rules: AssessmentRules,
    pub session_defaults: SessionConfig,
}

impl PlacementConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            rules: self.rules.clone(),
            session_defaults: self.session_defaults.clone(),
            shuffle_seed: self.shuffle_seed,
        }
    }

    /// Resolve the data directory: env override, then config, then ./.placement
    pub fn data_dir(&self) -> PathBuf {
        if let Ok(dir) = std_env::var(env::DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        self.data_dir.clone().unwrap_or_else(|| {
            let current_dir = std_env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            env::default_data_dir(&current_dir)
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_string()?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load an explicit file, or discover one through the hierarchy
    pub fn load(explicit: Option<&Path>) -> Result<PlacementConfig> {
        if let Some(path) = explicit {
            info!("Loading configuration from: {:?}", path);
            return PlacementConfig::from_toml_file(path);
        }
        Self::discover_config()
    }

    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<PlacementConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return PlacementConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(PlacementConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                debug!("Found config file: {:?}", candidate);
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Get list of configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.is_file() {
                "✓ EXISTS"
            } else if candidate.exists() {
                "✗ NOT A FILE"
            } else {
                "✗ NOT FOUND"
            };
            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }
    }
}
