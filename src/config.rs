// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read once at startup from a YAML file. The path comes from the
//! `ROIDS_CONFIG` environment variable and defaults to
//! `roids-annotate.yaml` in the working directory; a missing file means
//! defaults. `ROIDS_SERVER_URL` overrides the server address.
//!
//! ```yaml
//! version: 1
//! log_level: info
//! backend:
//!   kind: http
//!   server_url: http://127.0.0.1:5000
//! ```

use crate::io::backend::Backend;
use crate::io::http::HttpBackend;
use crate::io::local::LocalBackend;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

pub const CONFIG_ENV: &str = "ROIDS_CONFIG";
pub const SERVER_URL_ENV: &str = "ROIDS_SERVER_URL";
const DEFAULT_CONFIG_FILE: &str = "roids-annotate.yaml";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Where annotations are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Annotation server.
    Http { server_url: String },
    /// Local directory with the server's file layout.
    Local {
        annotation_dir: PathBuf,
        #[serde(default = "default_properties_config")]
        properties_config: PathBuf,
        #[serde(default = "default_icons_dir")]
        icons_dir: PathBuf,
    },
}

fn default_properties_config() -> PathBuf {
    PathBuf::from("properties_config.json")
}

fn default_icons_dir() -> PathBuf {
    PathBuf::from("static/icons")
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Http {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl BackendConfig {
    pub fn build(&self) -> Arc<dyn Backend> {
        match self {
            BackendConfig::Http { server_url } => {
                log::info!("Using annotation server at {}", server_url);
                Arc::new(HttpBackend::new(server_url))
            }
            BackendConfig::Local {
                annotation_dir,
                properties_config,
                icons_dir,
            } => {
                log::info!("Using local annotation directory {}", annotation_dir.display());
                Arc::new(LocalBackend::new(
                    annotation_dir.clone(),
                    properties_config.clone(),
                    icons_dir.clone(),
                ))
            }
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_window_size() -> [f32; 2] {
    [1280.0, 720.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: BackendConfig::default(),
            log_level: LogLevel::default(),
            window_size: default_window_size(),
        }
    }
}

impl AppConfig {
    /// Load from the configured path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from(&path)?;
        config.apply_server_override(std::env::var(SERVER_URL_ENV).ok());
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        if config.version > CONFIG_VERSION {
            anyhow::bail!(
                "config version {} is newer than supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        Ok(config)
    }

    /// Point the HTTP backend at `url`, when given.
    pub fn apply_server_override(&mut self, url: Option<String>) {
        if let Some(server_url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend = BackendConfig::Http { server_url };
        }
    }
}
