//! Layered settings: defaults, then an optional file, then the environment.
//! Command-line flags are applied on top by the caller.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use brokerlens::{ClientConfig, LensConfig};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::duration::parse_interval;

/// Prefix for environment overrides, e.g. `BROKERLENS_CLIENT__ENDPOINT`.
pub const ENV_PREFIX: &str = "BROKERLENS";

/// Which lens to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LensKind {
    #[default]
    Cluster,
    Connectivity,
    Queues,
}

/// How captures are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// One human-readable line per capture.
    Summary,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: ClientConfig,
    pub lens: LensConfig,
    pub kind: LensKind,
    /// Time between captures, e.g. "5s".
    pub interval: String,
    /// Stop after this many captures; 0 runs until interrupted.
    pub count: u64,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            lens: LensConfig::default(),
            kind: LensKind::default(),
            interval: "5s".to_string(),
            count: 0,
            format: OutputFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and `BROKERLENS_*` variables.
    ///
    /// Nested keys use a double underscore in the environment:
    /// `BROKERLENS_CLIENT__PASSWORD`, `BROKERLENS_LENS__HISTORY_CAPACITY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| match path {
                Some(p) => format!("Failed to load settings from {}", p.display()),
                None => "Failed to load settings from environment".to_string(),
            })?;

        config
            .try_deserialize()
            .context("Invalid brokerlens settings")
    }

    /// The capture interval.
    pub fn interval(&self) -> Result<Duration> {
        parse_interval(&self.interval)
    }
}
