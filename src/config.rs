//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Local config: `<project_dir>/.orgtree.toml`
//! 4. Environment variables: `ORGTREE_*` prefix

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, OUT_OF_STRUCTURE_LABEL};

/// How trees and resolved fields are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree for terminals
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Snapshot file with custom fields, positions and trees
    pub data_file: PathBuf,
    /// Label of the bucket for positions without any level value
    pub out_of_structure_label: String,
    /// Attach unresolved-id diagnostics to built trees
    pub include_diagnostics: bool,
    /// Default output format
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            out_of_structure_label: OUT_OF_STRUCTURE_LABEL.to_string(),
            include_diagnostics: true,
            format: OutputFormat::Text,
        }
    }
}

/// Default snapshot location (`$XDG_DATA_HOME/orgtree/snapshot.json`).
fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", "orgtree")
        .map(|dirs| dirs.data_dir().join("snapshot.json"))
        .unwrap_or_else(|| PathBuf::from("snapshot.json"))
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".orgtree.toml")
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_file.to_string_lossy().as_ref());
        self.data_file = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.orgtree.toml`
    ///
    /// Later layers replace earlier values key by key.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Self::defaults_builder()?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                builder = builder.add_source(File::from(local_path).required(true));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ORGTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        // Expand ~ and $VAR in path-like fields
        settings.expand_paths();

        Ok(settings)
    }

    fn defaults_builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ApplicationError> {
        let defaults = Settings::default();
        Config::builder()
            .set_default("data_file", defaults.data_file.to_string_lossy().to_string())
            .map_err(config_err)?
            .set_default("out_of_structure_label", defaults.out_of_structure_label)
            .map_err(config_err)?
            .set_default("include_diagnostics", defaults.include_diagnostics)
            .map_err(config_err)?
            .set_default("format", defaults.format.as_str())
            .map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgtree/orgtree.toml
#   Local:  <project_dir>/.orgtree.toml
#   Env:    ORGTREE_* environment variables (e.g. ORGTREE_DATA_FILE)

# Snapshot file with custom fields, positions and tree definitions
# data_file = "~/.local/share/orgtree/snapshot.json"

# Label of the root group holding positions without any level value
# out_of_structure_label = "out of structure"

# Attach unresolved-id diagnostics to built trees
# include_diagnostics = true

# Output format: "text" or "json"
# format = "text"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
