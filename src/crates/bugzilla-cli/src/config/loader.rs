//! Layered configuration loader

use crate::config::schema::{BugzillaConfig, KNOWN_KEYS};
use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_NAME: &str = "bugzilla.toml";
const PROJECT_FILE_NAME: &str = ".bugzilla.toml";
const DEPLOYMENTS_KEY: &str = "deployments";

/// Loads and merges the configuration layers.
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::config_dir().map(|dir| dir.join("bugzilla").join(FILE_NAME)),
            project_config_path: PathBuf::from(PROJECT_FILE_NAME),
            explicit_path: None,
        }
    }

    /// Loader reading the user and project layers from the given paths.
    pub fn with_paths(user_config_path: Option<PathBuf>, project_config_path: PathBuf) -> Self {
        Self {
            user_config_path,
            project_config_path,
            explicit_path: None,
        }
    }

    /// Add a file that must exist and overrides every other layer.
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }

    /// Load every layer, then environment overrides.
    pub fn load(&self) -> Result<BugzillaConfig> {
        let mut config = self.load_files()?;
        config.resolve_env_vars();
        Ok(config)
    }

    /// Load every file layer without looking at the environment.
    ///
    /// Layers are overlaid key by key before deserializing, so a later file
    /// only changes the settings it names.
    pub fn load_files(&self) -> Result<BugzillaConfig> {
        let mut merged = toml::Table::new();

        if let Some(user_path) = &self.user_config_path {
            if let Some(user_layer) = self.load_optional(user_path)? {
                debug!(path = %user_path.display(), "Loaded user-level config");
                overlay(&mut merged, user_layer);
            }
        }

        if let Some(project_layer) = self.load_optional(&self.project_config_path)? {
            debug!(path = %self.project_config_path.display(), "Loaded project-level config");
            overlay(&mut merged, project_layer);
        }

        if let Some(explicit) = &self.explicit_path {
            let explicit_layer = load_from_path(explicit)?;
            debug!(path = %explicit.display(), "Loaded explicit config");
            overlay(&mut merged, explicit_layer);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| CliError::Config(format!("Invalid merged config: {}", e)))
    }

    fn load_optional(&self, path: &Path) -> Result<Option<toml::Table>> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, skipping");
            return Ok(None);
        }
        load_from_path(path).map(Some)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one layer, checking it against the schema on its own so errors name
/// the offending file.
fn load_from_path(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        CliError::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!(path = %path.display(), key = %key, "Ignoring unknown config key");
        }
    }

    toml::Value::Table(table.clone())
        .try_into::<BugzillaConfig>()
        .map_err(|e| CliError::Config(format!("Invalid config in {}: {}", path.display(), e)))?;
    Ok(table)
}

/// Overlay `layer` onto `base`: tables merge recursively, `deployments`
/// accumulate, anything else is replaced.
fn overlay(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        let replacement = match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                overlay(existing, incoming);
                None
            }
            (Some(toml::Value::Array(existing)), toml::Value::Array(incoming))
                if key == DEPLOYMENTS_KEY =>
            {
                existing.extend(incoming);
                None
            }
            (_, value) => Some(value),
        };
        if let Some(value) = replacement {
            base.insert(key, value);
        }
    }
}
