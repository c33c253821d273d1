//! `taskline.toml` loading
//!
//! The config file is optional. It is taken from `--config` when given, else
//! from `./taskline.toml` when that exists, else defaults apply. Command line
//! flags override whatever the file says.

use crate::errors::{CliError, CliResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use taskline_engine::{CanonicalOrder, OrderEntry, ScheduleOptions};
use tracing::debug;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taskline.toml";

/// Parsed `taskline.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Forward-pass options
    #[serde(default)]
    pub schedule: ScheduleOptions,
    /// Canonical name order for the aggregate timeline
    #[serde(default)]
    pub order: OrderConfig,
    /// Directory relative paths in the file resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// `[order]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderConfig {
    /// JSON file holding `[{"name": ..., "order": ...}]`
    #[serde(default)]
    pub table: Option<PathBuf>,
    /// Inline entries, applied over the file's
    #[serde(default)]
    pub names: BTreeMap<String, i64>,
}

impl Config {
    /// Load from an explicit path, or from `./taskline.toml` if present.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse one config file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let src = fs::read_to_string(path).map_err(|e| CliError::file_error("read", path, e))?;
        let mut config: Self =
            toml::from_str(&src).map_err(|e| CliError::config_parse_error(path, src.clone(), &e))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(
            path = %path.display(),
            derive_from_duration = config.schedule.derive_from_duration,
            inline_names = config.order.names.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Schedule options with the command line switch applied.
    #[must_use]
    pub fn schedule_options(&self, derive_from_duration: bool) -> ScheduleOptions {
        ScheduleOptions {
            derive_from_duration: derive_from_duration || self.schedule.derive_from_duration,
        }
    }

    /// Canonical order table: the file (flag over config), then inline names.
    pub fn canonical_order(&self, table_override: Option<&Path>) -> CliResult<CanonicalOrder> {
        let table_path = table_override
            .map(Path::to_path_buf)
            .or_else(|| self.order.table.as_ref().map(|p| self.base_dir.join(p)));

        let mut table = match table_path {
            Some(path) => load_order_table(&path)?,
            None => CanonicalOrder::new(),
        };
        for (name, order) in &self.order.names {
            table.insert(name, *order);
        }
        Ok(table)
    }
}

/// Read a JSON order table file.
pub fn load_order_table(path: &Path) -> CliResult<CanonicalOrder> {
    let src = fs::read_to_string(path).map_err(|e| CliError::file_error("read", path, e))?;
    let entries: Vec<OrderEntry> = serde_json::from_str(&src)
        .map_err(|e| CliError::invalid_order_table(path, e.to_string()))?;
    debug!(path = %path.display(), entries = entries.len(), "Loaded order table");
    Ok(entries.into_iter().collect())
}
