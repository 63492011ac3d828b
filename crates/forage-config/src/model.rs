//! Typed settings views layered over the raw store.

use serde::{Deserialize, Serialize};

use crate::paths::{ASSETS_TOKEN, DATA_TOKEN};
use crate::store::SettingsStore;

/// Store key holding the loader section.
pub const LOADER_KEY: &str = "loader";
/// Store key holding the logging section.
pub const LOGGING_KEY: &str = "logging";

/// Typed view over the application settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Asset-loading behavior.
    pub loader: LoaderSettings,
    /// Logging verbosity and output format.
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Assemble typed settings from the raw store, falling back to defaults
    /// for absent or mismatched sections.
    #[must_use]
    pub fn from_store(store: &SettingsStore) -> Self {
        Self {
            loader: store.get(LOADER_KEY).unwrap_or_default(),
            logging: store.get(LOGGING_KEY).unwrap_or_default(),
        }
    }
}

/// Settings consumed by the asset-loading service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoaderSettings {
    /// Folder scanned for local assets; may start with a path-alias token.
    pub assets_folder: String,
    /// Folder remote downloads are cached into; may start with a path-alias
    /// token.
    pub cache_folder: String,
    /// Whether the startup load reports progress.
    pub show_startup_progress: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            assets_folder: ASSETS_TOKEN.to_string(),
            cache_folder: format!("{DATA_TOKEN}/cache"),
            show_startup_progress: true,
        }
    }
}

/// Settings consumed by telemetry initialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level or `EnvFilter` directive string.
    pub level: String,
    /// Output format name: `pretty`, `json`, or `auto`.
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "auto".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_sections_are_missing() -> Result<()> {
        let settings: AppSettings = serde_json::from_value(json!({}))?;
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.loader.assets_folder, "[assets]");
        assert_eq!(settings.loader.cache_folder, "[data]/cache");
        assert!(settings.loader.show_startup_progress);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "auto");
        Ok(())
    }

    #[test]
    fn partial_sections_fill_remaining_fields_from_defaults() -> Result<()> {
        let loader: LoaderSettings =
            serde_json::from_value(json!({ "assets_folder": "[assets]/media" }))?;
        assert_eq!(loader.assets_folder, "[assets]/media");
        assert_eq!(loader.cache_folder, "[data]/cache");
        assert!(loader.show_startup_progress);
        Ok(())
    }

    #[test]
    fn from_store_reads_each_section() {
        let mut store = SettingsStore::new();
        assert!(store.set(
            LOADER_KEY,
            json!({
                "assets_folder": "[assets]/media",
                "cache_folder": "[data]/downloads",
                "show_startup_progress": false
            }),
            false,
        ));
        let settings = AppSettings::from_store(&store);
        assert_eq!(settings.loader.assets_folder, "[assets]/media");
        assert_eq!(settings.loader.cache_folder, "[data]/downloads");
        assert!(!settings.loader.show_startup_progress);
        assert_eq!(settings.logging, LoggingSettings::default());
    }
}
