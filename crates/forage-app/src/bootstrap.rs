//! Application bootstrap: settings, logging, loader wiring, and the startup
//! asset load.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use forage_config::{
    AppSettings, LOADER_KEY, LOGGING_KEY, LoaderSettings, LoggingSettings, PathResolver,
    SettingsStore,
};
use forage_core::LoadRequest;
use forage_events::EventBus;
use forage_fetch::{AssetFetcher, HttpFetcher};
use forage_pipeline::{AssetLoader, LoaderConfig};
use forage_telemetry::{LogFormat, LoggingConfig, init_logging};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::reporter::spawn_event_reporter;

/// Environment variable naming the settings document.
pub const SETTINGS_ENV: &str = "FORAGE_SETTINGS";
/// Settings document used when the environment does not name one.
pub const DEFAULT_SETTINGS_FILE: &str = "forage.json";

/// Dependencies required to bootstrap the Forage application.
pub(crate) struct BootstrapDependencies {
    settings: AppSettings,
    resolver: PathResolver,
    events: EventBus,
    fetcher: Arc<dyn AssetFetcher>,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment for the binary
    /// entrypoint.
    pub(crate) fn from_env() -> AppResult<Self> {
        let settings_path = settings_path(std::env::var(SETTINGS_ENV).ok());
        let mut store = SettingsStore::load_from_file(&settings_path)
            .map_err(|err| AppError::config("settings.load", err))?;
        let settings = apply_settings(&mut store);

        let current_dir = std::env::current_dir().map_err(|source| AppError::Io {
            operation: "env.current_dir",
            path: None,
            source,
        })?;
        let resolver = PathResolver::new(current_dir.join("assets"), current_dir);

        let events = EventBus::new();
        let fetcher: Arc<dyn AssetFetcher> =
            Arc::new(HttpFetcher::new().map_err(|err| AppError::fetch("fetcher.new", err))?);

        Ok(Self {
            settings,
            resolver,
            events,
            fetcher,
        })
    }
}

/// Entry point for the Forage application boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or application startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    Box::pin(run_app_with(dependencies)).await
}

/// Boot sequence that relies entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    let BootstrapDependencies {
        settings,
        resolver,
        events,
        fetcher,
    } = dependencies;

    let logging = LoggingConfig {
        level: settings.logging.level.as_str(),
        format: LogFormat::from_name(&settings.logging.format),
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!("Forage application bootstrap starting");

    let assets_folder = resolver.resolve(&settings.loader.assets_folder);
    let cache_dir = resolver.resolve(&settings.loader.cache_folder);
    info!(
        assets = %assets_folder.display(),
        cache = %cache_dir.display(),
        "Asset folders resolved"
    );

    let reporter = spawn_event_reporter(&events);
    let loader = AssetLoader::spawn(LoaderConfig { cache_dir }, fetcher, events);

    let request = LoadRequest::folder(
        assets_folder.to_string_lossy().into_owned(),
        settings.loader.show_startup_progress,
        |collection| {
            info!(
                images = collection.images.len(),
                audio = collection.audio.len(),
                texts = collection.texts.len(),
                videos = collection.video_paths.len(),
                "Startup asset load finished"
            );
        },
    );
    let request_id = loader.enqueue(request);
    info!(%request_id, "Startup asset load enqueued");

    signal::ctrl_c().await.map_err(|source| AppError::Io {
        operation: "signal.ctrl_c",
        path: None,
        source,
    })?;
    info!("Shutdown signal received");

    if !reporter.is_finished() {
        reporter.abort();
    }
    if let Err(err) = reporter.await {
        warn!(error = %err, "event reporter join failed");
    }
    info!("Forage application shutdown complete");
    Ok(())
}

/// Push stored settings sections into a typed snapshot via registered
/// appliers.
fn apply_settings(store: &mut SettingsStore) -> AppSettings {
    let snapshot = Arc::new(Mutex::new(AppSettings::default()));

    let loader = Arc::clone(&snapshot);
    store.register_applier(LOADER_KEY, move |value| {
        let parsed: LoaderSettings = parse_section(value)?;
        lock_snapshot(&loader).loader = parsed;
        Ok(())
    });

    let logging = Arc::clone(&snapshot);
    store.register_applier(LOGGING_KEY, move |value| {
        let parsed: LoggingSettings = parse_section(value)?;
        lock_snapshot(&logging).logging = parsed;
        Ok(())
    });

    let applied = store.apply_all();
    debug!(applied, "settings appliers ran");
    lock_snapshot(&snapshot).clone()
}

fn parse_section<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    serde_json::from_value(value.clone()).map_err(|error| error.to_string())
}

fn lock_snapshot(snapshot: &Mutex<AppSettings>) -> MutexGuard<'_, AppSettings> {
    snapshot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn settings_path(env_value: Option<String>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;

    #[test]
    fn settings_path_falls_back_to_the_default_document() {
        assert_eq!(settings_path(None), DEFAULT_SETTINGS_FILE);
        assert_eq!(settings_path(Some(String::new())), DEFAULT_SETTINGS_FILE);
        assert_eq!(
            settings_path(Some("custom.json".to_string())),
            "custom.json"
        );
    }

    #[test]
    fn appliers_populate_the_typed_snapshot() {
        let mut store = SettingsStore::new();
        assert!(store.set(
            LOADER_KEY,
            json!({
                "assets_folder": "[assets]/packs",
                "cache_folder": "[data]/downloads",
                "show_startup_progress": false
            }),
            false,
        ));
        let settings = apply_settings(&mut store);
        assert_eq!(settings.loader.assets_folder, "[assets]/packs");
        assert_eq!(settings.loader.cache_folder, "[data]/downloads");
        assert!(!settings.loader.show_startup_progress);
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn malformed_sections_keep_their_defaults() {
        let mut store = SettingsStore::new();
        assert!(store.set(LOGGING_KEY, json!("not an object"), false));
        let settings = apply_settings(&mut store);
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn settings_files_feed_the_appliers() -> Result<()> {
        let dir = tempfile::tempdir().context("create settings dir")?;
        let path = dir.path().join("forage.json");
        std::fs::write(&path, r#"{ "loader": { "assets_folder": "[assets]/media" } }"#)
            .context("write settings document")?;

        let mut store = SettingsStore::load_from_file(&path).context("load settings document")?;
        let settings = apply_settings(&mut store);
        assert_eq!(settings.loader.assets_folder, "[assets]/media");
        assert_eq!(settings.loader.cache_folder, "[data]/cache");
        assert!(settings.loader.show_startup_progress);
        Ok(())
    }
}
