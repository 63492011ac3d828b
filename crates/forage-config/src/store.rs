//! Raw key/value settings store backed by a JSON document on disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

type ApplierFn = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// String-keyed settings bag with explicit appliers for pushing values into
/// their consumers.
///
/// Values stay as raw [`Value`]s until a caller asks for a typed view via
/// [`SettingsStore::get`], so one document can serve consumers with different
/// schemas.
#[derive(Default)]
pub struct SettingsStore {
    values: Map<String, Value>,
    appliers: Vec<(String, ApplierFn)>,
}

impl SettingsStore {
    /// Create an empty store with no registered appliers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON document on disk.
    ///
    /// A missing file is not an error: the loader starts with defaults on
    /// first run, so this logs a warning and returns an empty store. Files
    /// with an extension other than `.json` are likewise rejected with a
    /// warning naming the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file exists but cannot be read,
    /// [`ConfigError::Parse`] when it is not valid JSON, and
    /// [`ConfigError::UnexpectedDocument`] when the JSON root is not an
    /// object.
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !has_json_extension(path) {
            warn!(
                path = %path.display(),
                extension = extension_label(path),
                "unsupported settings extension; starting with empty settings"
            );
            return Ok(Self::new());
        }
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "settings file not found; starting with empty settings"
                );
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "read_settings",
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        let document: Value =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        match document {
            Value::Object(values) => Ok(Self {
                values,
                appliers: Vec::new(),
            }),
            _ => Err(ConfigError::UnexpectedDocument {
                path: path.display().to_string(),
            }),
        }
    }

    /// Persist the store as pretty-printed JSON, creating the parent
    /// directory when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when the values cannot be encoded
    /// and [`ConfigError::Io`] when the directory or file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                operation: "create_settings_dir",
                path: parent.display().to_string(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(&self.values)
            .map_err(|source| ConfigError::Serialize { source })?;
        fs::write(path, encoded).map_err(|source| ConfigError::Io {
            operation: "write_settings",
            path: path.display().to_string(),
            source,
        })
    }

    /// Typed view of a stored value.
    ///
    /// The raw value is re-parsed on every call; a shape mismatch logs a
    /// warning and yields `None` instead of failing the caller.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let Some(value) = self.values.get(key) else {
            debug!(key, "settings key not present");
            return None;
        };
        serde_json::from_value(value.clone()).map_or_else(
            |error| {
                warn!(key, %error, "stored settings value did not match the requested type");
                None
            },
            Some,
        )
    }

    /// Insert a value, honoring the overwrite flag.
    ///
    /// Returns `false` (and logs a warning) when the key already exists and
    /// `overwrite` is not set; the stored value is left untouched.
    pub fn set(&mut self, key: impl Into<String>, value: Value, overwrite: bool) -> bool {
        let key = key.into();
        if !overwrite && self.values.contains_key(&key) {
            warn!(key, "refusing to overwrite existing settings key");
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Whether a raw value exists for the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Register an applier that pushes the value stored under `key` into its
    /// consumer when [`SettingsStore::apply_all`] runs.
    ///
    /// Multiple appliers may target the same key; they run in registration
    /// order.
    pub fn register_applier<F>(&mut self, key: impl Into<String>, applier: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.appliers.push((key.into(), Box::new(applier)));
    }

    /// Run every registered applier whose key has a stored value, returning
    /// how many accepted their value.
    ///
    /// Appliers for absent keys are skipped, a rejected value is logged and
    /// does not stop the walk, and stored keys with no registered applier are
    /// noted at debug level and left alone.
    pub fn apply_all(&self) -> usize {
        let mut applied = 0;
        for (key, applier) in &self.appliers {
            let Some(value) = self.values.get(key) else {
                debug!(key, "no stored value for registered applier");
                continue;
            };
            match applier(value) {
                Ok(()) => applied += 1,
                Err(reason) => {
                    warn!(key, reason, "settings applier rejected stored value");
                }
            }
        }
        for key in self.values.keys() {
            if !self.appliers.iter().any(|(registered, _)| registered == key) {
                debug!(key, "settings key has no registered applier");
            }
        }
        applied
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("values", &self.values)
            .field("appliers", &self.appliers.len())
            .finish()
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

fn extension_label(path: &Path) -> &str {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("<none>")
}
