//! Application-level configuration loading for the clock backend.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BLIND_CLOCK_CONFIG_PATH";

/// Snapshots older than this are never offered for recovery.
const DEFAULT_STALENESS_SECONDS: u64 = 3_600;
/// Default directory holding the JSON snapshot files.
const DEFAULT_DATA_DIR: &str = "data";
/// Default path prefix embedded in generated display URLs.
const DEFAULT_DISPLAY_BASE: &str = "/display";
/// Default buffered-event capacity for each broadcast channel behind the SSE
/// streams. Slow subscribers past this lag are dropped by the channel.
const DEFAULT_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    data_dir: PathBuf,
    staleness_window: Duration,
    sound_enabled_default: bool,
    display_base: String,
    clock_sse_capacity: usize,
    controller_sse_capacity: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Directory holding the snapshot store files.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Maximum age at which a persisted snapshot is still recoverable.
    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    /// Whether sound starts enabled for a fresh clock.
    pub fn sound_enabled_default(&self) -> bool {
        self.sound_enabled_default
    }

    /// Path prefix used when building spectator display URLs.
    pub fn display_base(&self) -> &str {
        &self.display_base
    }

    /// Broadcast capacity of the shared clock SSE channel.
    pub fn clock_sse_capacity(&self) -> usize {
        self.clock_sse_capacity
    }

    /// Broadcast capacity of the controller SSE channel.
    pub fn controller_sse_capacity(&self) -> usize {
        self.controller_sse_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            staleness_window: Duration::from_secs(DEFAULT_STALENESS_SECONDS),
            sound_enabled_default: true,
            display_base: DEFAULT_DISPLAY_BASE.to_string(),
            clock_sse_capacity: DEFAULT_SSE_CAPACITY,
            controller_sse_capacity: DEFAULT_SSE_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    data_dir: Option<PathBuf>,
    staleness_seconds: Option<u64>,
    sound_enabled: Option<bool>,
    display_base: Option<String>,
    clock_sse_capacity: Option<usize>,
    controller_sse_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            data_dir: value.data_dir.unwrap_or(defaults.data_dir),
            staleness_window: value
                .staleness_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.staleness_window),
            sound_enabled_default: value.sound_enabled.unwrap_or(defaults.sound_enabled_default),
            display_base: value.display_base.unwrap_or(defaults.display_base),
            clock_sse_capacity: value
                .clock_sse_capacity
                .unwrap_or(defaults.clock_sse_capacity),
            controller_sse_capacity: value
                .controller_sse_capacity
                .unwrap_or(defaults.controller_sse_capacity),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
