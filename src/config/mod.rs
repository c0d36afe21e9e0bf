//! Configuration module for SensorView-RS
//!
//! This module handles application configuration including:
//! - The TOML configuration file (device selection, poll interval, window size)
//! - Application state persistence (last device, export directory, theme)
//! - Runtime settings during execution
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.sensorview.sensorview-rs/`
//! - **macOS**: `~/Library/Application Support/dev.sensorview.sensorview-rs/`
//! - **Windows**: `%APPDATA%\dev.sensorview.sensorview-rs\`
//!
//! # Files
//!
//! - `sensorview.toml` - Optional configuration, overridable with `SENSORVIEW_CONFIG`
//! - `app_state.json` - Preferences remembered between runs
//! - `logs/` - Daily rolling log files

pub mod settings;

pub use settings::*;

use crate::error::{Result, SensorViewError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.sensorview.sensorview-rs";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Configuration filename
pub const CONFIG_FILE: &str = "sensorview.toml";

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV: &str = "SENSORVIEW_CONFIG";

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Shortest allowed poll interval in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Default rolling-window size in samples
pub const DEFAULT_WINDOW_SIZE: usize = 300;

/// Smallest rolling-window size
pub const MIN_WINDOW_SIZE: usize = 10;

/// Largest rolling-window size
pub const MAX_WINDOW_SIZE: usize = 5000;

/// Default BLE scan duration in milliseconds
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 3000;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        SensorViewError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            SensorViewError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

/// Get the configuration file path, honouring [`CONFIG_PATH_ENV`]
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => app_data_dir().map(|p| p.join(CONFIG_FILE)),
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// Preferences remembered between runs. Readings are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Name of the last device connected to
    #[serde(default)]
    pub last_device_name: Option<String>,

    /// Directory the last CSV export was written to
    #[serde(default)]
    pub last_export_dir: Option<PathBuf>,

    /// UI preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_device_name: None,
            last_export_dir: None,
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            SensorViewError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load app state from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SensorViewError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| SensorViewError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(APP_STATE_FILE))
    }

    /// Save app state to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            SensorViewError::Config(format!("Failed to serialize app state: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| SensorViewError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Remember where the last export went
    pub fn record_export(&mut self, path: &Path) {
        self.last_export_dir = path.parent().map(Path::to_path_buf);
    }

    /// Remember the device shown as "last used" on the next start; blank names are ignored
    pub fn remember_device(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.last_device_name = Some(name.to_string());
        }
    }
}

/// UI preferences that persist across runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

// ==================== App Config ====================

/// Application configuration loaded from `sensorview.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device selection and discovery
    #[serde(default)]
    pub device: DeviceConfig,

    /// Polling and buffering
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Display options
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file (TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SensorViewError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SensorViewError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load from [`config_path`], falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("{}; using defaults", e);
            Self::default()
        })
    }

    /// Save the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SensorViewError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SensorViewError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            SensorViewError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

// ==================== Device Config ====================

/// Which transport to open on connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Built-in simulated sensor array
    #[default]
    Simulated,
    /// Bluetooth LE peripheral (requires the `ble` feature)
    Ble,
}

impl TransportKind {
    /// Transports compiled into this build
    pub fn available() -> &'static [TransportKind] {
        #[cfg(feature = "ble")]
        {
            &[TransportKind::Simulated, TransportKind::Ble]
        }
        #[cfg(not(feature = "ble"))]
        {
            &[TransportKind::Simulated]
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Simulated => write!(f, "Simulated"),
            TransportKind::Ble => write!(f, "Bluetooth LE"),
        }
    }
}

/// Device discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Transport used by the Connect button
    #[serde(default)]
    pub transport: TransportKind,

    /// Only accept peripherals whose name starts with this prefix
    #[serde(default)]
    pub name_prefix: Option<String>,

    /// How long to scan before picking a peripheral
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,

    /// Simulated array parameters
    #[serde(default)]
    pub simulated: SimulatedConfig,
}

fn default_scan_timeout_ms() -> u64 {
    DEFAULT_SCAN_TIMEOUT_MS
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            name_prefix: None,
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            simulated: SimulatedConfig::default(),
        }
    }
}

/// Signal shape produced by the simulated array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulatedPattern {
    /// Every channel holds a fixed value
    Constant { value: u16 },
    /// Phase-shifted sine per channel
    Sine { period_s: f64, amplitude: f64, offset: f64 },
    /// Rising ramp that wraps at `max`
    Ramp { step: u16, max: u16 },
}

impl Default for SimulatedPattern {
    fn default() -> Self {
        SimulatedPattern::Sine {
            period_s: 5.0,
            amplitude: 400.0,
            offset: 1000.0,
        }
    }
}

/// Parameters of the simulated sensor array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedConfig {
    /// Advertised name
    #[serde(default = "default_simulated_name")]
    pub name: String,

    /// Number of channels reported on connect
    #[serde(default = "default_simulated_channels")]
    pub channel_count: u8,

    /// Signal shape
    #[serde(default)]
    pub pattern: SimulatedPattern,

    /// Peak uniform noise added to every value
    #[serde(default)]
    pub noise: f64,
}

fn default_simulated_name() -> String {
    "SimArray".to_string()
}

fn default_simulated_channels() -> u8 {
    16
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            name: default_simulated_name(),
            channel_count: default_simulated_channels(),
            pattern: SimulatedPattern::default(),
            noise: 20.0,
        }
    }
}

// ==================== Acquisition Config ====================

/// Polling and buffering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Initial poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Initial rolling-window size in samples
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Capacity of the backend-to-UI message queue
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_channel_buffer_size() -> usize {
    4096
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            window_size: DEFAULT_WINDOW_SIZE,
            channel_buffer_size: default_channel_buffer_size(),
        }
    }
}

// ==================== UI Config ====================

/// UI configuration for the grid and plot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Smallest edge length of a grid cell in points
    pub min_cell_size: f32,

    /// Height of the time-series plot in points
    pub plot_height: f32,

    /// Width of the control side panel
    pub side_panel_width: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_cell_size: 36.0,
            plot_height: 260.0,
            side_panel_width: 260.0,
        }
    }
}

// ==================== Tests ====================
