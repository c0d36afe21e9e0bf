//! # SensorView-RS: Live Sensor-Array Dashboard
//!
//! A desktop dashboard for small sensor arrays that expose a channel count
//! and a frame of big-endian `u16` samples over Bluetooth LE. Each frame
//! paints a heat grid, extends a rolling time-series plot and is appended to
//! a full log that can be saved as CSV.
//!
//! ## Architecture
//!
//! - **Backend**: Polls the device on a worker thread ([`backend`])
//! - **Acquisition**: Turns operator actions into backend commands and
//!   applies the replies to the session ([`acquisition`])
//! - **Session**: Full log, rolling window, channel selection, CSV export ([`session`])
//! - **Analysis**: Heat scale, grid layout, time-series frames ([`analysis`])
//! - **Frontend**: Renders everything with eframe/egui and egui_plot ([`frontend`])
//! - **Communication**: Crossbeam channels between the UI and the worker
//!
//! ## Configuration
//!
//! An optional `sensorview.toml` and the remembered preferences live in the
//! platform data directory under `dev.sensorview.sensorview-rs`:
//!
//! - **Linux**: `~/.local/share/dev.sensorview.sensorview-rs/`
//! - **macOS**: `~/Library/Application Support/dev.sensorview.sensorview-rs/`
//! - **Windows**: `%APPDATA%\dev.sensorview.sensorview-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use sensorview_rs::{
//!     backend::SensorBackend,
//!     config::{AppConfig, AppState},
//!     frontend::SensorViewApp,
//! };
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let app_state = AppState::load_or_default();
//!
//!     let (backend, frontend_receiver) = SensorBackend::new(config.clone());
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "Sensor View",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| {
//!             Ok(Box::new(SensorViewApp::new(
//!                 cc,
//!                 frontend_receiver,
//!                 config,
//!                 app_state,
//!             )))
//!         }),
//!     )
//! }
//! ```

pub mod acquisition;
pub mod analysis;
pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use acquisition::{AcquisitionController, ControlState};
pub use backend::{BackendCommand, BackendMessage, FrontendReceiver, SensorBackend};
pub use config::{AppConfig, AppState};
pub use error::{Result, SensorViewError};
pub use frontend::SensorViewApp;
pub use session::Session;
pub use types::{AcquisitionState, DeviceInfo, Reading};
