//! Acquisition controller
//!
//! UI-side half of the acquisition loop. It owns the [`Session`], tracks the
//! [`AcquisitionState`], turns operator actions into backend commands and
//! applies [`BackendMessage`]s coming back from the worker.
//!
//! # State machine
//!
//! ```text
//! Disconnected --connect--> Connecting --Connected--> ConnectedIdle
//!      ^                        |                       |    ^
//!      |                  ConnectionError          start|    |stop / read error
//!      |                        |                       v    |
//!      +------------------------+--disconnect-- ConnectedPolling
//!      +-------------------DeviceLost-------------------+
//! ```
//!
//! An explicit disconnect drops the session. A device-initiated disconnect
//! keeps it, so the log can still be exported or cleared until the next
//! successful connect replaces it.

use std::path::Path;

use chrono::Local;

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::config::settings::RuntimeSettings;
use crate::config::TransportKind;
use crate::error::{Result, SensorViewError};
use crate::session::{export, Session};
use crate::types::{AcquisitionState, CollectionStats, ConnectionStatus};

/// Which operator controls are currently usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub connect: bool,
    pub disconnect: bool,
    pub start: bool,
    pub stop: bool,
    pub download: bool,
    pub clear: bool,
}

/// Owns the session and drives the backend
pub struct AcquisitionController {
    frontend: FrontendReceiver,
    state: AcquisitionState,
    connection_status: ConnectionStatus,
    session: Option<Session>,
    settings: RuntimeSettings,
    transport: TransportKind,
    status: String,
    last_error: Option<String>,
    stats: CollectionStats,
}

impl AcquisitionController {
    pub fn new(frontend: FrontendReceiver, settings: RuntimeSettings, transport: TransportKind) -> Self {
        Self {
            frontend,
            state: AcquisitionState::Disconnected,
            connection_status: ConnectionStatus::Disconnected,
            session: None,
            settings,
            transport,
            status: String::new(),
            last_error: None,
            stats: CollectionStats::default(),
        }
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Transport-level status as last reported by the backend
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    /// The status line
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RuntimeSettings {
        &mut self.settings
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn set_transport(&mut self, transport: TransportKind) {
        self.transport = transport;
    }

    /// Button enablement
    pub fn controls(&self) -> ControlState {
        let connected = self.state.is_connected();
        let polling = self.state.is_polling();
        let has_log = self.session.is_some();
        ControlState {
            connect: self.state == AcquisitionState::Disconnected,
            disconnect: connected,
            start: connected && !polling,
            stop: polling,
            download: has_log,
            clear: has_log,
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        tracing::debug!("Status: {}", self.status);
    }

    fn report_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.set_status(format!("Error: {}", error));
        self.last_error = Some(error);
    }

    // ==================== Operator actions ====================

    /// Ask the backend to discover and connect
    pub fn connect(&mut self) {
        if self.state != AcquisitionState::Disconnected {
            return;
        }
        self.state = AcquisitionState::Connecting;
        self.last_error = None;
        self.set_status("Requesting device…");
        self.frontend.connect(self.transport);
    }

    /// Stop polling and drop the connection and the session
    pub fn disconnect(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        self.frontend.disconnect();
        self.state = AcquisitionState::Disconnected;
        self.session = None;
        self.set_status("Disconnected");
        tracing::info!("Disconnected by operator");
    }

    /// Start polling at the interval typed by the operator.
    ///
    /// Starting while already polling restarts the timer.
    pub fn start_polling(&mut self) -> Result<()> {
        if !self.state.is_connected() {
            self.set_status("Not connected");
            return Err(SensorViewError::NotConnected);
        }
        let interval = self.settings.poll_interval();
        self.frontend.start_polling(interval);
        self.state = AcquisitionState::ConnectedPolling;
        self.set_status(format!("Polling every {} ms…", interval.as_millis()));
        Ok(())
    }

    /// Stop polling; does nothing when not polling
    pub fn stop_polling(&mut self) {
        if !self.state.is_polling() {
            return;
        }
        self.frontend.stop_polling();
        self.state = AcquisitionState::ConnectedIdle;
        self.set_status("Polling stopped");
    }

    /// Empty the full log; window and heat scale are kept
    pub fn clear_log(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.store_mut().clear();
            self.set_status("Log cleared");
        }
    }

    /// Apply the window-size text field.
    ///
    /// Non-numeric text is ignored and the field reverts to the current size.
    pub fn commit_window_size(&mut self) -> Option<usize> {
        let size = self.settings.commit_window_size_text()?;
        if let Some(session) = self.session.as_mut() {
            session.store_mut().set_window_size(size as f64);
        }
        Some(size)
    }

    /// Flip a channel in the plot selection
    pub fn toggle_channel(&mut self, channel: usize) {
        if let Some(session) = self.session.as_mut() {
            session.selection_mut().toggle(channel);
        }
    }

    /// Default filename for exporting the current log
    pub fn suggested_filename(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.export_filename(Local::now()))
    }

    /// Write the full log as CSV to `path`
    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let session = self.session.as_ref().ok_or(SensorViewError::NotConnected)?;
        match export::export_to_path(path, &session.csv()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.report_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Ask the backend for fresh statistics
    pub fn request_stats(&self) {
        self.frontend.request_stats();
    }

    /// Tell the backend to exit
    pub fn shutdown(&self) {
        self.frontend.shutdown();
    }

    // ==================== Backend messages ====================

    /// Apply all pending backend messages; returns whether any arrived
    pub fn process_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.apply(msg);
        }
        had_messages
    }

    /// Apply one backend message
    pub fn apply(&mut self, msg: BackendMessage) {
        match msg {
            BackendMessage::ConnectionStatus(status) => {
                self.connection_status = status;
                if status == ConnectionStatus::Connecting
                    && self.state == AcquisitionState::Connecting
                {
                    self.set_status("Connecting…");
                }
            }
            BackendMessage::Connected(info) => {
                if self.state != AcquisitionState::Connecting {
                    tracing::warn!("Ignoring late connection to {}", info.identity.display_name());
                    return;
                }
                tracing::info!(
                    "Session started: {} with {} channels",
                    info.identity.display_name(),
                    info.channel_count
                );
                self.session = Some(Session::new(info, self.settings.window_size));
                self.state = AcquisitionState::ConnectedIdle;
                self.stats = CollectionStats::default();
                self.set_status("Connected. Ready to poll.");
            }
            BackendMessage::ConnectionError(error) => {
                self.state = AcquisitionState::Disconnected;
                self.report_error(error);
            }
            BackendMessage::PollingStarted(interval) => {
                if self.state.is_polling() {
                    self.set_status(format!("Polling every {} ms…", interval.as_millis()));
                }
            }
            BackendMessage::PollingStopped => {}
            BackendMessage::Reading(reading) => {
                if let Some(session) = self.session.as_mut() {
                    if self.state.is_connected() {
                        session.ingest(reading);
                        self.set_status(format!(
                            "Last update: {}",
                            Local::now().format("%H:%M:%S")
                        ));
                    }
                }
            }
            BackendMessage::ReadError(error) => {
                if self.state.is_polling() {
                    self.state = AcquisitionState::ConnectedIdle;
                }
                self.report_error(error);
            }
            BackendMessage::DeviceLost(error) => {
                tracing::warn!("Device lost: {}", error);
                self.state = AcquisitionState::Disconnected;
                self.last_error = Some(error);
                self.set_status("Device disconnected");
            }
            BackendMessage::Stats(stats) => {
                self.stats = stats;
            }
            BackendMessage::Shutdown => {
                tracing::info!("Backend shutdown received");
            }
        }
    }
}
