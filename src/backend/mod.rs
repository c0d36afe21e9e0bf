//! Backend module for sensor-array polling
//!
//! This module handles all device communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe communication
//! with the frontend.
//!
//! # Architecture
//!
//! The backend runs in a separate thread from the UI, communicating via channels:
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (connect, start, stop, etc.)
//! - [`BackendMessage`] - Messages sent from backend to UI (readings, status, errors)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`SensorBackend`] - Main backend entry point that spawns the worker thread
//!
//! # Components
//!
//! - [`SensorDevice`] - Transport-independent peripheral interface
//! - [`SimulatedSensorArray`] - Software peripheral, always available
//! - `BleSensorDevice` - Bluetooth LE peripheral (`ble` feature)
//! - [`BackendWorker`] - Worker loop that processes commands and runs the poll timer
//! - [`codec`] - Wire format of the sensor service
//!
//! # Example
//!
//! ```ignore
//! use sensorview_rs::backend::SensorBackend;
//! use sensorview_rs::config::{AppConfig, TransportKind};
//! use std::time::Duration;
//!
//! let (backend, frontend) = SensorBackend::new(AppConfig::default());
//! std::thread::spawn(move || backend.run());
//!
//! frontend.connect(TransportKind::Simulated);
//! frontend.start_polling(Duration::from_millis(250));
//!
//! for msg in frontend.drain() {
//!     if let BackendMessage::Reading(reading) = msg {
//!         // Feed the session
//!     }
//! }
//! ```

#[cfg(feature = "ble")]
pub mod ble;
pub mod codec;
pub mod device_trait;
pub mod simulated;
pub mod worker;

#[cfg(feature = "ble")]
pub use ble::BleSensorDevice;
pub use device_trait::{DeviceStats, SensorDevice};
pub use simulated::SimulatedSensorArray;
pub use worker::{BackendWorker, DeviceFactory};

use crate::config::{AppConfig, DeviceConfig, TransportKind};
use crate::error::{Result, SensorViewError};
use crate::types::{CollectionStats, ConnectionStatus, DeviceInfo, Reading};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Capacity of the UI-to-backend command queue
pub const COMMAND_QUEUE_SIZE: usize = 256;

/// Open an unconnected device for the requested transport
pub fn open_device(kind: TransportKind, config: &DeviceConfig) -> Result<Box<dyn SensorDevice>> {
    match kind {
        TransportKind::Simulated => Ok(Box::new(SimulatedSensorArray::from_config(
            &config.simulated,
        ))),
        #[cfg(feature = "ble")]
        TransportKind::Ble => Ok(Box::new(BleSensorDevice::new(config)?)),
        #[cfg(not(feature = "ble"))]
        TransportKind::Ble => Err(SensorViewError::AdapterUnavailable),
    }
}

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Discover and connect to a device over the given transport
    Connect(TransportKind),
    /// Disconnect from the current device
    Disconnect,
    /// Start (or restart) polling at the given interval
    StartPolling { interval: Duration },
    /// Stop polling; idempotent
    StopPolling,
    /// Request current statistics
    RequestStats,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// Connected and the channel count has been read
    Connected(DeviceInfo),
    /// Connection attempt failed
    ConnectionError(String),
    /// Poll timer armed with the effective interval
    PollingStarted(Duration),
    /// Poll timer cancelled by the operator
    PollingStopped,
    /// A decoded frame
    Reading(Reading),
    /// A read failed; polling has been stopped
    ReadError(String),
    /// The device dropped the link; the backend is disconnected
    DeviceLost(String),
    /// Statistics update
    Stats(CollectionStats),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request connection over a transport
    pub fn connect(&self, transport: TransportKind) {
        let _ = self.command_sender.send(BackendCommand::Connect(transport));
    }

    /// Request disconnection
    pub fn disconnect(&self) {
        let _ = self.command_sender.send(BackendCommand::Disconnect);
    }

    /// Start polling at `interval`
    pub fn start_polling(&self, interval: Duration) {
        let _ = self
            .command_sender
            .send(BackendCommand::StartPolling { interval });
    }

    /// Stop polling
    pub fn stop_polling(&self) {
        let _ = self.command_sender.send(BackendCommand::StopPolling);
    }

    /// Ask for a statistics update
    pub fn request_stats(&self) {
        let _ = self.command_sender.send(BackendCommand::RequestStats);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The sensor backend that runs in a separate thread
pub struct SensorBackend {
    /// Configuration
    config: AppConfig,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Opens devices on connect
    factory: DeviceFactory,
}

impl SensorBackend {
    /// Create a new backend with communication channels
    pub fn new(config: AppConfig) -> (Self, FrontendReceiver) {
        Self::with_factory(config, Box::new(open_device))
    }

    /// Create a backend that opens devices through `factory`
    pub fn with_factory(config: AppConfig, factory: DeviceFactory) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_SIZE);
        // Bounded: readings wait for room, stats updates are dropped when full
        let (msg_tx, msg_rx) = bounded(config.acquisition.channel_buffer_size.max(1));

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
            factory,
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the backend loop on the current thread
    pub fn run(self) {
        let mut worker = BackendWorker::new(
            self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
            self.factory,
        );
        worker.run();
    }

    /// Run the backend loop on a named thread
    pub fn spawn(self) -> Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new()
            .name("sensor-backend".to_string())
            .spawn(move || self.run())
            .map_err(|e| SensorViewError::Io(e).with_context("Failed to spawn backend thread"))
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
