//! Backend Worker Thread Implementation
//!
//! This module contains the main worker loop that runs in a separate thread
//! and owns the sensor device. It communicates with the UI thread through
//! crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: connect, disconnect, start/stop polling
//! - **Polling**: reads and decodes one frame per tick of the poll timer
//! - **Statistics tracking**: read counters, latency and dropped stats updates
//! - **Error handling**: a failed read stops polling; a lost link disconnects
//! - **Liveness**: while idle the link is checked on every wakeup
//!
//! # Timing
//!
//! Starting polls once immediately, then once per interval. The worker waits
//! on the command queue until the next tick is due, so commands are handled
//! between ticks and a tick's read always completes before the next begins.
//! Starting while already polling re-arms the timer with the new interval.
//!
//! # Delivery
//!
//! Readings are never dropped. When the UI falls behind and the message
//! queue is full, the worker blocks until there is room (or it is told to
//! stop). Only statistics updates go out with `try_send`.

use crate::backend::codec::{decode_channel_count, decode_values};
use crate::backend::device_trait::SensorDevice;
use crate::backend::{BackendCommand, BackendMessage};
use crate::config::settings::clamp_poll_interval;
use crate::config::{AppConfig, DeviceConfig, TransportKind};
use crate::error::{Result, ResultExt};
use crate::types::{CollectionStats, ConnectionStatus, DeviceInfo, Reading};
use crossbeam_channel::{
    Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Opens an unconnected device for a transport
pub type DeviceFactory =
    Box<dyn FnMut(TransportKind, &DeviceConfig) -> Result<Box<dyn SensorDevice>> + Send>;

/// How long to block on the command queue while not polling
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// How long one blocked reading delivery waits before rechecking the running flag
const DELIVERY_RETRY: Duration = Duration::from_millis(100);

/// How often statistics are pushed while polling
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// The backend worker that runs the polling loop
pub struct BackendWorker {
    /// Application configuration
    config: AppConfig,
    /// Command receiver from the UI
    command_rx: Receiver<BackendCommand>,
    /// Message sender to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Opens devices on connect
    factory: DeviceFactory,
    /// The connected device, if any
    device: Option<Box<dyn SensorDevice>>,
    /// Channel count read on connect
    channel_count: usize,
    /// Current connection status
    connection_status: ConnectionStatus,
    /// Poll interval while polling
    poll_interval: Option<Duration>,
    /// When the next tick is due
    next_poll: Instant,
    /// Statistics
    stats: CollectionStats,
    /// Last time stats were sent to UI
    last_stats_time: Instant,
}

impl BackendWorker {
    /// Create a new backend worker
    pub fn new(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
        factory: DeviceFactory,
    ) -> Self {
        Self {
            config,
            command_rx,
            message_tx,
            running,
            factory,
            device: None,
            channel_count: 0,
            connection_status: ConnectionStatus::Disconnected,
            poll_interval: None,
            next_poll: Instant::now(),
            stats: CollectionStats::default(),
            last_stats_time: Instant::now(),
        }
    }

    /// Whether the poll timer is armed
    pub fn is_polling(&self) -> bool {
        self.poll_interval.is_some()
    }

    /// Current connection status
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Backend worker started");

        while self.running.load(Ordering::SeqCst) {
            self.wait_for_command();
            self.process_commands();

            if !self.is_polling() {
                self.check_link();
            }

            if self.is_polling() && Instant::now() >= self.next_poll {
                self.poll_once();
                if let Some(interval) = self.poll_interval {
                    self.next_poll += interval;
                    // Skip missed ticks instead of bursting after a slow read
                    let now = Instant::now();
                    if self.next_poll < now {
                        self.next_poll = now + interval;
                    }
                }

                if self.last_stats_time.elapsed() >= STATS_INTERVAL {
                    self.send_stats();
                    self.last_stats_time = Instant::now();
                }
            }
        }

        self.shutdown_device();

        let _ = self.message_tx.send(BackendMessage::Shutdown);
        tracing::info!("Backend worker stopped");
    }

    /// Block until a command arrives or the next tick is due
    fn wait_for_command(&mut self) {
        let timeout = if self.is_polling() {
            self.next_poll.saturating_duration_since(Instant::now())
        } else {
            IDLE_WAIT
        };
        if timeout.is_zero() {
            return;
        }
        match self.command_rx.recv_timeout(timeout) {
            Ok(cmd) => self.handle_command(cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => self.running.store(false, Ordering::SeqCst),
        }
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Connect(transport) => self.handle_connect(transport),
            BackendCommand::Disconnect => self.handle_disconnect(),
            BackendCommand::StartPolling { interval } => self.start_polling(interval),
            BackendCommand::StopPolling => self.stop_polling(),
            BackendCommand::RequestStats => self.send_stats(),
            BackendCommand::Shutdown => self.running.store(false, Ordering::SeqCst),
        }
    }

    /// Handle connect command
    fn handle_connect(&mut self, transport: TransportKind) {
        if self.device.is_some() {
            self.shutdown_device();
        }
        self.update_connection_status(ConnectionStatus::Connecting);

        match self.open_and_connect(transport) {
            Ok((device, info)) => {
                tracing::info!(
                    "Connected to {} ({}) with {} channels",
                    info.identity.display_name(),
                    info.identity.id,
                    info.channel_count
                );
                self.device = Some(device);
                self.channel_count = info.channel_count;
                self.stats = CollectionStats::default();
                self.update_connection_status(ConnectionStatus::Connected);
                let _ = self.message_tx.send(BackendMessage::Connected(info));
            }
            Err(e) => {
                if e.is_transport() {
                    tracing::warn!("Failed to connect over {}: {}", transport, e);
                } else {
                    tracing::error!("Failed to connect over {}: {}", transport, e);
                }
                self.update_connection_status(ConnectionStatus::Error);
                let _ = self
                    .message_tx
                    .send(BackendMessage::ConnectionError(e.to_string()));
            }
        }
    }

    /// Open a device, connect and read its channel count
    fn open_and_connect(
        &mut self,
        transport: TransportKind,
    ) -> Result<(Box<dyn SensorDevice>, DeviceInfo)> {
        let mut device = (self.factory)(transport, &self.config.device)?;
        let identity = device.connect()?;
        let channel_count = device
            .read_channel_count()
            .and_then(|raw| decode_channel_count(&raw))
            .context("Failed to read channel count");
        match channel_count {
            Ok(channel_count) => Ok((
                device,
                DeviceInfo {
                    identity,
                    channel_count,
                },
            )),
            Err(e) => {
                device.disconnect();
                Err(e)
            }
        }
    }

    /// Handle disconnect command
    fn handle_disconnect(&mut self) {
        self.shutdown_device();
        self.update_connection_status(ConnectionStatus::Disconnected);
        tracing::info!("Disconnected from device");
    }

    fn shutdown_device(&mut self) {
        self.poll_interval = None;
        if let Some(mut device) = self.device.take() {
            device.disconnect();
        }
        self.channel_count = 0;
    }

    /// Arm (or re-arm) the poll timer; the first tick is immediate
    fn start_polling(&mut self, interval: Duration) {
        if self.device.is_none() {
            tracing::warn!("Start polling ignored: not connected");
            return;
        }
        let interval = clamp_poll_interval(interval.as_millis() as u64);
        self.poll_interval = Some(interval);
        self.next_poll = Instant::now();
        self.last_stats_time = Instant::now();
        tracing::info!("Polling every {} ms", interval.as_millis());
        let _ = self
            .message_tx
            .send(BackendMessage::PollingStarted(interval));
    }

    /// Cancel the poll timer; idempotent
    fn stop_polling(&mut self) {
        if self.poll_interval.take().is_some() {
            tracing::info!("Polling stopped");
        }
        let _ = self.message_tx.send(BackendMessage::PollingStopped);
    }

    /// Read, decode and forward one frame
    pub(crate) fn poll_once(&mut self) {
        let Some(device) = self.device.as_mut() else {
            self.poll_interval = None;
            return;
        };

        match device.read_frame() {
            Ok(payload) => {
                let values: Vec<f64> = decode_values(&payload, self.channel_count)
                    .into_iter()
                    .map(f64::from)
                    .collect();
                tracing::debug!("Frame of {} bytes, {} values", payload.len(), values.len());
                self.refresh_stats();
                self.deliver(BackendMessage::Reading(Reading::new(values)));
            }
            Err(e) => {
                self.poll_interval = None;
                let link_lost = !device.is_connected();
                self.refresh_stats();
                if link_lost {
                    self.lose_device(e.to_string());
                } else {
                    tracing::error!("Read failed, polling stopped: {}", e);
                    let _ = self.message_tx.send(BackendMessage::ReadError(e.to_string()));
                }
            }
        }
    }

    /// Report a link that went down while idle
    pub(crate) fn check_link(&mut self) {
        if self.device.as_ref().is_some_and(|device| !device.is_connected()) {
            self.lose_device("link lost".to_string());
        }
    }

    fn lose_device(&mut self, reason: String) {
        tracing::warn!("Device disconnected: {}", reason);
        self.shutdown_device();
        self.update_connection_status(ConnectionStatus::Disconnected);
        let _ = self.message_tx.send(BackendMessage::DeviceLost(reason));
    }

    /// Copy device counters into the collection stats
    fn refresh_stats(&mut self) {
        if let Some(device) = self.device.as_ref() {
            let device_stats = device.stats();
            self.stats.successful_reads = device_stats.successful_reads;
            self.stats.failed_reads = device_stats.failed_reads;
            self.stats.avg_read_time_us = device_stats.avg_read_time_us();
            self.stats.last_read_time_us = device_stats.last_read_time_us;
            self.stats.read_jitter_us = device_stats.jitter_us();
            self.stats.total_bytes_read = device_stats.total_bytes_read;
        }
    }

    /// Update connection status and notify UI
    fn update_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
        let _ = self
            .message_tx
            .send(BackendMessage::ConnectionStatus(status));
    }

    /// Send statistics to UI (using try_send for backpressure)
    fn send_stats(&mut self) {
        self.refresh_stats();
        let stats = self.stats.clone();
        self.try_send_message(BackendMessage::Stats(stats));
    }

    /// Send a message that must not be lost, waiting for queue space
    fn deliver(&mut self, mut msg: BackendMessage) {
        loop {
            match self.message_tx.send_timeout(msg, DELIVERY_RETRY) {
                Ok(()) => return,
                Err(SendTimeoutError::Timeout(back)) => {
                    if !self.running.load(Ordering::SeqCst) {
                        return;
                    }
                    msg = back;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    self.running.store(false, Ordering::SeqCst);
                    return;
                }
            }
        }
    }

    /// Try to send a message, tracking dropped messages if queue is full
    fn try_send_message(&mut self, msg: BackendMessage) {
        if self.message_tx.try_send(msg).is_err() {
            self.stats.dropped_messages += 1;
        }
    }
}
