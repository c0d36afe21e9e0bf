//! Core data types for SensorView-RS
//!
//! This module contains the fundamental data structures shared by the
//! backend worker, the session model and the frontend.
//!
//! # Main Types
//!
//! - [`Reading`] - One timestamped frame of channel values
//! - [`DeviceInfo`] - Identity and channel count of the connected peripheral
//! - [`ConnectionStatus`] - Transport-level connection state
//! - [`AcquisitionState`] - Operator-visible state of the acquisition loop
//! - [`CollectionStats`] - Read counters and latency reported by the backend

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One synchronized snapshot of all channel values.
///
/// `values.len()` never exceeds the session's channel count; a short
/// transport payload yields a shorter reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Capture time
    pub timestamp: DateTime<Utc>,
    /// One value per channel, in channel order
    pub values: Vec<f64>,
}

impl Reading {
    /// Create a reading captured now
    pub fn new(values: Vec<f64>) -> Self {
        Self::at(Utc::now(), values)
    }

    /// Create a reading with an explicit capture time
    pub fn at(timestamp: DateTime<Utc>, values: Vec<f64>) -> Self {
        Self { timestamp, values }
    }

    /// Number of channel values carried
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the reading has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a channel, if present in this reading
    pub fn value(&self, channel: usize) -> Option<f64> {
        self.values.get(channel).copied()
    }

    /// ISO-8601 UTC timestamp with millisecond precision
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Identity of the connected peripheral
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Advertised name (may be empty)
    pub name: String,
    /// Transport-specific identifier
    pub id: String,
}

impl DeviceIdentity {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Name shown to the operator
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(unknown)"
        } else {
            &self.name
        }
    }
}

/// Everything negotiated once per connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub identity: DeviceIdentity,
    /// Number of sensor channels (numPx)
    pub channel_count: usize,
}

/// Connection state of the device transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Not connected to any device
    #[default]
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected and ready
    Connected,
    /// Connection error occurred
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// State machine of the acquisition loop
///
/// ```text
/// Disconnected -> Connecting -> ConnectedIdle <-> ConnectedPolling
///       ^                           |                   |
///       +---------------------------+-------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionState {
    #[default]
    Disconnected,
    Connecting,
    ConnectedIdle,
    ConnectedPolling,
}

impl AcquisitionState {
    /// True in either connected state
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            AcquisitionState::ConnectedIdle | AcquisitionState::ConnectedPolling
        )
    }

    pub fn is_polling(&self) -> bool {
        *self == AcquisitionState::ConnectedPolling
    }

    /// Coarse connection status for indicators
    pub fn connection_status(&self) -> ConnectionStatus {
        match self {
            AcquisitionState::Disconnected => ConnectionStatus::Disconnected,
            AcquisitionState::Connecting => ConnectionStatus::Connecting,
            AcquisitionState::ConnectedIdle | AcquisitionState::ConnectedPolling => {
                ConnectionStatus::Connected
            }
        }
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionState::Disconnected => write!(f, "Disconnected"),
            AcquisitionState::Connecting => write!(f, "Connecting"),
            AcquisitionState::ConnectedIdle => write!(f, "Idle"),
            AcquisitionState::ConnectedPolling => write!(f, "Polling"),
        }
    }
}

/// Statistics about the data collection
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    /// Number of successful frame reads
    pub successful_reads: u64,
    /// Number of failed frame reads
    pub failed_reads: u64,
    /// Average read time in microseconds
    pub avg_read_time_us: f64,
    /// Last read time in microseconds
    pub last_read_time_us: u64,
    /// Spread of recent read times in microseconds
    pub read_jitter_us: u64,
    /// Total bytes read
    pub total_bytes_read: u64,
    /// Statistics updates dropped because the UI queue was full
    pub dropped_messages: u64,
}

impl CollectionStats {
    /// Calculate the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_reads + self.failed_reads;
        if total == 0 {
            100.0
        } else {
            (self.successful_reads as f64 / total as f64) * 100.0
        }
    }
}
