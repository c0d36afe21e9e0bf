//! SensorDevice trait for a unified peripheral interface
//!
//! This module provides a common trait for all sensor-array transports,
//! enabling both real Bluetooth LE peripherals and the simulated array
//! used for demos and tests.

use crate::error::Result;
use crate::types::DeviceIdentity;
use std::collections::VecDeque;

/// Size of the rolling window for recent read times
const RECENT_WINDOW_SIZE: usize = 100;

/// Statistics for device read operations
#[derive(Debug, Clone)]
pub struct DeviceStats {
    /// Total number of successful reads
    pub successful_reads: u64,
    /// Total number of failed reads
    pub failed_reads: u64,
    /// Total read time in microseconds
    pub total_read_time_us: u64,
    /// Last read time in microseconds
    pub last_read_time_us: u64,
    /// Total bytes read
    pub total_bytes_read: u64,
    /// Rolling window of recent read times
    pub recent_read_times: VecDeque<u64>,
}

impl Default for DeviceStats {
    fn default() -> Self {
        Self {
            successful_reads: 0,
            failed_reads: 0,
            total_read_time_us: 0,
            last_read_time_us: 0,
            total_bytes_read: 0,
            recent_read_times: VecDeque::with_capacity(RECENT_WINDOW_SIZE),
        }
    }
}

impl DeviceStats {
    /// Calculate average read time in microseconds
    pub fn avg_read_time_us(&self) -> f64 {
        if self.successful_reads == 0 {
            0.0
        } else {
            self.total_read_time_us as f64 / self.successful_reads as f64
        }
    }

    /// Record a successful read operation
    pub fn record_success(&mut self, time_us: u64, bytes: u64) {
        self.successful_reads += 1;
        self.total_read_time_us += time_us;
        self.last_read_time_us = time_us;
        self.total_bytes_read += bytes;

        self.recent_read_times.push_back(time_us);
        if self.recent_read_times.len() > RECENT_WINDOW_SIZE {
            self.recent_read_times.pop_front();
        }
    }

    /// Record a failed read operation
    pub fn record_failure(&mut self) {
        self.failed_reads += 1;
    }

    /// Jitter (max - min) over the recent window in microseconds
    pub fn jitter_us(&self) -> u64 {
        let min = self.recent_read_times.iter().min().copied().unwrap_or(0);
        let max = self.recent_read_times.iter().max().copied().unwrap_or(0);
        max.saturating_sub(min)
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Unified interface for sensor-array peripherals
///
/// Implementations must be `Send` so the backend worker can own them on
/// its own thread. Reads block until the transport answers; no timeout is
/// applied at this layer.
#[cfg_attr(test, mockall::automock)]
pub trait SensorDevice: Send {
    /// Discover and connect to the peripheral
    fn connect(&mut self) -> Result<DeviceIdentity>;

    /// Drop the connection; safe to call when already disconnected
    fn disconnect(&mut self);

    /// Whether the link is still up
    fn is_connected(&self) -> bool;

    /// Read the raw channel-count characteristic
    fn read_channel_count(&mut self) -> Result<Vec<u8>>;

    /// Read one raw sensor data payload
    fn read_frame(&mut self) -> Result<Vec<u8>>;

    /// Get read statistics
    fn stats(&self) -> &DeviceStats;

}
