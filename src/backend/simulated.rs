//! Simulated Sensor Array
//!
//! This module provides a software peripheral that speaks the same wire
//! format as the real sensor array, so the whole dashboard can run without
//! hardware. It is always compiled and selectable from the UI.
//!
//! # Data Patterns
//!
//! - [`SimulatedPattern::Constant`] - Fixed value on every channel
//! - [`SimulatedPattern::Sine`] - Sine wave, phase-shifted per channel
//! - [`SimulatedPattern::Ramp`] - Rising counter that wraps, offset per channel
//!
//! # Fault Injection
//!
//! Tests drive the error paths with:
//!
//! - [`SimulatedSensorArray::fail_connect`] - connect returns a transport error
//! - [`SimulatedSensorArray::fail_after`] - reads start failing after N frames
//! - [`SimulatedSensorArray::drop_link_after`] - the link goes down after N frames
//! - [`SimulatedSensorArray::drop_link_idle_after`] - the link goes down after a delay, read or not
//! - [`SimulatedSensorArray::with_short_frames`] - payloads carry fewer values

use crate::backend::codec::encode_values;
use crate::config::{SimulatedConfig, SimulatedPattern};
use crate::error::{Result, SensorViewError};
use crate::types::DeviceIdentity;
use std::time::{Duration, Instant};

use super::device_trait::{DeviceStats, SensorDevice};

/// Software stand-in for the BLE sensor array
#[derive(Debug)]
pub struct SimulatedSensorArray {
    name: String,
    channel_count: u8,
    pattern: SimulatedPattern,
    noise: f64,
    connected: bool,
    start_time: Instant,
    frames_served: u64,
    rng_state: u64,
    fail_connect: bool,
    fail_after: Option<u64>,
    drop_link_after: Option<u64>,
    drop_link_idle_after: Option<Duration>,
    short_frame_values: Option<usize>,
    stats: DeviceStats,
}

impl Default for SimulatedSensorArray {
    fn default() -> Self {
        Self::from_config(&SimulatedConfig::default())
    }
}

impl SimulatedSensorArray {
    /// Create a simulated array from configuration
    pub fn from_config(config: &SimulatedConfig) -> Self {
        Self {
            name: config.name.clone(),
            channel_count: config.channel_count,
            pattern: config.pattern,
            noise: config.noise.max(0.0),
            connected: false,
            start_time: Instant::now(),
            frames_served: 0,
            rng_state: 0x9E37_79B9_7F4A_7C15,
            fail_connect: false,
            fail_after: None,
            drop_link_after: None,
            drop_link_idle_after: None,
            short_frame_values: None,
            stats: DeviceStats::default(),
        }
    }

    /// Create a noiseless array with the given channel count and pattern
    pub fn new(channel_count: u8, pattern: SimulatedPattern) -> Self {
        Self::from_config(&SimulatedConfig {
            channel_count,
            pattern,
            noise: 0.0,
            ..SimulatedConfig::default()
        })
    }

    /// Make the next connect attempt fail
    pub fn fail_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Serve `frames` payloads, then fail every read while staying connected
    pub fn fail_after(mut self, frames: u64) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Serve `frames` payloads, then drop the link
    pub fn drop_link_after(mut self, frames: u64) -> Self {
        self.drop_link_after = Some(frames);
        self
    }

    /// Drop the link `delay` after connecting, whether or not anything is read
    pub fn drop_link_idle_after(mut self, delay: Duration) -> Self {
        self.drop_link_idle_after = Some(delay);
        self
    }

    fn link_timed_out(&self) -> bool {
        self.drop_link_idle_after
            .is_some_and(|delay| self.start_time.elapsed() >= delay)
    }

    /// Only put `values` values in every payload
    pub fn with_short_frames(mut self, values: usize) -> Self {
        self.short_frame_values = Some(values);
        self
    }

    /// Number of payloads served so far
    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    fn next_noise(&mut self) -> f64 {
        let mut s = self.rng_state;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.rng_state = s;
        let unit = (s as f64) / (u64::MAX as f64);
        (unit - 0.5) * 2.0 * self.noise
    }

    fn generate_value(&mut self, channel: usize, elapsed_secs: f64) -> u16 {
        let channels = self.channel_count.max(1) as f64;
        let base = match self.pattern {
            SimulatedPattern::Constant { value } => value as f64,
            SimulatedPattern::Sine {
                period_s,
                amplitude,
                offset,
            } => {
                let phase = channel as f64 / channels * std::f64::consts::TAU;
                let period = if period_s > 0.0 { period_s } else { 1.0 };
                offset + amplitude * (std::f64::consts::TAU * elapsed_secs / period + phase).sin()
            }
            SimulatedPattern::Ramp { step, max } => {
                let span = max as u64 + 1;
                ((self.frames_served * step as u64 + channel as u64) % span) as f64
            }
        };
        let noisy = if self.noise > 0.0 {
            base + self.next_noise()
        } else {
            base
        };
        noisy.round().clamp(0.0, u16::MAX as f64) as u16
    }
}

impl SensorDevice for SimulatedSensorArray {
    fn connect(&mut self) -> Result<DeviceIdentity> {
        if self.fail_connect {
            return Err(SensorViewError::Transport(
                "simulated connect failure".to_string(),
            ));
        }
        self.connected = true;
        self.start_time = Instant::now();
        self.frames_served = 0;
        self.stats.reset();
        tracing::info!(
            "Simulated array '{}' connected ({} channels)",
            self.name,
            self.channel_count
        );
        Ok(DeviceIdentity::new(
            self.name.clone(),
            format!("sim-{:02x}", self.channel_count),
        ))
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected && !self.link_timed_out()
    }

    fn read_channel_count(&mut self) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(SensorViewError::NotConnected);
        }
        Ok(vec![self.channel_count])
    }

    fn read_frame(&mut self) -> Result<Vec<u8>> {
        if !self.connected {
            self.stats.record_failure();
            return Err(SensorViewError::NotConnected);
        }
        if self.link_timed_out() || self.drop_link_after.is_some_and(|n| self.frames_served >= n) {
            self.connected = false;
            self.stats.record_failure();
            return Err(SensorViewError::Transport("link lost".to_string()));
        }
        if self.fail_after.is_some_and(|n| self.frames_served >= n) {
            self.stats.record_failure();
            return Err(SensorViewError::Transport(
                "simulated read failure".to_string(),
            ));
        }

        let started = Instant::now();
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let count = self
            .short_frame_values
            .map_or(self.channel_count as usize, |n| {
                n.min(self.channel_count as usize)
            });
        let values: Vec<u16> = (0..count)
            .map(|ch| self.generate_value(ch, elapsed))
            .collect();
        let payload = encode_values(&values);

        self.frames_served += 1;
        self.stats
            .record_success(started.elapsed().as_micros() as u64, payload.len() as u64);
        Ok(payload)
    }

    fn stats(&self) -> &DeviceStats {
        &self.stats
    }
}
