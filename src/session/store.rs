//! Sample store: full log plus a bounded rolling window

use std::collections::VecDeque;

use crate::config::settings::{clamp_window_size, parse_window_size};
use crate::config::DEFAULT_WINDOW_SIZE;
use crate::error::{Result, SensorViewError};
use crate::types::Reading;

/// Holds every reading of the session and a rolling window of the most recent ones.
///
/// The full log only grows, except on [`SampleStore::clear`]. The rolling
/// window never holds more than [`SampleStore::window_size`] readings and
/// evicts oldest-first. Clearing the log leaves the window alone.
#[derive(Debug, Clone)]
pub struct SampleStore {
    log: Vec<Reading>,
    window: VecDeque<Reading>,
    window_size: usize,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl SampleStore {
    /// Create an empty store; `window_size` is clamped into the allowed range
    pub fn new(window_size: usize) -> Self {
        let window_size = clamp_window_size(window_size as f64);
        Self {
            log: Vec::new(),
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Record a reading in the log and the rolling window
    pub fn append(&mut self, reading: Reading) {
        self.window.push_back(reading.clone());
        self.log.push(reading);
        self.trim_window();
    }

    /// Empty the full log
    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Change the rolling-window bound, evicting the oldest readings if needed
    pub fn set_window_size(&mut self, n: f64) -> usize {
        self.window_size = clamp_window_size(n);
        self.trim_window();
        self.window_size
    }

    /// Change the rolling-window bound from operator text.
    ///
    /// Non-numeric text leaves the bound unchanged.
    pub fn set_window_size_text(&mut self, text: &str) -> Result<usize> {
        let size = parse_window_size(text).ok_or_else(|| {
            SensorViewError::InvalidInput(format!("window size '{}' is not a number", text))
        })?;
        Ok(self.set_window_size(size as f64))
    }

    fn trim_window(&mut self) {
        while self.window.len() > self.window_size {
            self.window.pop_front();
        }
    }

    pub fn log(&self) -> &[Reading] {
        &self.log
    }

    pub fn window(&self) -> &VecDeque<Reading> {
        &self.window
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Current rolling-window bound
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Most recent reading in the window
    pub fn latest(&self) -> Option<&Reading> {
        self.window.back()
    }
}
