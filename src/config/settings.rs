//! Runtime settings that can be modified during application execution
//!
//! This module contains the operator-editable settings (poll interval and
//! rolling-window size) together with the lenient parsing rules applied to
//! them. Invalid numbers are never rejected outright: they are clamped to
//! the nearest valid value, or ignored when they are not numbers at all.
//!
//! # Rules
//!
//! - **Poll interval**: non-numeric or zero input falls back to
//!   [`DEFAULT_POLL_INTERVAL_MS`]; anything below [`MIN_POLL_INTERVAL_MS`]
//!   is raised to it.
//! - **Window size**: clamped into
//!   [`MIN_WINDOW_SIZE`]..=[`MAX_WINDOW_SIZE`] and floored; non-numeric
//!   input leaves the previous size unchanged.

use super::{
    AppConfig, DEFAULT_POLL_INTERVAL_MS, MAX_WINDOW_SIZE, MIN_POLL_INTERVAL_MS, MIN_WINDOW_SIZE,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Clamp a numeric window size into the allowed range, flooring fractions
pub fn clamp_window_size(n: f64) -> usize {
    if n.is_nan() {
        return MIN_WINDOW_SIZE;
    }
    n.floor()
        .clamp(MIN_WINDOW_SIZE as f64, MAX_WINDOW_SIZE as f64) as usize
}

/// Parse operator text as a window size.
///
/// Blank text counts as zero and so clamps to the minimum. Returns `None`
/// for other text that is not a finite number.
pub fn parse_window_size(text: &str) -> Option<usize> {
    let text = text.trim();
    if text.is_empty() {
        return Some(MIN_WINDOW_SIZE);
    }
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(clamp_window_size(value))
}

/// Clamp a poll interval to the minimum period
pub fn clamp_poll_interval(ms: u64) -> Duration {
    Duration::from_millis(ms.max(MIN_POLL_INTERVAL_MS))
}

/// Parse operator text as a poll interval.
///
/// Empty, zero, or non-numeric text uses the default interval.
pub fn parse_poll_interval(text: &str) -> Duration {
    let ms = match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => v.floor().max(0.0) as u64,
        _ => DEFAULT_POLL_INTERVAL_MS,
    };
    clamp_poll_interval(ms)
}

/// Runtime settings for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Poll interval text as typed by the operator
    pub poll_interval_text: String,

    /// Window size text as typed by the operator
    pub window_size_text: String,

    /// Last accepted rolling-window size
    pub window_size: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl RuntimeSettings {
    /// Seed runtime settings from the loaded configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let window_size = clamp_window_size(config.acquisition.window_size as f64);
        Self {
            poll_interval_text: config.acquisition.poll_interval_ms.to_string(),
            window_size_text: window_size.to_string(),
            window_size,
        }
    }

    /// Current poll interval after applying the leniency rules
    pub fn poll_interval(&self) -> Duration {
        parse_poll_interval(&self.poll_interval_text)
    }

    /// Commit the window-size text field.
    ///
    /// Returns the new size if the text was numeric. The text field is
    /// rewritten to show the accepted value either way.
    pub fn commit_window_size_text(&mut self) -> Option<usize> {
        let parsed = parse_window_size(&self.window_size_text);
        if let Some(size) = parsed {
            self.window_size = size;
        }
        self.window_size_text = self.window_size.to_string();
        parsed
    }
}
