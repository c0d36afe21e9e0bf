//! Error handling for the SensorView-RS application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.
//!
//! Errors fall into two families:
//!
//! - **Transport** errors come from the device adapter (discovery, connect,
//!   read). They abort the current connect attempt or poll tick.
//! - **Input** errors come from operator-entered configuration. Callers
//!   clamp or ignore these rather than surfacing them as failures.

use thiserror::Error;

/// Main error type for SensorView-RS operations
#[derive(Error, Debug)]
pub enum SensorViewError {
    /// Errors reported by the device transport (discovery, connect, read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// No usable Bluetooth adapter on this machine
    #[error("Bluetooth adapter not available")]
    AdapterUnavailable,

    /// No peripheral advertising the sensor service was found
    #[error("No sensor device found")]
    DeviceNotFound,

    /// An operation needed a live connection
    #[error("Not connected")]
    NotConnected,

    /// A payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Operator input that could not be interpreted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SensorViewError>,
    },
}

impl SensorViewError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SensorViewError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error originated in the device transport
    pub fn is_transport(&self) -> bool {
        match self {
            SensorViewError::Transport(_)
            | SensorViewError::AdapterUnavailable
            | SensorViewError::DeviceNotFound
            | SensorViewError::NotConnected
            | SensorViewError::Decode(_) => true,
            SensorViewError::WithContext { source, .. } => source.is_transport(),
            _ => false,
        }
    }
}

/// Result type alias for SensorView-RS operations
pub type Result<T> = std::result::Result<T, SensorViewError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(feature = "ble")]
impl From<btleplug::Error> for SensorViewError {
    fn from(err: btleplug::Error) -> Self {
        SensorViewError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SensorViewError::Transport("GATT read failed".to_string());
        assert_eq!(err.to_string(), "Transport error: GATT read failed");
    }

    #[test]
    fn test_error_with_context() {
        let err = SensorViewError::NotConnected;
        let with_ctx = err.with_context("Failed to read frame");
        assert!(with_ctx.to_string().contains("Failed to read frame"));
        assert!(with_ctx.to_string().contains("Not connected"));
    }

    #[test]
    fn test_transport_classification() {
        assert!(SensorViewError::AdapterUnavailable.is_transport());
        assert!(SensorViewError::Transport("x".into())
            .with_context("tick")
            .is_transport());
        assert!(!SensorViewError::InvalidInput("abc".into()).is_transport());
        assert!(!SensorViewError::Config("bad".into()).is_transport());
    }

    #[test]
    fn test_result_ext_context() {
        let res: Result<()> = Err(SensorViewError::DeviceNotFound);
        let err = res.context("Connect").unwrap_err();
        assert_eq!(err.to_string(), "Connect: No sensor device found");
    }
}
