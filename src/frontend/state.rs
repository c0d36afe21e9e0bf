//! Action types for the frontend
//!
//! Panels return `AppAction`s instead of driving the controller directly,
//! which keeps widget code free of side effects and lets the app apply
//! actions in one place after the frame has been laid out.

use crate::config::TransportKind;

/// Actions that any panel can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Acquisition
    /// Pick the transport used by the next connect
    SetTransport(TransportKind),
    /// Discover and connect to a device
    Connect,
    /// Drop the connection and the session
    Disconnect,
    /// Start polling at the typed interval
    StartPolling,
    /// Stop polling
    StopPolling,

    // Log
    /// Save the full log as CSV
    DownloadCsv,
    /// Empty the full log
    ClearLog,
    /// Apply the window-size text field
    CommitWindowSize,

    // Display
    /// Flip one channel in the plot selection
    ToggleChannel(usize),
    /// Switch between dark and light visuals
    SetDarkMode(bool),
}
