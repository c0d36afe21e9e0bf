//! Integration tests for backend lifecycle
//!
//! These tests run the real worker thread against simulated arrays:
//! - Connection and disconnection
//! - Polling start/stop
//! - Read failures and lost links, while polling and while idle
//! - Delivery when the UI stops draining
//! - Shutdown

mod common;

use common::mock_helpers::{ramp_array, spawn_backend, spawn_backend_with, wait_for};
use sensorview_rs::backend::BackendMessage;
use sensorview_rs::config::{AppConfig, TransportKind};
use sensorview_rs::types::ConnectionStatus;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(100);

#[test]
fn test_backend_creation_and_shutdown() {
    let (frontend, handle) = spawn_backend(Vec::new());

    frontend.shutdown();

    let (_, got_shutdown) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::Shutdown));
    assert!(got_shutdown, "Backend should announce shutdown");
    assert!(handle.join().is_ok(), "Backend thread should exit cleanly");
}

#[test]
fn test_connect_reports_channel_count() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(12)]);

    frontend.connect(TransportKind::Simulated);

    let (messages, connected) =
        wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    assert!(connected, "Should connect to the simulated array");
    assert!(messages.iter().any(|msg| matches!(
        msg,
        BackendMessage::ConnectionStatus(ConnectionStatus::Connecting)
    )));

    let info = messages
        .iter()
        .find_map(|msg| match msg {
            BackendMessage::Connected(info) => Some(info.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(info.channel_count, 12);
    assert_eq!(info.identity.name, "SimArray");

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_connect_failure_reports_error() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(4).fail_connect()]);

    frontend.connect(TransportKind::Simulated);

    let (messages, failed) =
        wait_for(&frontend, |msg| matches!(msg, BackendMessage::ConnectionError(_)));
    assert!(failed, "Should report the failed connect");
    assert!(!messages
        .iter()
        .any(|msg| matches!(msg, BackendMessage::Connected(_))));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_polling_delivers_readings() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(4)]);

    frontend.connect(TransportKind::Simulated);
    let (_, connected) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    assert!(connected);

    frontend.start_polling(POLL);

    let mut readings = 0;
    let (messages, _) = wait_for(&frontend, |msg| {
        if matches!(msg, BackendMessage::Reading(_)) {
            readings += 1;
        }
        readings >= 2
    });
    assert!(readings >= 2, "Should receive readings while polling");
    assert!(messages
        .iter()
        .any(|msg| matches!(msg, BackendMessage::PollingStarted(d) if *d == POLL)));

    for msg in &messages {
        if let BackendMessage::Reading(reading) = msg {
            assert_eq!(reading.len(), 4);
        }
    }

    frontend.stop_polling();
    let (_, stopped) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::PollingStopped));
    assert!(stopped);

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_short_interval_is_clamped() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(2)]);

    frontend.connect(TransportKind::Simulated);
    wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));

    frontend.start_polling(Duration::from_millis(5));
    let (messages, started) =
        wait_for(&frontend, |msg| matches!(msg, BackendMessage::PollingStarted(_)));
    assert!(started);
    assert!(messages
        .iter()
        .any(|msg| matches!(msg, BackendMessage::PollingStarted(d) if *d == POLL)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_read_error_stops_polling() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(4).fail_after(1)]);

    frontend.connect(TransportKind::Simulated);
    wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    frontend.start_polling(POLL);

    let (messages, errored) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::ReadError(_)));
    assert!(errored, "Second read should fail");
    let readings = messages
        .iter()
        .filter(|msg| matches!(msg, BackendMessage::Reading(_)))
        .count();
    assert_eq!(readings, 1);

    // Nothing more arrives after the failure
    std::thread::sleep(POLL * 3);
    assert!(!frontend
        .drain()
        .iter()
        .any(|msg| matches!(msg, BackendMessage::Reading(_))));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_lost_link_disconnects() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(4).drop_link_after(2)]);

    frontend.connect(TransportKind::Simulated);
    wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    frontend.start_polling(POLL);

    let (messages, lost) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::DeviceLost(_)));
    assert!(lost, "Dropping the link should be reported");
    assert!(messages.iter().any(|msg| matches!(
        msg,
        BackendMessage::ConnectionStatus(ConnectionStatus::Disconnected)
    )));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_reconnect_after_disconnect() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(4), ramp_array(9)]);

    frontend.connect(TransportKind::Simulated);
    wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));

    frontend.disconnect();
    let (_, disconnected) = wait_for(&frontend, |msg| {
        matches!(
            msg,
            BackendMessage::ConnectionStatus(ConnectionStatus::Disconnected)
        )
    });
    assert!(disconnected);

    frontend.connect(TransportKind::Simulated);
    let (messages, connected) =
        wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    assert!(connected);
    assert!(messages
        .iter()
        .any(|msg| matches!(msg, BackendMessage::Connected(info) if info.channel_count == 9)));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_idle_link_loss_is_reported() {
    let (frontend, handle) =
        spawn_backend(vec![ramp_array(4).drop_link_idle_after(Duration::from_millis(300))]);

    frontend.connect(TransportKind::Simulated);
    let (_, connected) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    assert!(connected);

    // No polling: the worker has to notice on its own
    let (messages, lost) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::DeviceLost(_)));
    assert!(lost, "An idle link drop should be reported");
    assert!(messages.iter().any(|msg| matches!(
        msg,
        BackendMessage::ConnectionStatus(ConnectionStatus::Disconnected)
    )));

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_stalled_ui_loses_no_readings() {
    let mut config = AppConfig::default();
    config.acquisition.channel_buffer_size = 8;
    let (frontend, handle) = spawn_backend_with(config, vec![ramp_array(4)]);

    frontend.connect(TransportKind::Simulated);
    let (_, connected) = wait_for(&frontend, |msg| matches!(msg, BackendMessage::Connected(_)));
    assert!(connected);

    frontend.start_polling(POLL);
    // Long enough to overrun the queue many times over
    std::thread::sleep(Duration::from_secs(2));
    frontend.stop_polling();

    let mut readings = 0u64;
    let (_, stopped) = wait_for(&frontend, |msg| {
        if matches!(msg, BackendMessage::Reading(_)) {
            readings += 1;
        }
        matches!(msg, BackendMessage::PollingStopped)
    });
    assert!(stopped);

    frontend.request_stats();
    let mut successful_reads = None;
    let (_, got_stats) = wait_for(&frontend, |msg| match msg {
        BackendMessage::Reading(_) => {
            readings += 1;
            false
        }
        BackendMessage::Stats(stats) => {
            successful_reads = Some(stats.successful_reads);
            true
        }
        _ => false,
    });
    assert!(got_stats);
    assert!(readings >= 6, "Polling should have filled the queue, got {}", readings);
    assert_eq!(Some(readings), successful_reads);

    frontend.shutdown();
    handle.join().unwrap();
}
