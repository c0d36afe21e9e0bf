//! Integration tests for the operator workflow
//!
//! Drives an [`AcquisitionController`] against a live backend thread:
//! connect, poll, adjust the window, select channels, export and clear.

mod common;

use common::builders::{DeviceInfoBuilder, ReadingBuilder};
use common::mock_helpers::{ramp_array, spawn_backend, spawn_backend_with};
use common::{assert_float_eq, backend_deadline};
use sensorview_rs::acquisition::AcquisitionController;
use sensorview_rs::config::settings::RuntimeSettings;
use sensorview_rs::config::{AppConfig, TransportKind};
use sensorview_rs::session::{export, Session};
use sensorview_rs::types::AcquisitionState;
use serial_test::serial;
use std::time::{Duration, Instant};

/// Pump backend messages until `done` holds or the deadline passes
fn pump_until(
    controller: &mut AcquisitionController,
    mut done: impl FnMut(&AcquisitionController) -> bool,
) -> bool {
    let deadline = Instant::now() + backend_deadline();
    while Instant::now() < deadline {
        controller.process_messages();
        if done(controller) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn settings(poll_ms: &str, window: &str) -> RuntimeSettings {
    let mut settings = RuntimeSettings::default();
    settings.poll_interval_text = poll_ms.to_string();
    settings.window_size_text = window.to_string();
    settings.commit_window_size_text();
    settings
}

#[test]
#[serial]
fn test_connect_poll_export_clear() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(6)]);
    let mut controller =
        AcquisitionController::new(frontend, settings("50", "10"), TransportKind::Simulated);

    controller.connect();
    assert_eq!(controller.status(), "Requesting device…");
    assert!(pump_until(&mut controller, |c| c.state()
        == AcquisitionState::ConnectedIdle));
    assert_eq!(controller.status(), "Connected. Ready to poll.");

    let session = controller.session().unwrap();
    assert_eq!(session.channel_count(), 6);
    assert_eq!(session.grid().layout().cols, 2);
    assert_eq!(session.grid().layout().rows, 3);

    // "50" is below the floor, so polling runs at 100 ms
    controller.start_polling().unwrap();
    assert_eq!(controller.status(), "Polling every 100 ms…");
    assert!(pump_until(&mut controller, |c| c
        .session()
        .is_some_and(|s| s.store().log_len() >= 12)));

    controller.stop_polling();
    assert_eq!(controller.state(), AcquisitionState::ConnectedIdle);

    let session = controller.session().unwrap();
    let logged = session.store().log_len();
    assert!(logged >= 12);
    assert_eq!(session.store().window_len(), 10, "window holds the last 10 samples");
    assert!(session.grid().cells().iter().all(|c| c.style.is_some()));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(controller.suggested_filename().unwrap());
    controller.export_to(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timestamp,sensor_0,sensor_1,sensor_2,sensor_3,sensor_4,sensor_5"
    );
    // Readings may still arrive between the export and the stop above
    assert!(lines.count() >= logged);

    controller.clear_log();
    assert_eq!(controller.status(), "Log cleared");
    let session = controller.session().unwrap();
    assert_eq!(session.store().log_len(), 0);
    assert_eq!(session.store().window_len(), 10);

    controller.disconnect();
    assert!(controller.session().is_none());
    controller.shutdown();
    handle.join().unwrap();
}

#[test]
#[serial]
fn test_window_resize_while_connected() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(2)]);
    let mut controller =
        AcquisitionController::new(frontend, settings("100", "300"), TransportKind::Simulated);

    controller.connect();
    assert!(pump_until(&mut controller, |c| c.state().is_connected()));

    controller.settings_mut().window_size_text = "1".to_string();
    assert_eq!(controller.commit_window_size(), Some(10));
    assert_eq!(controller.settings().window_size_text, "10");
    assert_eq!(controller.session().unwrap().store().window_size(), 10);

    controller.settings_mut().window_size_text = "lots".to_string();
    assert_eq!(controller.commit_window_size(), None);
    assert_eq!(controller.settings().window_size_text, "10");

    controller.shutdown();
    handle.join().unwrap();
}

#[test]
#[serial]
fn test_lost_device_keeps_log() {
    let (frontend, handle) = spawn_backend(vec![ramp_array(3).drop_link_after(2)]);
    let mut controller =
        AcquisitionController::new(frontend, settings("100", "300"), TransportKind::Simulated);

    controller.connect();
    assert!(pump_until(&mut controller, |c| c.state().is_connected()));
    controller.start_polling().unwrap();

    assert!(pump_until(&mut controller, |c| c.state()
        == AcquisitionState::Disconnected));
    assert_eq!(controller.status(), "Device disconnected");

    let controls = controller.controls();
    assert!(controls.connect);
    assert!(controls.download && controls.clear);
    assert_eq!(controller.session().unwrap().store().log_len(), 2);

    controller.shutdown();
    handle.join().unwrap();
}

#[test]
#[serial]
fn test_idle_device_loss_updates_status() {
    let (frontend, handle) =
        spawn_backend(vec![ramp_array(3).drop_link_idle_after(Duration::from_millis(300))]);
    let mut controller =
        AcquisitionController::new(frontend, settings("100", "300"), TransportKind::Simulated);

    controller.connect();
    assert!(pump_until(&mut controller, |c| c.state().is_connected()));
    assert!(controller.controls().start);

    assert!(pump_until(&mut controller, |c| c.state()
        == AcquisitionState::Disconnected));
    assert_eq!(controller.status(), "Device disconnected");
    assert!(!controller.controls().start);

    controller.shutdown();
    handle.join().unwrap();
}

#[test]
#[serial]
fn test_log_complete_after_ui_stall() {
    let mut config = AppConfig::default();
    config.acquisition.channel_buffer_size = 8;
    let (frontend, handle) = spawn_backend_with(config, vec![ramp_array(2)]);
    let mut controller =
        AcquisitionController::new(frontend, settings("100", "10"), TransportKind::Simulated);

    controller.connect();
    assert!(pump_until(&mut controller, |c| c.state().is_connected()));
    controller.start_polling().unwrap();

    // The UI stops draining, as it does while minimised
    std::thread::sleep(Duration::from_secs(2));
    controller.stop_polling();

    // Let the backlog flush, then ask for final counters
    let flush_until = Instant::now() + Duration::from_secs(1);
    while Instant::now() < flush_until {
        controller.process_messages();
        std::thread::sleep(Duration::from_millis(10));
    }
    controller.request_stats();
    assert!(pump_until(&mut controller, |c| {
        c.stats().successful_reads > 0
            && c.session()
                .is_some_and(|s| s.store().log_len() as u64 == c.stats().successful_reads)
    }));

    let logged = controller.session().unwrap().store().log_len();
    assert!(logged >= 6, "expected the stall to overrun the queue, logged {}", logged);

    controller.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_session_plot_follows_selection() {
    let mut session = Session::new(DeviceInfoBuilder::new("PX").channels(4).build(), 300);
    for i in 0..5 {
        let v = i as f64;
        session.ingest(
            ReadingBuilder::new()
                .values(&[v, 10.0 + v, 20.0 + v, 30.0 + v])
                .build(),
        );
    }

    let frame = session.time_series().unwrap();
    assert_eq!(frame.series.len(), 1);
    assert_float_eq(frame.y_min, 0.0, 1e-9);
    assert_float_eq(frame.y_max, 4.0, 1e-9);

    session.selection_mut().toggle(3);
    let frame = session.time_series().unwrap();
    assert_eq!(frame.series.len(), 2);
    assert_float_eq(frame.y_max, 34.0, 1e-9);
    assert_eq!(frame.series[1].name(), "S3");

    // Deselecting everything falls back to channel 0
    session.selection_mut().toggle(0);
    session.selection_mut().toggle(3);
    let frame = session.time_series().unwrap();
    assert_eq!(frame.series.len(), 1);
    assert_eq!(frame.series[0].channel, 0);
}

#[test]
fn test_export_filename_from_log_span() {
    let mut session = Session::new(
        DeviceInfoBuilder::new("PX 16").id("AA:BB").channels(2).build(),
        300,
    );
    session.ingest(ReadingBuilder::new().at(2024, 3, 5, 9, 7).values(&[1.0, 2.0]).build());
    session.ingest(ReadingBuilder::new().at(2024, 3, 5, 10, 42).values(&[3.0, 4.0]).build());

    let name = session.export_filename(chrono::Utc::now());
    assert_eq!(name, "PX-16_AA-BB_sensor_log_20240305_0907-20240305_1042.csv");

    let csv = export::log_to_csv(session.store().log(), 2);
    assert_eq!(
        csv,
        "timestamp,sensor_0,sensor_1\n\
         2024-03-05T09:07:00.000Z,1,2\n\
         2024-03-05T10:42:00.000Z,3,4"
    );
}
