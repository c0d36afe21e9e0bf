//! Sensor View - Main Entry Point
//!
//! Live heat-grid and time-series dashboard for BLE sensor arrays.

use anyhow::Context;
use sensorview_rs::{
    backend::SensorBackend,
    config::{ensure_app_data_dir, AppConfig, AppState},
    frontend::SensorViewApp,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Console logging always, plus a daily file when the data dir is usable
    let file_appender = ensure_app_data_dir()
        .map(|dir| tracing_appender::rolling::daily(dir.join("logs"), "sensorview.log"))
        .ok();
    let (file_layer, _log_guard) = match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sensorview_rs=debug")),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Starting Sensor View");

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();

    let (backend, frontend) = SensorBackend::new(config.clone());
    let stop = backend.stop_handle();
    let backend_handle = backend.spawn().context("Failed to start backend thread")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Sensor View"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Sensor View",
        native_options,
        Box::new(|cc| {
            if app_state.ui_preferences.dark_mode {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }

            Ok(Box::new(SensorViewApp::new(cc, frontend, config, app_state)))
        }),
    );

    tracing::info!("Shutting down...");
    stop.store(false, std::sync::atomic::Ordering::SeqCst);
    if backend_handle.join().is_err() {
        tracing::error!("Backend thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
