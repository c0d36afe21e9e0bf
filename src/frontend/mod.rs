//! Frontend module for egui UI
//!
//! This module provides the dashboard using eframe/egui. All device work
//! happens on the backend thread; the frontend drains its messages through
//! the [`AcquisitionController`] once per frame and paints the session.
//!
//! # Layout
//!
//! - Top bar: title, status indicator, theme toggle
//! - Left side panel: controls, channel selector, device info, stats
//! - Central panel: heat grid above the time-series plot
//! - Bottom bar: status line and read counters
//!
//! # Main Types
//!
//! - [`SensorViewApp`] - Main application state implementing [`eframe::App`]
//! - [`AppAction`] - Operator intents emitted by panels
//!
//! # Submodules
//!
//! - `panels` - Side panel components
//! - `grid_view` - Heat grid painter
//! - `plot` - Time-series rendering with egui_plot
//! - `status_bar` - Bottom status bar
//! - `widgets` - Custom UI widgets

mod grid_view;
mod panels;
mod plot;
pub mod state;
mod status_bar;
pub mod widgets;

pub use panels::*;
pub use plot::TimeSeriesPlot;
pub use state::AppAction;
pub use widgets::*;

use std::time::{Duration, Instant};

use egui::{Color32, RichText};

use crate::acquisition::AcquisitionController;
use crate::backend::FrontendReceiver;
use crate::config::settings::RuntimeSettings;
use crate::config::{AppConfig, AppState};
use crate::session::export::CSV_EXTENSION;
use status_bar::{render_status_bar, StatusBarContext};

/// How often backend statistics are requested while connected
const STATS_REFRESH: Duration = Duration::from_millis(500);

/// Repaint cadence while idle, so status changes from the backend show up
const IDLE_REPAINT: Duration = Duration::from_millis(100);

/// Main application state
pub struct SensorViewApp {
    controller: AcquisitionController,
    config: AppConfig,
    app_state: AppState,
    plot: TimeSeriesPlot,
    last_stats_request: Instant,
}

impl SensorViewApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        let settings = RuntimeSettings::from_config(&config);
        let controller = AcquisitionController::new(frontend, settings, config.device.transport);
        let plot = TimeSeriesPlot::new(config.ui.plot_height);

        Self {
            controller,
            config,
            app_state,
            plot,
            last_stats_request: Instant::now(),
        }
    }

    /// Apply one operator action
    fn handle_action(&mut self, ctx: &egui::Context, action: AppAction) {
        match action {
            AppAction::SetTransport(kind) => {
                self.controller.set_transport(kind);
            }
            AppAction::Connect => self.controller.connect(),
            AppAction::Disconnect => self.controller.disconnect(),
            AppAction::StartPolling => {
                if let Err(e) = self.controller.start_polling() {
                    tracing::warn!("Cannot start polling: {}", e);
                }
            }
            AppAction::StopPolling => self.controller.stop_polling(),
            AppAction::DownloadCsv => self.download_csv(),
            AppAction::ClearLog => self.controller.clear_log(),
            AppAction::CommitWindowSize => {
                if let Some(size) = self.controller.commit_window_size() {
                    tracing::debug!("Window size set to {}", size);
                }
            }
            AppAction::ToggleChannel(channel) => self.controller.toggle_channel(channel),
            AppAction::SetDarkMode(dark) => {
                self.app_state.ui_preferences.dark_mode = dark;
                ctx.set_visuals(if dark {
                    egui::Visuals::dark()
                } else {
                    egui::Visuals::light()
                });
            }
        }
    }

    /// Ask for a destination and write the full log there
    fn download_csv(&mut self) {
        let Some(filename) = self.controller.suggested_filename() else {
            return;
        };

        let mut dialog = rfd::FileDialog::new()
            .set_file_name(&filename)
            .add_filter("CSV", &[CSV_EXTENSION]);
        if let Some(dir) = &self.app_state.last_export_dir {
            dialog = dialog.set_directory(dir);
        }

        let Some(path) = dialog.save_file() else {
            return;
        };

        match self.controller.export_to(&path) {
            Ok(()) => self.app_state.record_export(&path),
            Err(e) => tracing::error!("CSV export failed: {}", e),
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        ui.horizontal(|ui| {
            ui.heading("Sensor View");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let dark = self.app_state.ui_preferences.dark_mode;
                let label = if dark { "☀" } else { "🌙" };
                if ui
                    .button(label)
                    .on_hover_text("Toggle dark mode")
                    .clicked()
                {
                    actions.push(AppAction::SetDarkMode(!dark));
                }

                if let Some(session) = self.controller.session() {
                    ui.label(
                        RichText::new(session.device().identity.display_name())
                            .color(Color32::LIGHT_BLUE),
                    );
                }
            });
        });
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            let controls = self.controller.controls();
            let transport = self.controller.transport();
            ControlPanel::render(
                ui,
                controls,
                transport,
                self.controller.settings_mut(),
                actions,
            );

            ui.separator();
            ChannelSelectorPanel::render(ui, self.controller.session(), actions);

            ui.separator();
            egui::CollapsingHeader::new("Device info")
                .default_open(true)
                .show(ui, |ui| {
                    DeviceInfoPanel::render(
                        ui,
                        self.controller.session(),
                        self.app_state.last_device_name.as_deref(),
                    );
                });

            egui::CollapsingHeader::new("Statistics")
                .default_open(false)
                .show(ui, |ui| {
                    StatsPanel::render(ui, self.controller.stats());
                });
        });
    }

    fn render_central(&self, ui: &mut egui::Ui) {
        let Some(session) = self.controller.session() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Connect a device to start").color(Color32::GRAY));
            });
            return;
        };

        let heat = session.heat();
        let bounds = heat.min().zip(heat.max());
        ui.add(HeatLegend::new(bounds).width(200.0));
        ui.add_space(4.0);

        let plot_space = self.plot.height + 40.0;
        let grid_height = (ui.available_height() - plot_space).max(self.config.ui.min_cell_size);
        egui::ScrollArea::vertical()
            .id_salt("grid_scroll")
            .max_height(grid_height)
            .show(ui, |ui| {
                grid_view::show_grid(ui, session.grid(), self.config.ui.min_cell_size);
            });

        ui.separator();
        let frame = session.time_series();
        self.plot.render(ui, frame.as_ref());
    }
}

impl eframe::App for SensorViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_messages = self.controller.process_messages();

        let connected = self.controller.state().is_connected();
        if connected && self.last_stats_request.elapsed() >= STATS_REFRESH {
            self.controller.request_stats();
            self.last_stats_request = Instant::now();
        }

        if had_messages {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.render_top_bar(ui, &mut actions);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    state: self.controller.state(),
                    connection_status: self.controller.connection_status(),
                    status: self.controller.status(),
                    stats: self.controller.stats(),
                    last_error: self.controller.last_error(),
                },
            );
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(self.config.ui.side_panel_width)
            .show(ctx, |ui| {
                self.render_side_panel(ui, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_central(ui);
        });

        for action in actions {
            self.handle_action(ctx, action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();

        if let Some(session) = self.controller.session() {
            self.app_state
                .remember_device(session.device().identity.display_name());
        }

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}
