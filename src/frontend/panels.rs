//! Panel components for the frontend UI
//!
//! Each panel renders one block of the side bar and reports what the
//! operator did as [`AppAction`]s.
//!
//! # Panels
//!
//! - [`ControlPanel`] - Transport choice, connection and polling buttons, text inputs
//! - [`ChannelSelectorPanel`] - One toggle per channel, laid out like the grid
//! - [`DeviceInfoPanel`] - Identity and log sizes of the current session
//! - [`StatsPanel`] - Backend collection statistics

use egui::{Color32, RichText, Ui};

use super::state::AppAction;
use crate::acquisition::ControlState;
use crate::config::settings::RuntimeSettings;
use crate::config::TransportKind;
use crate::session::Session;
use crate::types::CollectionStats;

/// Connection, polling and log controls
pub struct ControlPanel;

impl ControlPanel {
    pub fn render(
        ui: &mut Ui,
        controls: ControlState,
        transport: TransportKind,
        settings: &mut RuntimeSettings,
        actions: &mut Vec<AppAction>,
    ) {
        ui.heading("Device");

        ui.horizontal(|ui| {
            ui.label("Transport:");
            let mut selected = transport;
            ui.add_enabled_ui(controls.connect, |ui| {
                egui::ComboBox::from_id_salt("transport_combo")
                    .selected_text(selected.to_string())
                    .show_ui(ui, |ui| {
                        for kind in TransportKind::available() {
                            ui.selectable_value(&mut selected, *kind, kind.to_string());
                        }
                    });
            });
            if selected != transport {
                actions.push(AppAction::SetTransport(selected));
            }
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(controls.connect, egui::Button::new("🔌 Connect"))
                .clicked()
            {
                actions.push(AppAction::Connect);
            }
            if ui
                .add_enabled(controls.disconnect, egui::Button::new("Disconnect"))
                .clicked()
            {
                actions.push(AppAction::Disconnect);
            }
        });

        ui.separator();
        ui.heading("Polling");

        ui.horizontal(|ui| {
            ui.label("Interval (ms):");
            ui.add(
                egui::TextEdit::singleline(&mut settings.poll_interval_text)
                    .desired_width(70.0)
                    .hint_text("1000"),
            );
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(controls.start, egui::Button::new("▶ Start"))
                .clicked()
            {
                actions.push(AppAction::StartPolling);
            }
            if ui
                .add_enabled(controls.stop, egui::Button::new("⏹ Stop"))
                .clicked()
            {
                actions.push(AppAction::StopPolling);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Window (samples):");
            let response = ui.add(
                egui::TextEdit::singleline(&mut settings.window_size_text).desired_width(70.0),
            );
            if response.lost_focus() {
                actions.push(AppAction::CommitWindowSize);
            }
        });

        ui.separator();
        ui.heading("Log");

        ui.horizontal(|ui| {
            if ui
                .add_enabled(controls.download, egui::Button::new("💾 Download CSV"))
                .clicked()
            {
                actions.push(AppAction::DownloadCsv);
            }
            if ui
                .add_enabled(controls.clear, egui::Button::new("🗑 Clear"))
                .clicked()
            {
                actions.push(AppAction::ClearLog);
            }
        });
    }
}

/// Plot channel selection, one toggle per channel
pub struct ChannelSelectorPanel;

impl ChannelSelectorPanel {
    pub fn render(ui: &mut Ui, session: Option<&Session>, actions: &mut Vec<AppAction>) {
        ui.heading("Channels");

        let Some(session) = session else {
            ui.colored_label(Color32::GRAY, "Connect to choose channels");
            return;
        };

        let cols = session.grid().layout().cols.max(1);
        let selection = session.selection();

        egui::Grid::new("channel_selector")
            .num_columns(cols)
            .spacing([6.0, 4.0])
            .show(ui, |ui| {
                for channel in 0..session.channel_count() {
                    let mut checked = selection.is_selected(channel);
                    if ui.checkbox(&mut checked, format!("S{}", channel)).changed() {
                        actions.push(AppAction::ToggleChannel(channel));
                    }
                    if (channel + 1) % cols == 0 {
                        ui.end_row();
                    }
                }
            });
    }
}

/// Identity of the connected device and log sizes
pub struct DeviceInfoPanel;

impl DeviceInfoPanel {
    pub fn render(ui: &mut Ui, session: Option<&Session>, last_device: Option<&str>) {
        let Some(session) = session else {
            ui.colored_label(Color32::GRAY, "No device");
            if let Some(name) = last_device {
                ui.label(RichText::new(format!("Last used: {}", name)).small());
            }
            return;
        };

        let device = session.device();
        egui::Grid::new("device_info").num_columns(2).show(ui, |ui| {
            ui.label("Name:");
            ui.label(device.identity.display_name());
            ui.end_row();

            ui.label("Id:");
            ui.label(RichText::new(&device.identity.id).monospace());
            ui.end_row();

            ui.label("Channels:");
            ui.label(device.channel_count.to_string());
            ui.end_row();

            let store = session.store();
            ui.label("Logged:");
            ui.label(store.log_len().to_string());
            ui.end_row();

            ui.label("Window:");
            ui.label(format!("{} / {}", store.window_len(), store.window_size()));
            ui.end_row();

            if let Some(latest) = store.latest() {
                ui.label("Last sample:");
                ui.label(
                    latest
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%H:%M:%S%.3f")
                        .to_string(),
                );
                ui.end_row();
            }
        });
    }
}

/// Renders the statistics panel
pub struct StatsPanel;

impl StatsPanel {
    pub fn render(ui: &mut Ui, stats: &CollectionStats) {
        egui::Grid::new("collection_stats").num_columns(2).show(ui, |ui| {
            ui.label("Reads:");
            ui.label(RichText::new(stats.successful_reads.to_string()).monospace());
            ui.end_row();

            let error_color = if stats.failed_reads > 0 {
                Color32::LIGHT_RED
            } else {
                Color32::GRAY
            };
            ui.label("Errors:");
            ui.colored_label(error_color, stats.failed_reads.to_string());
            ui.end_row();

            let success_rate = stats.success_rate();
            let rate_color = if success_rate >= 99.0 {
                Color32::GREEN
            } else if success_rate >= 95.0 {
                Color32::YELLOW
            } else {
                Color32::RED
            };
            ui.label("Success:");
            ui.colored_label(rate_color, format!("{:.1}%", success_rate));
            ui.end_row();

            ui.label("Avg read:");
            ui.label(format!("{:.1} μs", stats.avg_read_time_us));
            ui.end_row();

            ui.label("Jitter:");
            ui.label(format!("{} μs", stats.read_jitter_us));
            ui.end_row();

            if stats.dropped_messages > 0 {
                ui.label("Dropped:");
                ui.colored_label(Color32::YELLOW, stats.dropped_messages.to_string());
                ui.end_row();
            }
        });
    }
}
