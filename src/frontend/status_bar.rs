//! Status bar panel, the bottom bar with the status line and read stats.

use egui::{Color32, RichText, Ui};

use super::widgets::StatusIndicator;
use crate::types::{AcquisitionState, CollectionStats, ConnectionStatus};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub state: AcquisitionState,
    pub connection_status: ConnectionStatus,
    pub status: &'a str,
    pub stats: &'a CollectionStats,
    pub last_error: Option<&'a str>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add(
            StatusIndicator::for_state(ctx.state, ctx.connection_status)
                .with_tooltip(format!("Transport: {}", ctx.connection_status)),
        );

        ui.separator();

        ui.label(RichText::new(ctx.status).small());

        ui.separator();

        let stats = ctx.stats;
        ui.label(RichText::new(format!("Samples: {}", stats.successful_reads)).small());

        ui.separator();

        let error_color = if stats.failed_reads > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            error_color,
            RichText::new(format!("Errors: {}", stats.failed_reads)).small(),
        );

        ui.separator();

        let kb = stats.total_bytes_read as f64 / 1024.0;
        ui.label(RichText::new(format!("Data: {:.1} KB", kb)).small());

        if let Some(err) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(err).small());
            });
        }
    });
}
