//! Custom widgets for the Sensor View UI
//!
//! # Widgets
//!
//! - [`StatusIndicator`] - Colored status dot with label
//! - [`HeatLegend`] - Gradient strip showing the current heat-scale bounds

use egui::{Color32, Response, RichText, Sense, Ui, Vec2, Widget};

use crate::analysis::heat::{hsl_to_rgb, HEAT_HUE, HEAT_LIGHTNESS_MAX, HEAT_LIGHTNESS_MIN, HEAT_SATURATION};
use crate::types::{AcquisitionState, ConnectionStatus};

/// Convert an `[r, g, b, a]` palette entry to an egui color
pub fn to_color32(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// A widget that displays a colored status indicator
pub struct StatusIndicator {
    color: Color32,
    label: String,
    tooltip: Option<String>,
}

impl StatusIndicator {
    pub fn new(color: Color32, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
            tooltip: None,
        }
    }

    pub fn connected() -> Self {
        Self::new(Color32::GREEN, "Connected")
    }

    pub fn polling() -> Self {
        Self::new(Color32::from_rgb(100, 200, 255), "Polling")
    }

    pub fn disconnected() -> Self {
        Self::new(Color32::GRAY, "Disconnected")
    }

    pub fn error() -> Self {
        Self::new(Color32::RED, "Error")
    }

    pub fn connecting() -> Self {
        Self::new(Color32::YELLOW, "Connecting...")
    }

    /// Indicator for the acquisition state, falling back to the transport
    /// status when the backend reported an error
    pub fn for_state(state: AcquisitionState, status: ConnectionStatus) -> Self {
        if status == ConnectionStatus::Error {
            return Self::error();
        }
        match state {
            AcquisitionState::Disconnected => Self::disconnected(),
            AcquisitionState::Connecting => Self::connecting(),
            AcquisitionState::ConnectedIdle => Self::connected(),
            AcquisitionState::ConnectedPolling => Self::polling(),
        }
    }

    /// Add a tooltip to the indicator
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

impl Widget for StatusIndicator {
    fn ui(self, ui: &mut Ui) -> Response {
        let response = ui.horizontal(|ui| {
            ui.colored_label(self.color, "●");
            ui.label(&self.label);
        });

        let response = response.response;

        if let Some(tooltip) = self.tooltip {
            response.on_hover_text(tooltip)
        } else {
            response
        }
    }
}

/// Horizontal gradient from the darkest to the lightest heat color,
/// captioned with the observed bounds
pub struct HeatLegend {
    bounds: Option<(f64, f64)>,
    width: f32,
}

impl HeatLegend {
    pub fn new(bounds: Option<(f64, f64)>) -> Self {
        Self {
            bounds,
            width: 160.0,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

impl Widget for HeatLegend {
    fn ui(self, ui: &mut Ui) -> Response {
        ui.horizontal(|ui| {
            let (low, high) = match self.bounds {
                Some((min, max)) => (format!("{}", min), format!("{}", max)),
                None => ("-".to_string(), "-".to_string()),
            };
            ui.label(RichText::new(low).small());

            let (rect, response) = ui.allocate_exact_size(Vec2::new(self.width, 12.0), Sense::hover());
            if ui.is_rect_visible(rect) {
                const STEPS: usize = 32;
                let painter = ui.painter();
                let step_width = rect.width() / STEPS as f32;
                for i in 0..STEPS {
                    let t = i as f64 / (STEPS - 1) as f64;
                    let lightness = HEAT_LIGHTNESS_MIN + t * (HEAT_LIGHTNESS_MAX - HEAT_LIGHTNESS_MIN);
                    let color = to_color32(hsl_to_rgb(HEAT_HUE, HEAT_SATURATION, lightness / 100.0));
                    let x = rect.left() + i as f32 * step_width;
                    let step = egui::Rect::from_min_max(
                        egui::pos2(x, rect.top()),
                        egui::pos2(x + step_width + 0.5, rect.bottom()),
                    );
                    painter.rect_filled(step, 0.0, color);
                }
            }

            ui.label(RichText::new(high).small());
            response
        })
        .inner
    }
}
