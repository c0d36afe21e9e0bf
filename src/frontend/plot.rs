//! Time-series plot over the rolling window
//!
//! Thin egui_plot wrapper around [`TimeSeriesFrame`]. Bounds are pinned to
//! the frame every repaint, so the plot always shows the whole window and
//! the selected channels' value range.

use egui::Ui;
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoints};

use super::widgets::to_color32;
use crate::analysis::TimeSeriesFrame;

/// Plot display options
#[derive(Debug, Clone)]
pub struct TimeSeriesPlot {
    pub height: f32,
    pub show_legend: bool,
    pub show_grid: bool,
}

impl Default for TimeSeriesPlot {
    fn default() -> Self {
        Self {
            height: 260.0,
            show_legend: true,
            show_grid: true,
        }
    }
}

impl TimeSeriesPlot {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    /// Render one frame; `None` draws an empty plot
    pub fn render(&self, ui: &mut Ui, frame: Option<&TimeSeriesFrame>) {
        let mut plot = Plot::new("time_series_plot")
            .height(self.height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_axes(true)
            .show_grid(self.show_grid)
            .x_axis_label("Sample")
            .y_axis_label("Value");

        if self.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }

        plot.show(ui, |plot_ui| {
            let Some(frame) = frame else {
                return;
            };

            let (x_min, x_max) = frame.x_range();
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [x_min, frame.y_min],
                [x_max, frame.y_max],
            ));

            for series in &frame.series {
                let line = Line::new(series.name(), PlotPoints::from(series.points.clone()))
                    .color(to_color32(series.color))
                    .width(series.width);
                plot_ui.line(line);
            }
        });

        if let Some(frame) = frame {
            ui.label(egui::RichText::new(frame.label()).small().weak());
        }
    }
}
