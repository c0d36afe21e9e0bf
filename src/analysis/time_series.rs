//! Time-series frame over the rolling window
//!
//! Builds the polylines for the selected channels in data space: x is the
//! sample index within the window, y is the raw value. The frontend hands
//! the result to egui_plot, which takes care of pixel scaling.

use std::collections::VecDeque;

use super::heat::hsl_to_rgb;
use crate::session::ChannelSelection;
use crate::types::Reading;

/// Stroke width when several channels are plotted
pub const MULTI_SERIES_WIDTH: f32 = 2.5;

/// Stroke width when a single channel is plotted
pub const SINGLE_SERIES_WIDTH: f32 = 3.5;

/// Hue span used to spread channel colors
const SERIES_HUE_SPAN: f64 = 300.0;

/// Line color of a channel: hue spread over 0..300 degrees, 80% saturation, 60% lightness
pub fn series_color(channel: usize, channel_count: usize) -> [u8; 4] {
    let hue = channel as f64 / channel_count.max(1) as f64 * SERIES_HUE_SPAN;
    hsl_to_rgb(hue, 0.80, 0.60)
}

/// One polyline
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub channel: usize,
    pub color: [u8; 4],
    pub width: f32,
    /// `[sample index, value]` pairs
    pub points: Vec<[f64; 2]>,
}

impl Series {
    /// Legend name, matching the selector toggle
    pub fn name(&self) -> String {
        format!("S{}", self.channel)
    }
}

/// Everything needed to draw one frame of the plot
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    pub y_min: f64,
    pub y_max: f64,
    /// Number of samples in the window
    pub samples: usize,
    pub series: Vec<Series>,
}

impl TimeSeriesFrame {
    /// Axis caption, e.g. `y: 12 - 987`
    pub fn label(&self) -> String {
        format!("y: {:.0} - {:.0}", self.y_min, self.y_max)
    }

    /// X range shown by the plot
    pub fn x_range(&self) -> (f64, f64) {
        (0.0, self.samples.saturating_sub(1).max(1) as f64)
    }
}

/// Build the frame for the current window and selection.
///
/// Returns `None` for an empty window. Y bounds cover the finite values of
/// the plotted channels; with no such values they are `[0, 1]`, and a flat
/// signal is widened to `[min, min + 1]`. A reading too short to carry a
/// plotted channel contributes a point at the lower bound.
pub fn render(
    window: &VecDeque<Reading>,
    selection: &ChannelSelection,
    channel_count: usize,
) -> Option<TimeSeriesFrame> {
    if window.is_empty() {
        return None;
    }
    let channels = selection.plotted(channel_count);

    let (mut y_min, mut y_max) = window
        .iter()
        .flat_map(|reading| channels.iter().filter_map(|&ch| reading.value(ch)))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_min == y_max {
        y_max = y_min + 1.0;
    }

    let width = if channels.len() > 1 {
        MULTI_SERIES_WIDTH
    } else {
        SINGLE_SERIES_WIDTH
    };

    let series = channels
        .iter()
        .map(|&channel| Series {
            channel,
            color: series_color(channel, channel_count),
            width,
            points: window
                .iter()
                .enumerate()
                .map(|(i, reading)| {
                    let y = reading
                        .value(channel)
                        .filter(|v| v.is_finite())
                        .unwrap_or(y_min);
                    [i as f64, y]
                })
                .collect(),
        })
        .collect();

    Some(TimeSeriesFrame {
        y_min,
        y_max,
        samples: window.len(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(rows: &[&[f64]]) -> VecDeque<Reading> {
        rows.iter().map(|r| Reading::new(r.to_vec())).collect()
    }

    #[test]
    fn test_empty_window_draws_nothing() {
        assert!(render(&VecDeque::new(), &ChannelSelection::new(), 4).is_none());
    }

    #[test]
    fn test_bounds_from_selected_channels() {
        let w = window(&[&[10.0, 500.0], &[30.0, 900.0], &[20.0, 100.0]]);
        let frame = render(&w, &ChannelSelection::new(), 2).unwrap();
        assert_eq!((frame.y_min, frame.y_max), (10.0, 30.0));
        assert_eq!(frame.series.len(), 1);
        assert_eq!(frame.series[0].width, SINGLE_SERIES_WIDTH);
        assert_eq!(
            frame.series[0].points,
            vec![[0.0, 10.0], [1.0, 30.0], [2.0, 20.0]]
        );
        assert_eq!(frame.label(), "y: 10 - 30");
        assert_eq!(frame.x_range(), (0.0, 2.0));
    }

    #[test]
    fn test_flat_signal_widened() {
        let w = window(&[&[5.0], &[5.0]]);
        let frame = render(&w, &ChannelSelection::new(), 1).unwrap();
        assert_eq!((frame.y_min, frame.y_max), (5.0, 6.0));
    }

    #[test]
    fn test_no_values_defaults_to_unit_range() {
        let w = window(&[&[], &[]]);
        let frame = render(&w, &ChannelSelection::new(), 4).unwrap();
        assert_eq!((frame.y_min, frame.y_max), (0.0, 1.0));
        assert_eq!(frame.series[0].points, vec![[0.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_missing_values_plot_at_lower_bound() {
        let w = window(&[&[1.0, 40.0], &[2.0], &[3.0, 60.0]]);
        let mut selection = ChannelSelection::new();
        selection.set(1, true);
        let frame = render(&w, &selection, 2).unwrap();
        assert_eq!((frame.y_min, frame.y_max), (1.0, 60.0));
        assert_eq!(frame.series.len(), 2);
        assert!(frame.series.iter().all(|s| s.width == MULTI_SERIES_WIDTH));
        assert_eq!(frame.series[1].points[1], [1.0, 1.0]);
    }

    #[test]
    fn test_single_sample_x_range() {
        let w = window(&[&[1.0]]);
        let frame = render(&w, &ChannelSelection::new(), 1).unwrap();
        assert_eq!(frame.x_range(), (0.0, 1.0));
    }

    #[test]
    fn test_series_colors() {
        assert_eq!(series_color(0, 16), hsl_to_rgb(0.0, 0.8, 0.6));
        assert_eq!(series_color(8, 16), hsl_to_rgb(150.0, 0.8, 0.6));
        assert_eq!(series_color(0, 0), hsl_to_rgb(0.0, 0.8, 0.6));
        assert_ne!(series_color(1, 16), series_color(2, 16));
    }
}
