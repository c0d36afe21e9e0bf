//! Analysis module for turning readings into pictures
//!
//! This module provides the headless half of the dashboard:
//! - Heat scale and cell palette
//! - Near-square grid layout
//! - Grid paint state
//! - Time-series frame building
//!
//! Nothing here depends on egui; the frontend paints the plain types.

pub mod grid;
pub mod heat;
pub mod layout;
pub mod time_series;

pub use grid::{GridCell, GridRenderer, EMPTY_CELL_LABEL};
pub use heat::{hsl_to_rgb, CellStyle, HeatScale};
pub use layout::{best_grid, GridLayout};
pub use time_series::{series_color, Series, TimeSeriesFrame};
