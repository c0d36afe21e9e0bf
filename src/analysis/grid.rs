//! Paint state of the heat grid
//!
//! The grid keeps one cell per channel. A reading repaints the cells it has
//! values for; cells past the end of a short reading keep whatever they
//! showed before.

use super::heat::{CellStyle, HeatScale};
use super::layout::{best_grid, GridLayout};

/// Label of a cell that has never been painted
pub const EMPTY_CELL_LABEL: &str = "-";

/// One grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub label: String,
    /// `None` until the cell is first painted
    pub style: Option<CellStyle>,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            label: EMPTY_CELL_LABEL.to_string(),
            style: None,
        }
    }
}

/// Heat grid for one session
#[derive(Debug, Clone, Default)]
pub struct GridRenderer {
    layout: GridLayout,
    cells: Vec<GridCell>,
}

impl GridRenderer {
    pub fn new(channel_count: usize) -> Self {
        let mut grid = Self::default();
        grid.initialize(channel_count);
        grid
    }

    /// Rebuild exactly `channel_count` blank cells
    pub fn initialize(&mut self, channel_count: usize) {
        self.layout = best_grid(channel_count);
        self.cells = vec![GridCell::default(); channel_count];
    }

    /// Paint the first `min(values.len(), channel_count)` cells
    pub fn render(&mut self, values: &[f64], heat: &HeatScale) {
        for (cell, &value) in self.cells.iter_mut().zip(values) {
            cell.label = value.to_string();
            cell.style = Some(heat.cell_style(value));
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
