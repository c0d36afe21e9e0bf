//! Heat grid painting
//!
//! Lays the session's [`GridRenderer`] cells out row-major over
//! `layout.cols` columns, scaling the cells to fill the available width.

use egui::{Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};

use super::widgets::to_color32;
use crate::analysis::GridRenderer;

/// Gap between cells in points
const CELL_GAP: f32 = 4.0;

/// Background of a cell that has not been painted yet
const BLANK_CELL: Color32 = Color32::from_gray(40);

/// Paint the grid; `min_cell_size` bounds how small a cell may get
pub fn show_grid(ui: &mut Ui, grid: &GridRenderer, min_cell_size: f32) {
    let layout = grid.layout();
    if grid.is_empty() || layout.cols == 0 {
        ui.weak("No channels");
        return;
    }

    let cols = layout.cols as f32;
    let rows = layout.rows as f32;
    let available = ui.available_width();
    let cell = ((available - CELL_GAP * (cols - 1.0)) / cols).max(min_cell_size);
    let size = Vec2::new(
        cols * cell + (cols - 1.0) * CELL_GAP,
        rows * cell + (rows - 1.0) * CELL_GAP,
    );

    let (rect, _response) = ui.allocate_exact_size(size, Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }

    let painter = ui.painter_at(rect);
    let font = FontId::proportional((cell * 0.3).clamp(9.0, 22.0));
    let outline = Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color);

    for (index, grid_cell) in grid.cells().iter().enumerate() {
        let Some((row, col)) = layout.position(index) else {
            break;
        };
        let min = rect.min
            + Vec2::new(
                col as f32 * (cell + CELL_GAP),
                row as f32 * (cell + CELL_GAP),
            );
        let cell_rect = Rect::from_min_size(min, Vec2::splat(cell));

        let (fill, text) = match grid_cell.style {
            Some(style) => (to_color32(style.background), to_color32(style.text)),
            None => (BLANK_CELL, Color32::LIGHT_GRAY),
        };

        painter.rect(cell_rect, 4.0, fill, outline, StrokeKind::Inside);
        painter.text(
            cell_rect.center(),
            Align2::CENTER_CENTER,
            &grid_cell.label,
            font.clone(),
            text,
        );
    }
}
