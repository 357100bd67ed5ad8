//! Board geometry in pixels
//!
//! Cells are square. The grid is centred in the surface with integer
//! padding on both axes.

use serde::{Deserialize, Serialize};

/// Grid position; row 0 is the top row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    #[inline]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.w).max(other.x + other.w);
        let bottom = (self.y + self.h).max(other.y + other.h);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Pixel layout of a `columns x rows` grid inside a `width x height` surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub columns: usize,
    pub rows: usize,
    pub cell_size: u32,
    pub padding_x: u32,
    pub padding_y: u32,
}

impl Layout {
    pub fn new(width_px: u32, height_px: u32, columns: usize, rows: usize) -> Self {
        let columns_px = columns.max(1) as u32;
        let rows_px = rows.max(1) as u32;
        let cell_size = (width_px / columns_px).min(height_px / rows_px);
        Self {
            columns,
            rows,
            cell_size,
            padding_x: width_px.saturating_sub(cell_size * columns_px) / 2,
            padding_y: height_px.saturating_sub(cell_size * rows_px) / 2,
        }
    }

    /// Convert a cell-unit rectangle (fractions allowed) to pixels
    pub fn rect(&self, col: f32, row: f32, width: f32, height: f32) -> Rect {
        let size = self.cell_size as f32;
        Rect::new(
            (self.padding_x as f32 + col * size) as i32,
            (self.padding_y as f32 + row * size) as i32,
            (width * size) as i32,
            (height * size) as i32,
        )
    }

    /// Pixel rectangle of a whole cell
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        self.rect(cell.col as f32, cell.row as f32, 1.0, 1.0)
    }

    /// Cell under a pointer, `None` outside the grid
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Cell> {
        if self.cell_size == 0 {
            return None;
        }
        let size = self.cell_size as f32;
        let col = ((x - self.padding_x as f32) / size).floor();
        let row = ((y - self.padding_y as f32) / size).floor();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.columns && row < self.rows).then_some(Cell::new(col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_size_and_centering() {
        // 10x7 grid in 800x600: min(80, 85) = 80, pad_y = (600 - 560) / 2
        let layout = Layout::new(800, 600, 10, 7);
        assert_eq!(layout.cell_size, 80);
        assert_eq!(layout.padding_x, 0);
        assert_eq!(layout.padding_y, 20);
    }

    #[test]
    fn test_cell_at_maps_pixels() {
        let layout = Layout::new(800, 600, 10, 7);
        assert_eq!(layout.cell_at(0.0, 20.0), Some(Cell::new(0, 0)));
        assert_eq!(layout.cell_at(799.0, 579.0), Some(Cell::new(9, 6)));
        assert_eq!(layout.cell_at(85.0, 105.0), Some(Cell::new(1, 1)));
    }

    #[test]
    fn test_cell_at_outside_grid() {
        let layout = Layout::new(800, 600, 10, 7);
        assert_eq!(layout.cell_at(10.0, 5.0), None); // top padding
        assert_eq!(layout.cell_at(10.0, 590.0), None); // bottom padding
        assert_eq!(layout.cell_at(-1.0, 100.0), None);
        assert_eq!(layout.cell_at(800.0, 100.0), None);
    }

    #[test]
    fn test_cell_at_rejects_non_finite() {
        let layout = Layout::new(800, 600, 10, 7);
        assert_eq!(layout.cell_at(f32::NAN, f32::NAN), None);
        assert_eq!(layout.cell_at(f32::NAN, 100.0), None);
        assert_eq!(layout.cell_at(10.0, f32::INFINITY), None);
    }

    #[test]
    fn test_rect_truncates_fractional_cells() {
        let layout = Layout::new(800, 600, 10, 7);
        assert_eq!(layout.cell_rect(Cell::new(2, 3)), Rect::new(160, 260, 80, 80));
        assert_eq!(layout.rect(0.25, 0.5, 0.5, 0.5), Rect::new(20, 60, 40, 40));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 20, 10, 10);
        assert_eq!(a.union(&b), Rect::new(0, 0, 15, 30));
        assert_eq!(Rect::default().union(&b), b);
    }
}
