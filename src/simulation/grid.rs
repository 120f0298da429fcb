//! Grid geometry shared by the snakes and the food.
//!
//! Cells are addressed by the pixel coordinate of their top-left corner, so a
//! 600×400 grid with 20px cells spans `x ∈ {0, 20, ..., 580}` and
//! `y ∈ {0, 20, ..., 380}`.

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A grid cell, addressed by the pixel coordinate of its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate (grows downwards).
    pub y: i32,
}

impl Cell {
    /// Creates a cell at the given pixel coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring cell one step of `cell_size` along `direction`.
    pub fn step(self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.vector();
        Self {
            x: self.x + dx * cell_size,
            y: self.y + dy * cell_size,
        }
    }
}

/// Rectangular playing field `[0, width) × [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Field width in pixels.
    pub width: i32,
    /// Field height in pixels.
    pub height: i32,
    /// Edge length of one cell in pixels.
    pub cell_size: i32,
}

impl Grid {
    /// Creates a grid; extents are expected to be multiples of `cell_size`.
    pub const fn new(width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            width,
            height,
            cell_size,
        }
    }

    /// Number of cell columns.
    pub fn cols(&self) -> i32 {
        self.width / self.cell_size
    }

    /// Number of cell rows.
    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cols().max(0) as usize * self.rows().max(0) as usize
    }

    /// Whether `cell` lies inside the field.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Cell at column `col` and row `row`.
    pub fn cell_at(&self, col: i32, row: i32) -> Cell {
        Cell::new(col * self.cell_size, row * self.cell_size)
    }

    /// Cell nearest to the fractional position `(fx · width, fy · height)`,
    /// snapped down to the cell lattice.
    pub fn cell_at_fraction(&self, fx: f32, fy: f32) -> Cell {
        let col = ((self.cols() as f32 * fx) as i32).clamp(0, self.cols() - 1);
        let row = ((self.rows() as f32 * fy) as i32).clamp(0, self.rows() - 1);
        self.cell_at(col, row)
    }

    /// The center cell.
    pub fn center(&self) -> Cell {
        self.cell_at(self.cols() / 2, self.rows() / 2)
    }
}
