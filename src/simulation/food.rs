//! The food cell.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};

/// The single food item on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    /// Cell the food sits on.
    pub cell: Cell,
}

impl Food {
    /// Places food on a uniformly random cell that is not in `occupied`.
    ///
    /// Returns `None` when every cell of the grid is occupied.
    pub fn spawn<R: Rng + ?Sized>(
        grid: &Grid,
        occupied: &HashSet<Cell>,
        rng: &mut R,
    ) -> Option<Self> {
        let free = grid.cell_count().saturating_sub(
            occupied.iter().filter(|&&cell| grid.contains(cell)).count(),
        );
        if free == 0 {
            return None;
        }
        loop {
            let cell = grid.cell_at(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
            if !occupied.contains(&cell) {
                return Some(Self { cell });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let grid = Grid::new(60, 40, 20);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let occupied: HashSet<Cell> = [
            Cell::new(0, 0),
            Cell::new(20, 0),
            Cell::new(40, 0),
            Cell::new(0, 20),
            Cell::new(20, 20),
        ]
        .into_iter()
        .collect();
        for _ in 0..50 {
            let food = Food::spawn(&grid, &occupied, &mut rng).unwrap();
            assert_eq!(food.cell, Cell::new(40, 20));
        }
    }

    #[test]
    fn test_spawn_on_full_board() {
        let grid = Grid::new(40, 20, 20);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let occupied: HashSet<Cell> = [Cell::new(0, 0), Cell::new(20, 0)].into_iter().collect();
        assert!(Food::spawn(&grid, &occupied, &mut rng).is_none());
    }
}
