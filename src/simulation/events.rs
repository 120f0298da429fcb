//! Events emitted by an arena tick.
//!
//! The simulation core never renders anything; outer layers (a viewer, a
//! replay log) consume these events together with the snakes' public state.

use serde::{Deserialize, Serialize};

use super::grid::Cell;

/// Why a snake died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// The head left the grid.
    Wall,
    /// The head ran into the snake's own body.
    SelfCollision,
    /// The head ran into another snake.
    OtherSnake,
    /// The stall budget ran out before any food was eaten.
    Stalled,
    /// No free cell was left for the next food.
    BoardFull,
}

/// Something that happened during one arena tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A snake ate the food.
    FoodEaten {
        /// Index of the snake in the arena.
        snake: usize,
        /// Cell the food was on.
        cell: Cell,
    },
    /// Food was placed on a new cell.
    FoodSpawned {
        /// The new food cell.
        cell: Cell,
    },
    /// A snake died.
    Died {
        /// Index of the snake in the arena.
        snake: usize,
        /// What killed it.
        cause: DeathCause,
    },
}
