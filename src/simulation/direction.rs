//! Headings, relative turns and the rotation table that links them.

use serde::{Deserialize, Serialize};

/// One of the four cardinal headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards smaller `y`.
    Up,
    /// Towards larger `y`.
    Down,
    /// Towards smaller `x`.
    Left,
    /// Towards larger `x`.
    Right,
}

impl Direction {
    /// All headings, in one-hot sensor order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector in grid coordinates.
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The exact reverse heading.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A decision relative to the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// Keep the current heading.
    Straight,
    /// Rotate 90° counter-clockwise (on screen).
    Left,
    /// Rotate 90° clockwise (on screen).
    Right,
}

impl Turn {
    /// Maps a network output index to a turn: 0 straight, 1 left, 2 right.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Turn::Straight),
            1 => Some(Turn::Left),
            2 => Some(Turn::Right),
            _ => None,
        }
    }
}

/// The headings reached from one heading by each relative turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relative {
    /// Straight on.
    pub ahead: Direction,
    /// After turning left.
    pub left: Direction,
    /// After turning right.
    pub right: Direction,
}

/// Immutable lookup from a heading to its relative directions.
///
/// Both the danger sensors and the turn decisions read from this table, so it
/// is the only place where "left of" and "right of" are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationTable {
    up: Relative,
    down: Relative,
    left: Relative,
    right: Relative,
}

impl Default for RotationTable {
    fn default() -> Self {
        Self {
            up: Relative {
                ahead: Direction::Up,
                left: Direction::Left,
                right: Direction::Right,
            },
            down: Relative {
                ahead: Direction::Down,
                left: Direction::Right,
                right: Direction::Left,
            },
            left: Relative {
                ahead: Direction::Left,
                left: Direction::Down,
                right: Direction::Up,
            },
            right: Relative {
                ahead: Direction::Right,
                left: Direction::Up,
                right: Direction::Down,
            },
        }
    }
}

impl RotationTable {
    /// Relative directions for `heading`.
    pub fn relative(&self, heading: Direction) -> Relative {
        match heading {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Heading that results from applying `turn` to `heading`.
    pub fn apply(&self, heading: Direction, turn: Turn) -> Direction {
        let relative = self.relative(heading);
        match turn {
            Turn::Straight => relative.ahead,
            Turn::Left => relative.left,
            Turn::Right => relative.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_never_reverse() {
        let table = RotationTable::default();
        for heading in Direction::ALL {
            for turn in [Turn::Straight, Turn::Left, Turn::Right] {
                assert_ne!(table.apply(heading, turn), heading.opposite());
            }
        }
    }

    #[test]
    fn test_four_left_turns_come_back() {
        let table = RotationTable::default();
        for heading in Direction::ALL {
            let mut current = heading;
            for _ in 0..4 {
                current = table.apply(current, Turn::Left);
            }
            assert_eq!(current, heading);
            assert_eq!(
                table.apply(table.apply(heading, Turn::Left), Turn::Right),
                heading
            );
        }
    }

    #[test]
    fn test_right_of_right_is_down() {
        let table = RotationTable::default();
        assert_eq!(table.apply(Direction::Right, Turn::Right), Direction::Down);
        assert_eq!(table.apply(Direction::Right, Turn::Left), Direction::Up);
        assert_eq!(table.apply(Direction::Up, Turn::Left), Direction::Left);
    }

    #[test]
    fn test_turn_from_index() {
        assert_eq!(Turn::from_index(0), Some(Turn::Straight));
        assert_eq!(Turn::from_index(1), Some(Turn::Left));
        assert_eq!(Turn::from_index(2), Some(Turn::Right));
        assert_eq!(Turn::from_index(3), None);
    }
}
