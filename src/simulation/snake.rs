//! The snake agent: body, heading, growth and death.
//!
//! A snake is alive until a collision check or a forced termination kills it;
//! after that every mutating call is a no-op, so its fitness is frozen.

use std::collections::VecDeque;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::direction::{Direction, RotationTable, Turn};
use super::events::DeathCause;
use super::grid::{Cell, Grid};

/// Length of the sensor vector produced by [`Snake::sensors`].
pub const SENSOR_COUNT: usize = 11;

/// A snake on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    body: VecDeque<Cell>,
    heading: Direction,
    growing: bool,
    score: u32,
    lifespan: u32,
    death: Option<DeathCause>,
}

impl Snake {
    /// Creates a one-cell snake at `start` facing `heading`.
    pub fn new(start: Cell, heading: Direction) -> Self {
        Self {
            body: VecDeque::from([start]),
            heading,
            growing: false,
            score: 0,
            lifespan: 0,
            death: None,
        }
    }

    /// Head cell.
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Occupied cells, head first.
    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// A snake always occupies at least its head.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Current heading.
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Foods eaten.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Moves survived.
    pub fn lifespan(&self) -> u32 {
        self.lifespan
    }

    /// Whether the snake is still alive.
    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// What killed the snake, if it is dead.
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death
    }

    /// Sets a new heading unless it is the exact reverse of the current one.
    ///
    /// Returns whether the heading was accepted. Turns into walls or the body
    /// are accepted; they kill the snake on the next collision check.
    pub fn change_direction(&mut self, heading: Direction) -> bool {
        if heading == self.heading.opposite() {
            return false;
        }
        self.heading = heading;
        true
    }

    /// Applies a relative turn using `table`.
    pub fn turn(&mut self, turn: Turn, table: &RotationTable) {
        let heading = table.apply(self.heading, turn);
        self.change_direction(heading);
    }

    /// Moves one cell along the heading.
    ///
    /// The tail is dropped unless the snake ate on a previous tick, in which
    /// case the body grows by one cell. Does nothing once dead.
    pub fn advance(&mut self, cell_size: i32) {
        if !self.is_alive() {
            return;
        }
        let head = self.head().step(self.heading, cell_size);
        self.body.push_front(head);
        if self.growing {
            self.growing = false;
        } else {
            self.body.pop_back();
        }
        self.lifespan += 1;
    }

    /// Records a meal; the body grows on the next [`Snake::advance`].
    pub fn ate_food(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.growing = true;
        self.score += 1;
    }

    /// Checks the head against the walls, the own body and `other` cells.
    ///
    /// Returns the cause if the snake died on this call. A dead snake is never
    /// re-flagged and always yields `None`.
    pub fn check_collision(&mut self, grid: &Grid, other: Option<&[Cell]>) -> Option<DeathCause> {
        if !self.is_alive() {
            return None;
        }
        let head = self.head();
        let cause = if !grid.contains(head) {
            Some(DeathCause::Wall)
        } else if self.body.iter().skip(1).any(|&cell| cell == head) {
            Some(DeathCause::SelfCollision)
        } else if other.is_some_and(|cells| cells.contains(&head)) {
            Some(DeathCause::OtherSnake)
        } else {
            None
        };
        if cause.is_some() {
            self.death = cause;
        }
        cause
    }

    /// Kills a live snake without a collision (stall or full board).
    pub fn kill(&mut self, cause: DeathCause) {
        if self.is_alive() {
            self.death = Some(cause);
        }
    }

    /// Whether moving onto `cell` would kill the snake.
    fn is_danger(&self, cell: Cell, grid: &Grid, other: Option<&[Cell]>) -> bool {
        !grid.contains(cell)
            || self.body.contains(&cell)
            || other.is_some_and(|cells| cells.contains(&cell))
    }

    /// Encodes the snake's surroundings for the controller network.
    ///
    /// Layout (each entry 0 or 1):
    /// - `[0..3]` danger one cell ahead, left, right of the heading
    /// - `[3..7]` food strictly above, below, left of, right of the head
    /// - `[7..11]` heading one-hot in [`Direction::ALL`] order
    pub fn sensors(
        &self,
        grid: &Grid,
        table: &RotationTable,
        food: Cell,
        other: Option<&[Cell]>,
    ) -> Array1<f32> {
        let head = self.head();
        let relative = table.relative(self.heading);
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        let mut inputs = Vec::with_capacity(SENSOR_COUNT);
        for direction in [relative.ahead, relative.left, relative.right] {
            let probe = head.step(direction, grid.cell_size);
            inputs.push(flag(self.is_danger(probe, grid, other)));
        }

        inputs.push(flag(food.y < head.y));
        inputs.push(flag(food.y > head.y));
        inputs.push(flag(food.x < head.x));
        inputs.push(flag(food.x > head.x));

        inputs.extend(Direction::ALL.iter().map(|&d| flag(d == self.heading)));

        Array1::from_vec(inputs)
    }

    /// Fitness of the current state: `score · score_weight + lifespan · lifespan_weight`.
    pub fn fitness(&self, score_weight: f32, lifespan_weight: f32) -> f32 {
        self.score as f32 * score_weight + self.lifespan as f32 * lifespan_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(600, 400, 20)
    }

    #[test]
    fn test_reverse_is_rejected() {
        let mut snake = Snake::new(Cell::new(300, 200), Direction::Right);
        assert!(!snake.change_direction(Direction::Left));
        assert_eq!(snake.heading(), Direction::Right);
        assert!(snake.change_direction(Direction::Up));
        assert_eq!(snake.heading(), Direction::Up);
        assert!(!snake.change_direction(Direction::Down));
        assert_eq!(snake.heading(), Direction::Up);
    }

    #[test]
    fn test_growth_happens_on_next_move() {
        let mut snake = Snake::new(Cell::new(300, 200), Direction::Right);
        snake.ate_food();
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.score(), 1);
        snake.advance(20);
        assert_eq!(snake.len(), 2);
        snake.advance(20);
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Cell::new(340, 200));
        assert_eq!(snake.lifespan(), 2);
    }

    #[test]
    fn test_wall_collision_is_final() {
        let grid = grid();
        let mut snake = Snake::new(Cell::new(580, 0), Direction::Right);
        snake.advance(20);
        assert_eq!(snake.check_collision(&grid, None), Some(DeathCause::Wall));
        assert!(!snake.is_alive());
        assert_eq!(snake.check_collision(&grid, None), None);

        let fitness = snake.fitness(100.0, 1.0);
        let head = snake.head();
        snake.advance(20);
        snake.ate_food();
        assert_eq!(snake.head(), head);
        assert_eq!(snake.fitness(100.0, 1.0), fitness);
    }

    #[test]
    fn test_self_collision() {
        let grid = grid();
        let mut snake = Snake::new(Cell::new(300, 200), Direction::Right);
        for _ in 0..4 {
            snake.ate_food();
            snake.advance(20);
        }
        assert_eq!(snake.len(), 5);
        let table = RotationTable::default();
        for _ in 0..2 {
            snake.turn(Turn::Right, &table);
            snake.advance(20);
            assert_eq!(snake.check_collision(&grid, None), None);
        }
        // closing a 2×2 loop with a 5-cell body bites the tail end
        snake.turn(Turn::Right, &table);
        snake.advance(20);
        assert_eq!(
            snake.check_collision(&grid, None),
            Some(DeathCause::SelfCollision)
        );
    }

    #[test]
    fn test_other_snake_collision() {
        let grid = grid();
        let mut snake = Snake::new(Cell::new(300, 200), Direction::Right);
        snake.advance(20);
        let other = [Cell::new(320, 200), Cell::new(340, 200)];
        assert_eq!(
            snake.check_collision(&grid, Some(&other)),
            Some(DeathCause::OtherSnake)
        );
    }

    #[test]
    fn test_sensors_layout() {
        let grid = grid();
        let table = RotationTable::default();
        // top-right corner heading right: wall ahead and to the left (up)
        let snake = Snake::new(Cell::new(580, 0), Direction::Right);
        let inputs = snake.sensors(&grid, &table, Cell::new(0, 100), None);
        assert_eq!(inputs.len(), SENSOR_COUNT);
        assert_eq!(
            inputs.to_vec(),
            vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_sensors_axis_aligned_food_sets_one_flag() {
        let grid = grid();
        let table = RotationTable::default();
        let snake = Snake::new(Cell::new(300, 200), Direction::Up);
        let inputs = snake.sensors(&grid, &table, Cell::new(300, 40), None);
        assert_eq!(&inputs.to_vec()[3..7], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&inputs.to_vec()[7..11], &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_sensors_see_other_snake() {
        let grid = grid();
        let table = RotationTable::default();
        let snake = Snake::new(Cell::new(300, 200), Direction::Down);
        // heading down, "right" is screen-left
        let other = [Cell::new(280, 200)];
        let inputs = snake.sensors(&grid, &table, Cell::new(300, 200), Some(&other));
        assert_eq!(&inputs.to_vec()[0..3], &[0.0, 0.0, 1.0]);
    }
}
