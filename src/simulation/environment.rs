//! One arena: a grid, its food and the snakes competing for it.
//!
//! Each call to [`Environment::step`] is one tick:
//! 1. the stall counter advances; past the budget every live snake dies
//! 2. live snakes apply their turn and move
//! 3. collisions are checked against walls, own bodies and the other snakes
//! 4. the first live snake whose head is on the food eats it and the food is
//!    placed again, resetting the stall counter
//!
//! Dead snakes keep their bodies on the board as obstacles.

use std::collections::HashSet;

use ndarray::Array1;
use rand::Rng;

use super::direction::{Direction, RotationTable, Turn};
use super::events::{DeathCause, Event};
use super::food::Food;
use super::grid::{Cell, Grid};
use super::params::Params;
use super::snake::Snake;
use crate::error::{Error, Result};

/// Grid, food and snakes of one run.
#[derive(Debug, Clone)]
pub struct Environment {
    grid: Grid,
    table: RotationTable,
    snakes: Vec<Snake>,
    food: Option<Food>,
    moves_since_food: u64,
    stall_budget: f64,
    ticks: u64,
}

impl Environment {
    /// Creates an arena with the given snakes and places the first food.
    pub fn new<R: Rng + ?Sized>(params: &Params, snakes: Vec<Snake>, rng: &mut R) -> Result<Self> {
        if snakes.is_empty() {
            return Err(Error::InvalidParams(
                "an arena needs at least one snake".to_string(),
            ));
        }
        let mut env = Self {
            grid: params.grid(),
            table: RotationTable::default(),
            stall_budget: params.stall_budget(snakes.len()),
            snakes,
            food: None,
            moves_since_food: 0,
            ticks: 0,
        };
        env.respawn_food(rng);
        Ok(env)
    }

    /// Creates an arena of `count` snakes at their standard start cells.
    pub fn with_snakes<R: Rng + ?Sized>(params: &Params, count: usize, rng: &mut R) -> Result<Self> {
        let snakes = start_positions(params, count, rng);
        Self::new(params, snakes, rng)
    }

    /// The playing field.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Heading rotation table used for turns and sensors.
    pub fn table(&self) -> &RotationTable {
        &self.table
    }

    /// All snakes, in controller order.
    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    /// Current food cell; `None` once the board is full.
    pub fn food(&self) -> Option<Cell> {
        self.food.map(|food| food.cell)
    }

    /// Ticks since the last meal.
    pub fn moves_since_food(&self) -> u64 {
        self.moves_since_food
    }

    /// Ticks allowed since the last meal.
    pub fn stall_budget(&self) -> f64 {
        self.stall_budget
    }

    /// Ticks played.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether every snake is dead.
    pub fn is_over(&self) -> bool {
        self.snakes.iter().all(|snake| !snake.is_alive())
    }

    /// Cells occupied by every snake except `index`.
    pub fn other_cells(&self, index: usize) -> Vec<Cell> {
        self.snakes
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .flat_map(|(_, snake)| snake.body().iter().copied())
            .collect()
    }

    /// Sensor vector for snake `index`.
    pub fn sensors(&self, index: usize) -> Array1<f32> {
        let snake = &self.snakes[index];
        let food = self.food().unwrap_or_else(|| snake.head());
        let others = self.other_cells(index);
        let others = (!others.is_empty()).then_some(others.as_slice());
        snake.sensors(&self.grid, &self.table, food, others)
    }

    /// Plays one tick with one turn per snake; turns of dead snakes are ignored.
    pub fn step<R: Rng + ?Sized>(&mut self, turns: &[Turn], rng: &mut R) -> Result<Vec<Event>> {
        if turns.len() != self.snakes.len() {
            return Err(Error::ControllerCount {
                expected: self.snakes.len(),
                found: turns.len(),
            });
        }
        let mut events = Vec::new();
        if self.is_over() {
            return Ok(events);
        }
        self.ticks += 1;

        self.moves_since_food += 1;
        if self.moves_since_food as f64 > self.stall_budget {
            self.kill_all(DeathCause::Stalled, &mut events);
            return Ok(events);
        }

        let cell_size = self.grid.cell_size;
        for (snake, &turn) in self.snakes.iter_mut().zip(turns) {
            if snake.is_alive() {
                snake.turn(turn, &self.table);
                snake.advance(cell_size);
            }
        }

        for index in 0..self.snakes.len() {
            if !self.snakes[index].is_alive() {
                continue;
            }
            let others = self.other_cells(index);
            let others = (!others.is_empty()).then_some(others.as_slice());
            if let Some(cause) = self.snakes[index].check_collision(&self.grid, others) {
                events.push(Event::Died { snake: index, cause });
            }
        }

        if let Some(food) = self.food {
            let eater = self
                .snakes
                .iter()
                .position(|snake| snake.is_alive() && snake.head() == food.cell);
            if let Some(index) = eater {
                self.snakes[index].ate_food();
                events.push(Event::FoodEaten {
                    snake: index,
                    cell: food.cell,
                });
                match self.respawn_food(rng) {
                    Some(cell) => events.push(Event::FoodSpawned { cell }),
                    None => self.kill_all(DeathCause::BoardFull, &mut events),
                }
            }
        }

        Ok(events)
    }

    fn kill_all(&mut self, cause: DeathCause, events: &mut Vec<Event>) {
        for (index, snake) in self.snakes.iter_mut().enumerate() {
            if snake.is_alive() {
                snake.kill(cause);
                events.push(Event::Died { snake: index, cause });
            }
        }
    }

    /// Places the food on a free cell and resets the stall counter.
    fn respawn_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Cell> {
        let occupied: HashSet<Cell> = self
            .snakes
            .iter()
            .flat_map(|snake| snake.body().iter().copied())
            .collect();
        self.food = Food::spawn(&self.grid, &occupied, rng);
        self.moves_since_food = 0;
        if self.food.is_none() {
            tracing::debug!(ticks = self.ticks, "no free cell left for food");
        }
        self.food()
    }
}

/// Standard start cells for `count` snakes.
///
/// A single snake starts on a random cell with a random heading when
/// `params.random_start` is set, otherwise at the center heading right.
/// Several snakes are spread along the middle row at `(2i + 1) / 2n` of the
/// width, alternately heading right and left.
pub fn start_positions<R: Rng + ?Sized>(params: &Params, count: usize, rng: &mut R) -> Vec<Snake> {
    let grid = params.grid();
    if count == 1 && params.random_start {
        let cell = grid.cell_at(rng.gen_range(0..grid.cols()), rng.gen_range(0..grid.rows()));
        let heading = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        return vec![Snake::new(cell, heading)];
    }
    (0..count)
        .map(|i| {
            let fx = (2 * i + 1) as f32 / (2 * count) as f32;
            let heading = if i % 2 == 0 {
                Direction::Right
            } else {
                Direction::Left
            };
            Snake::new(grid.cell_at_fraction(fx, 0.5), heading)
        })
        .collect()
}
