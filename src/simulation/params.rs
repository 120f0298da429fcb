use std::path::Path;

use serde::{Deserialize, Serialize};

use super::brain::Topology;
use super::grid::Grid;
use super::snake::SENSOR_COUNT;
use crate::error::{Error, Result};

/// Simulation and evolution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Grid width in pixels.
    pub grid_width: i32,
    /// Grid height in pixels.
    pub grid_height: i32,
    /// Cell edge length in pixels.
    pub cell_size: i32,
    /// Moves allowed without eating, per cell and divided among the snakes.
    /// The stall budget is `multiplier · cells / snakes`.
    pub stall_budget_multiplier: f64,
    /// Fitness per food eaten.
    pub score_weight: f32,
    /// Fitness per move survived.
    pub lifespan_weight: f32,
    /// Start single-snake runs on a random cell with a random heading instead
    /// of the center heading right.
    pub random_start: bool,
    /// Controller network layer sizes.
    pub topology: Topology,
    /// Standard deviation of the initial weights.
    pub init_scale: f32,
    /// Genomes per generation.
    pub population_size: usize,
    /// Per-entry mutation probability in `[0, 1]`.
    pub mutation_rate: f64,
    /// Standard deviation of the mutation noise.
    pub mutation_strength: f32,
    /// Top genomes copied unchanged into the next generation.
    pub elitism_count: usize,
    /// Store key of the best genome seen so far.
    pub best_genome_key: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            grid_width: 600,
            grid_height: 400,
            cell_size: 20,
            stall_budget_multiplier: 200.0,
            score_weight: 100.0,
            lifespan_weight: 1.0,
            random_start: true,
            topology: Topology::default(),
            init_scale: 0.01,
            population_size: 20,
            mutation_rate: 0.01,
            mutation_strength: 0.1,
            elitism_count: 2,
            best_genome_key: "best_snake_nn".to_string(),
        }
    }
}

impl Params {
    /// The playing field.
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height, self.cell_size)
    }

    /// Moves allowed since the last meal before an arena of `snakes` is stopped.
    pub fn stall_budget(&self, snakes: usize) -> f64 {
        self.stall_budget_multiplier * self.grid().cell_count() as f64 / snakes.max(1) as f64
    }

    /// Checks that the parameters can drive a simulation.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidParams(msg));

        if self.cell_size <= 0 || self.grid_width <= 0 || self.grid_height <= 0 {
            return fail(format!(
                "grid {}x{} with cell size {} must be positive",
                self.grid_width, self.grid_height, self.cell_size
            ));
        }
        if self.grid_width % self.cell_size != 0 || self.grid_height % self.cell_size != 0 {
            return fail(format!(
                "grid {}x{} is not a multiple of cell size {}",
                self.grid_width, self.grid_height, self.cell_size
            ));
        }
        if self.topology.inputs != SENSOR_COUNT || self.topology.outputs != 3 {
            return fail(format!(
                "topology must have {} inputs and 3 outputs, got {} and {}",
                SENSOR_COUNT, self.topology.inputs, self.topology.outputs
            ));
        }
        if self.topology.hidden == 0 {
            return fail("hidden layer must not be empty".to_string());
        }
        if self.population_size == 0 {
            return fail("population size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return fail(format!("mutation rate {} outside [0, 1]", self.mutation_rate));
        }
        for (name, value) in [
            ("mutation_strength", self.mutation_strength),
            ("init_scale", self.init_scale),
            ("score_weight", self.score_weight),
            ("lifespan_weight", self.lifespan_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        if !self.stall_budget_multiplier.is_finite() || self.stall_budget_multiplier <= 0.0 {
            return fail(format!(
                "stall budget multiplier must be positive, got {}",
                self.stall_budget_multiplier
            ));
        }
        if self.best_genome_key.is_empty() {
            return fail("best genome key must not be empty".to_string());
        }
        Ok(())
    }

    /// Saves the parameters as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads and validates parameters from JSON; missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}
