//! # Snake Evo - Evolved Snake Controllers
//!
//! Evolves small feed-forward neural networks that play snake on a grid,
//! using a generational genetic algorithm.
//!
//! ## Features
//!
//! - Two-layer perceptron controllers (ReLU hidden layer, arg-max decision)
//! - Headless, seedable grid simulation with one or more competing snakes
//! - Truncation selection, block-uniform crossover, per-weight Gaussian mutation
//! - Elitism and a monotonic best-genome ratchet
//! - Parallel fitness evaluation with rayon
//! - Atomic JSON persistence of the best genome
//!
//! ## Core Modules
//!
//! - [`simulation::snake`] - Snake state machine and sensors
//! - [`simulation::environment`] - Arena ticks, food and stall budget
//! - [`simulation::brain`] - Neural network and genome
//! - [`simulation::fitness`] - Headless runs and fitness
//! - [`simulation::evolution`] - Genetic algorithm
//! - [`simulation::persistence`] - Genome storage

/// Crate error type.
pub mod error;

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network controller and its genome.
    pub mod brain;
    /// Headings, relative turns and the rotation table.
    pub mod direction;
    /// Arena state and tick logic.
    pub mod environment;
    /// Events emitted by arena ticks.
    pub mod events;
    /// Generational genetic algorithm.
    pub mod evolution;
    /// Headless runs that score controllers.
    pub mod fitness;
    /// Food placement.
    pub mod food;
    /// Grid geometry.
    pub mod grid;
    /// Simulation and evolution parameters.
    pub mod params;
    /// Genome storage.
    pub mod persistence;
    /// The snake agent.
    pub mod snake;
}

pub use error::{Error, Result};
