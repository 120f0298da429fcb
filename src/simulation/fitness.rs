//! Headless runs that turn controllers into fitness values.

use ndarray::ArrayView1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::brain::{Genome, NeuralNetwork};
use super::direction::Turn;
use super::environment::Environment;
use super::events::DeathCause;
use super::params::Params;
use crate::error::{Error, Result};

/// Anything that can steer a snake from its sensor vector.
pub trait Controller {
    /// Picks a relative turn for the next move.
    fn decide(&self, sensors: ArrayView1<f32>) -> Result<Turn>;
}

/// Terminal state of one run, per snake in controller order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Weighted fitness of each snake.
    pub fitness: Vec<f32>,
    /// Foods eaten by each snake.
    pub scores: Vec<u32>,
    /// Moves survived by each snake.
    pub lifespans: Vec<u32>,
    /// How each snake died.
    pub causes: Vec<Option<DeathCause>>,
    /// Ticks until every snake was dead.
    pub ticks: u64,
}

/// Drives arenas to completion and scores the snakes.
#[derive(Debug, Clone)]
pub struct Evaluator {
    params: Params,
}

impl Evaluator {
    /// Creates an evaluator for the given parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Parameters used for every run.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Runs one arena with one snake per controller at the standard start cells.
    ///
    /// Fails before simulating anything if `controllers` is empty.
    pub fn run_match<R: Rng + ?Sized>(
        &self,
        controllers: &[&dyn Controller],
        rng: &mut R,
    ) -> Result<MatchOutcome> {
        if controllers.is_empty() {
            return Err(Error::MissingController);
        }
        let env = Environment::with_snakes(&self.params, controllers.len(), rng)?;
        self.run_arena(env, controllers, rng)
    }

    /// Runs a prepared arena until every snake is dead.
    ///
    /// The stall budget guarantees termination even for controllers that
    /// circle forever.
    pub fn run_arena<R: Rng + ?Sized>(
        &self,
        mut env: Environment,
        controllers: &[&dyn Controller],
        rng: &mut R,
    ) -> Result<MatchOutcome> {
        if controllers.is_empty() {
            return Err(Error::MissingController);
        }
        if controllers.len() != env.snakes().len() {
            return Err(Error::ControllerCount {
                expected: env.snakes().len(),
                found: controllers.len(),
            });
        }

        let mut turns = vec![Turn::Straight; controllers.len()];
        while !env.is_over() {
            for (index, controller) in controllers.iter().enumerate() {
                turns[index] = if env.snakes()[index].is_alive() {
                    controller.decide(env.sensors(index).view())?
                } else {
                    Turn::Straight
                };
            }
            env.step(&turns, rng)?;
        }

        let snakes = env.snakes();
        let outcome = MatchOutcome {
            fitness: snakes
                .iter()
                .map(|s| s.fitness(self.params.score_weight, self.params.lifespan_weight))
                .collect(),
            scores: snakes.iter().map(|s| s.score()).collect(),
            lifespans: snakes.iter().map(|s| s.lifespan()).collect(),
            causes: snakes.iter().map(|s| s.death_cause()).collect(),
            ticks: env.ticks(),
        };
        tracing::debug!(ticks = outcome.ticks, scores = ?outcome.scores, "match finished");
        Ok(outcome)
    }

    /// Fitness of `genome` playing alone, with all randomness drawn from `seed`.
    pub fn evaluate(&self, genome: &Genome, seed: u64) -> Result<f32> {
        let network = NeuralNetwork::from_genome(self.params.topology, genome.clone())?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let outcome = self.run_match(&[&network], &mut rng)?;
        Ok(outcome.fitness[0])
    }
}
