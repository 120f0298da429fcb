//! Generational genetic algorithm over controller genomes.
//!
//! One generation evaluates every genome in parallel, ranks them, stores the
//! best genome if it beats everything seen so far, and breeds the next
//! population from the elites and the top half.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::brain::Genome;
use super::fitness::Evaluator;
use super::params::Params;
use super::persistence::GenomeStore;
use crate::error::{Error, Result};

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generations completed, including this one.
    pub generation: u64,
    /// Highest fitness in the evaluated population.
    pub best: f32,
    /// Mean fitness of the evaluated population.
    pub mean: f32,
    /// Lowest fitness in the evaluated population.
    pub worst: f32,
    /// Highest fitness of any generation so far.
    pub best_fitness_ever: f32,
    /// Whether this generation raised `best_fitness_ever` (and was stored).
    pub improved: bool,
}

/// Owns the population and drives it from generation to generation.
#[derive(Debug)]
pub struct EvolutionEngine<S: GenomeStore> {
    params: Params,
    evaluator: Evaluator,
    population: Vec<Genome>,
    generation: u64,
    best_fitness_ever: f32,
    rng: ChaCha8Rng,
    store: S,
}

impl<S: GenomeStore> EvolutionEngine<S> {
    /// Creates an engine with a freshly initialised population.
    ///
    /// Initial weights and every later random choice derive from `seed`.
    pub fn new(params: Params, store: S, seed: u64) -> Result<Self> {
        params.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let population = (0..params.population_size)
            .map(|_| Genome::random(&params.topology, params.init_scale, &mut rng))
            .collect();
        Ok(Self::assemble(params, store, population, rng))
    }

    /// Creates an engine around an existing population.
    pub fn with_population(
        params: Params,
        store: S,
        population: Vec<Genome>,
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        if population.len() != params.population_size {
            return Err(Error::InvalidParams(format!(
                "population holds {} genomes, expected {}",
                population.len(),
                params.population_size
            )));
        }
        for genome in &population {
            genome.check_shapes(&params.topology)?;
        }
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::assemble(params, store, population, rng))
    }

    fn assemble(params: Params, store: S, population: Vec<Genome>, rng: ChaCha8Rng) -> Self {
        Self {
            evaluator: Evaluator::new(params.clone()),
            params,
            population,
            generation: 0,
            best_fitness_ever: f32::NEG_INFINITY,
            rng,
            store,
        }
    }

    /// Current population.
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    /// Generations completed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Highest fitness seen so far; `-inf` before the first generation.
    pub fn best_fitness_ever(&self) -> f32 {
        self.best_fitness_ever
    }

    /// Parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Store receiving the best genome.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluates, ranks and replaces the population once.
    pub fn run_generation(&mut self) -> Result<GenerationReport> {
        // seeds are drawn up front so results do not depend on thread scheduling
        let seeds: Vec<u64> = (0..self.population.len()).map(|_| self.rng.r#gen()).collect();
        let evaluator = &self.evaluator;
        let fitness: Vec<f32> = self
            .population
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(genome, &seed)| evaluator.evaluate(genome, seed))
            .collect::<Result<_>>()?;

        let mut ranked: Vec<(f32, usize)> = fitness.iter().copied().zip(0..).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let (best, best_index) = ranked[0];
        let improved = best > self.best_fitness_ever;
        if improved {
            self.store
                .save(&self.params.best_genome_key, &self.population[best_index])?;
            self.best_fitness_ever = best;
            tracing::info!(
                generation = self.generation + 1,
                fitness = best,
                key = %self.params.best_genome_key,
                "new best genome stored"
            );
        }

        let next = breed(&self.population, &ranked, &self.params, &mut self.rng);
        self.population = next;
        self.generation += 1;

        let report = GenerationReport {
            generation: self.generation,
            best,
            mean: fitness.iter().sum::<f32>() / fitness.len() as f32,
            worst: ranked[ranked.len() - 1].0,
            best_fitness_ever: self.best_fitness_ever,
            improved,
        };
        tracing::debug!(
            generation = report.generation,
            best = report.best,
            mean = report.mean,
            worst = report.worst,
            "generation complete"
        );
        Ok(report)
    }

    /// Runs `generations` generations, returning one report per generation.
    pub fn run(&mut self, generations: u64) -> Result<Vec<GenerationReport>> {
        (0..generations).map(|_| self.run_generation()).collect()
    }
}

/// Builds the next population from a ranking of `population`.
///
/// The top `elitism_count` genomes are copied unchanged; the rest are children
/// of two parents drawn uniformly, with replacement, from the top half.
fn breed<R: Rng + ?Sized>(
    population: &[Genome],
    ranked: &[(f32, usize)],
    params: &Params,
    rng: &mut R,
) -> Vec<Genome> {
    let size = params.population_size;
    let elites = params.elitism_count.min(ranked.len());
    let parents: Vec<&Genome> = ranked[..(size / 2).clamp(1, ranked.len())]
        .iter()
        .map(|&(_, index)| &population[index])
        .collect();

    let mut next: Vec<Genome> = ranked[..elites]
        .iter()
        .map(|&(_, index)| population[index].clone())
        .collect();
    while next.len() < size {
        let parent1 = parents[rng.gen_range(0..parents.len())];
        let parent2 = parents[rng.gen_range(0..parents.len())];
        let mut child = Genome::crossover(parent1, parent2, rng);
        child.mutate(params.mutation_rate, params.mutation_strength, rng);
        next.push(child);
    }
    next
}
