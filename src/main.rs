use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use snake_evo::simulation::brain::{LoadOutcome, NeuralNetwork};
use snake_evo::simulation::evolution::EvolutionEngine;
use snake_evo::simulation::fitness::Evaluator;
use snake_evo::simulation::params::Params;
use snake_evo::simulation::persistence::FileStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake-evo")]
#[command(version)]
#[command(about = "Evolve neural-network snake controllers with a genetic algorithm")]
struct Cli {
    /// Parameter file (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding stored genomes
    #[arg(short, long, global = true, default_value = "genomes")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population and store the best genome
    Train {
        /// Number of generations
        #[arg(short, long, default_value = "100")]
        generations: u64,

        /// Random seed for reproducibility
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Play the stored best genome headless and report its results
    Replay {
        /// Number of runs
        #[arg(short, long, default_value = "10")]
        runs: u64,

        /// Random seed of the first run
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Write the default parameters to a file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "params.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let params = match &cli.config {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => Params::default(),
    };
    let store = FileStore::new(&cli.store);

    match cli.command {
        Commands::Train { generations, seed } => train(params, store, generations, seed),
        Commands::Replay { runs, seed } => replay(params, &store, runs, seed),
        Commands::InitConfig { output } => {
            params
                .save_to_file(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote parameters to {}", output.display());
            Ok(())
        }
    }
}

fn train(params: Params, store: FileStore, generations: u64, seed: u64) -> Result<()> {
    let mut engine = EvolutionEngine::new(params, store, seed).context("invalid parameters")?;
    for _ in 0..generations {
        let report = engine.run_generation().context("generation failed")?;
        println!(
            "Generation {:>4}  best {:>8.1}  mean {:>8.1}  best ever {:>8.1}{}",
            report.generation,
            report.best,
            report.mean,
            report.best_fitness_ever,
            if report.improved { "  *" } else { "" }
        );
    }
    Ok(())
}

fn replay(params: Params, store: &FileStore, runs: u64, seed: u64) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut network = NeuralNetwork::new(params.topology, params.init_scale, &mut rng);
    let key = params.best_genome_key.clone();
    match network.load(store, &key)? {
        LoadOutcome::Loaded => println!("Loaded genome `{key}` from {}", store.dir().display()),
        LoadOutcome::NotFound => {
            println!("No genome stored under `{key}`; run `train` first");
            return Ok(());
        }
    }

    let evaluator = Evaluator::new(params);
    for run in 0..runs {
        let outcome = evaluator.run_match(&[&network], &mut rng)?;
        println!(
            "Run {:>3}  score {:>3}  lifespan {:>6}  fitness {:>8.1}  ended by {:?}",
            run + 1,
            outcome.scores[0],
            outcome.lifespans[0],
            outcome.fitness[0],
            outcome.causes[0]
        );
    }
    Ok(())
}
