#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_evo::Error;
use snake_evo::simulation::brain::{Genome, Topology};
use snake_evo::simulation::evolution::EvolutionEngine;
use snake_evo::simulation::fitness::Evaluator;
use snake_evo::simulation::params::Params;
use snake_evo::simulation::persistence::{FileStore, GenomeStore, MemoryStore};

fn small_params() -> Params {
    Params {
        grid_width: 100,
        grid_height: 100,
        stall_budget_multiplier: 2.0,
        population_size: 6,
        elitism_count: 2,
        mutation_rate: 0.2,
        init_scale: 0.5,
        ..Params::default()
    }
}

#[test]
fn test_same_seed_same_evolution() {
    let mut a = EvolutionEngine::new(small_params(), MemoryStore::new(), 7).unwrap();
    let mut b = EvolutionEngine::new(small_params(), MemoryStore::new(), 7).unwrap();

    let reports_a = a.run(3).unwrap();
    let reports_b = b.run(3).unwrap();

    assert_eq!(reports_a, reports_b);
    assert_eq!(a.population(), b.population());
    assert_eq!(a.best_fitness_ever(), b.best_fitness_ever());
}

#[test]
fn test_evaluate_is_reproducible() {
    let params = small_params();
    let evaluator = Evaluator::new(params.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let genome = Genome::random(&params.topology, 0.5, &mut rng);

    assert_eq!(
        evaluator.evaluate(&genome, 99).unwrap(),
        evaluator.evaluate(&genome, 99).unwrap()
    );
}

#[test]
fn test_population_keeps_size_and_shapes() {
    let params = small_params();
    let mut engine = EvolutionEngine::new(params.clone(), MemoryStore::new(), 3).unwrap();
    for _ in 0..4 {
        engine.run_generation().unwrap();
        assert_eq!(engine.population().len(), params.population_size);
        for genome in engine.population() {
            genome.check_shapes(&params.topology).unwrap();
        }
    }
    assert_eq!(engine.generation(), 4);
}

#[test]
fn test_best_fitness_never_decreases() {
    let mut engine = EvolutionEngine::new(small_params(), MemoryStore::new(), 11).unwrap();
    assert_eq!(engine.best_fitness_ever(), f32::NEG_INFINITY);

    let reports = engine.run(5).unwrap();
    assert!(reports[0].improved);
    for pair in reports.windows(2) {
        assert!(pair[1].best_fitness_ever >= pair[0].best_fitness_ever);
    }
    for report in &reports {
        assert!(report.best <= report.best_fitness_ever);
        assert!(report.worst <= report.best);
        if report.improved {
            assert_eq!(report.best_fitness_ever, report.best);
        }
    }
}

#[test]
fn test_elites_survive_unchanged() {
    let params = small_params();
    let mut engine = EvolutionEngine::new(params.clone(), MemoryStore::new(), 5).unwrap();
    for _ in 0..3 {
        let previous = engine.population().to_vec();
        engine.run_generation().unwrap();
        for elite in &engine.population()[..params.elitism_count] {
            assert!(previous.contains(elite));
        }
    }
}

#[test]
fn test_elites_are_top_ranked_in_order() {
    let params = Params {
        population_size: 8,
        elitism_count: 3,
        ..small_params()
    };
    let seed = 31;
    let mut rng = ChaCha8Rng::seed_from_u64(101);
    let genomes: Vec<Genome> = (0..params.population_size)
        .map(|_| Genome::random(&params.topology, 0.5, &mut rng))
        .collect();

    // the engine draws one evaluation seed per genome from its own seeded rng
    let mut engine_rng = ChaCha8Rng::seed_from_u64(seed);
    let eval_seeds: Vec<u64> = genomes.iter().map(|_| engine_rng.r#gen()).collect();
    let evaluator = Evaluator::new(params.clone());
    let mut ranked: Vec<(f32, usize)> = genomes
        .iter()
        .zip(&eval_seeds)
        .enumerate()
        .map(|(i, (genome, &s))| (evaluator.evaluate(genome, s).unwrap(), i))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut engine =
        EvolutionEngine::with_population(params.clone(), MemoryStore::new(), genomes.clone(), seed)
            .unwrap();
    let report = engine.run_generation().unwrap();
    assert_eq!(report.best, ranked[0].0);

    for (elite, &(_, index)) in engine.population()[..params.elitism_count]
        .iter()
        .zip(&ranked)
    {
        assert_eq!(elite, &genomes[index]);
    }
}

#[test]
fn test_elitism_count_above_population_is_capped() {
    let params = Params {
        population_size: 7,
        elitism_count: 10,
        ..small_params()
    };
    let mut engine = EvolutionEngine::new(params, MemoryStore::new(), 37).unwrap();
    let reports = engine.run(3).unwrap();
    assert_eq!(reports.len(), 3);
    assert_eq!(engine.population().len(), 7);
}

#[test]
fn test_first_generation_stores_top_genome() {
    let params = small_params();
    let mut engine = EvolutionEngine::new(params.clone(), MemoryStore::new(), 13).unwrap();
    assert!(engine.store().is_empty());

    let report = engine.run_generation().unwrap();
    assert!(report.improved);
    assert_eq!(report.best_fitness_ever, report.best);

    let stored = engine
        .store()
        .load(&params.best_genome_key, &params.topology)
        .unwrap()
        .unwrap();
    // the best genome is also the first elite
    assert_eq!(&stored, &engine.population()[0]);
}

#[test]
fn test_children_without_mutation_reuse_parent_tensors() {
    let params = Params {
        mutation_rate: 0.0,
        elitism_count: 0,
        ..small_params()
    };
    let mut engine = EvolutionEngine::new(params, MemoryStore::new(), 17).unwrap();
    let previous = engine.population().to_vec();
    engine.run_generation().unwrap();

    for child in engine.population() {
        for (i, tensor) in child.tensors().into_iter().enumerate() {
            assert!(previous.iter().any(|parent| parent.tensors()[i] == tensor));
        }
    }
}

#[test]
fn test_single_genome_population() {
    let params = Params {
        population_size: 1,
        elitism_count: 0,
        ..small_params()
    };
    let mut engine = EvolutionEngine::new(params, MemoryStore::new(), 19).unwrap();
    engine.run(2).unwrap();
    assert_eq!(engine.population().len(), 1);
}

#[test]
fn test_with_population_checks_input() {
    let params = small_params();
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    let genomes: Vec<Genome> = (0..params.population_size)
        .map(|_| Genome::random(&params.topology, 0.1, &mut rng))
        .collect();

    assert!(matches!(
        EvolutionEngine::with_population(
            params.clone(),
            MemoryStore::new(),
            genomes[..2].to_vec(),
            0
        ),
        Err(Error::InvalidParams(_))
    ));

    let mut wrong = genomes.clone();
    wrong[4] = Genome::random(
        &Topology {
            hidden: 8,
            ..params.topology
        },
        0.1,
        &mut rng,
    );
    assert!(matches!(
        EvolutionEngine::with_population(params.clone(), MemoryStore::new(), wrong, 0),
        Err(Error::ShapeMismatch { .. })
    ));

    let engine =
        EvolutionEngine::with_population(params, MemoryStore::new(), genomes.clone(), 0).unwrap();
    assert_eq!(engine.population(), genomes.as_slice());
}

#[test]
fn test_invalid_params_are_rejected() {
    let params = Params {
        population_size: 0,
        ..small_params()
    };
    assert!(matches!(
        EvolutionEngine::new(params, MemoryStore::new(), 0),
        Err(Error::InvalidParams(_))
    ));
}

#[test]
fn test_training_writes_best_genome_file() {
    let dir = tempfile::tempdir().unwrap();
    let params = small_params();
    let mut engine = EvolutionEngine::new(params.clone(), FileStore::new(dir.path()), 29).unwrap();
    engine.run(2).unwrap();

    let path = engine.store().path_for(&params.best_genome_key).unwrap();
    assert!(path.exists());
    let stored = engine
        .store()
        .load(&params.best_genome_key, &params.topology)
        .unwrap();
    assert!(stored.is_some());
}
