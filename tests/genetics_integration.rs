use carevolver::engines::generation::genetic_algorithm::{GeneticAlgorithm, GeneticAlgorithmDesc};
use carevolver::engines::generation::genome::Genome;
use carevolver::engines::generation::operators::roulette_selection;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn test_desc() -> GeneticAlgorithmDesc {
    GeneticAlgorithmDesc {
        seed: 42,
        pop_size: 50,
        elite_count: 5,
        mutation_prob: 0.25,
        mutation_strength: 0.125,
        crossover_prob: 0.75,
    }
}

#[test]
fn initial_population_is_zero_fitness_and_sized() {
    let ga = GeneticAlgorithm::new(test_desc(), 3, 2).unwrap();

    assert_eq!(ga.population_size(), 50);
    assert_eq!(ga.current_generation(), 0);
    for i in 0..ga.population_size() {
        let genome = ga.individual(i).unwrap();
        assert_eq!(genome.fitness, 0);
        assert_eq!(genome.values.len(), 3);
        assert!(genome.values.iter().all(|v| *v < 2));
    }
}

#[test]
fn initialization_rejects_degenerate_parameters() {
    let mut desc = test_desc();
    desc.pop_size = 0;
    assert!(GeneticAlgorithm::new(desc, 3, 2).is_err());

    assert!(GeneticAlgorithm::new(test_desc(), 0, 2).is_err());
    assert!(GeneticAlgorithm::new(test_desc(), 3, 0).is_err());
}

#[test]
fn uniform_fitness_keeps_first_individuals_as_elites() {
    let mut ga = GeneticAlgorithm::new(test_desc(), 4, 16).unwrap();

    let originals: Vec<Genome> = (0..5).map(|i| ga.individual(i).unwrap().clone()).collect();

    for i in 0..ga.population_size() {
        ga.assign_fitness(i, 80).unwrap();
    }
    ga.advance_generation().unwrap();

    // The sort is stable, so with every fitness tied the elite set is the
    // first five members of the previous generation, carried by value with
    // their fitness intact.
    assert_eq!(ga.current_generation(), 1);
    for (i, original) in originals.iter().enumerate() {
        let elite = ga.individual(i).unwrap();
        assert_eq!(elite.values, original.values);
        assert_eq!(elite.fitness, 80);
    }

    // Everyone else is a fresh offspring awaiting evaluation.
    for i in 5..ga.population_size() {
        assert_eq!(ga.individual(i).unwrap().fitness, 0);
    }
}

#[test]
fn advance_records_best_and_average() {
    let mut ga = GeneticAlgorithm::new(test_desc(), 2, 8).unwrap();

    for i in 0..ga.population_size() {
        ga.assign_fitness(i, if i == 7 { 250 } else { 10 }).unwrap();
    }
    let lucky = ga.individual(7).unwrap().clone();
    ga.advance_generation().unwrap();

    assert_eq!(ga.best_individual().fitness, 250);
    assert_eq!(ga.best_individual().values, lucky.values);

    let expected_average = (250.0 + 49.0 * 10.0) / 50.0;
    assert!((ga.average_fitness() - expected_average).abs() < 1e-4);
}

#[test]
fn roulette_with_zero_total_fitness_never_fails() {
    let population: Vec<Genome> = (0..50).map(|_| Genome::zeroed(3)).collect();
    let mut rng = StdRng::seed_from_u64(123);

    for _ in 0..10_000 {
        let index = roulette_selection(&population, &mut rng);
        assert!(index < population.len());
    }
}

#[test]
fn same_seed_reproduces_the_run() {
    let make_run = || {
        let mut ga = GeneticAlgorithm::new(test_desc(), 3, 32).unwrap();
        for i in 0..ga.population_size() {
            ga.assign_fitness(i, (i * 5) as u8).unwrap();
        }
        ga.advance_generation().unwrap();
        (0..ga.population_size())
            .map(|i| ga.individual(i).unwrap().values.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(make_run(), make_run());
}

#[test]
fn offspring_stay_inside_the_coordinate_range() {
    let mut desc = test_desc();
    desc.pop_size = 12;
    desc.elite_count = 2;
    let mut ga = GeneticAlgorithm::new(desc, 3, 8).unwrap();

    for generation in 0..20 {
        for i in 0..ga.population_size() {
            ga.assign_fitness(i, ((i + generation) % 200) as u8).unwrap();
        }
        ga.advance_generation().unwrap();
        for i in 0..ga.population_size() {
            let genome = ga.individual(i).unwrap();
            assert_eq!(genome.values.len(), 3);
            assert!(genome.values.iter().all(|v| *v < 8));
        }
    }
    assert_eq!(ga.current_generation(), 20);
}
