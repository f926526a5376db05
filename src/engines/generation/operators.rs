use crate::engines::generation::genome::Genome;
use rand::Rng;

/// Roulette wheel selection: probability proportional to fitness, so an
/// individual with 0 fitness is never picked. If the whole population has 0
/// fitness, falls back to a uniform random choice. Returns the index of the
/// selected individual.
pub fn roulette_selection<R: Rng>(population: &[Genome], rng: &mut R) -> usize {
    if population.len() <= 1 {
        return 0;
    }

    let total_fitness: u32 = population.iter().map(|g| g.fitness as u32).sum();
    if total_fitness == 0 {
        return rng.gen_range(0..population.len());
    }

    let mut roulette = rng.gen_range(0..total_fitness);
    for (i, genome) in population.iter().enumerate() {
        if roulette < genome.fitness as u32 {
            return i;
        }
        roulette -= genome.fitness as u32;
    }
    // The roulette value is strictly below the fitness total, so the loop
    // always returns.
    unreachable!("roulette spin exceeded total fitness");
}

/// Produces two children from two parents. With probability `crossover_prob`
/// each gene position independently swaps between the children (uniform
/// per-gene swap, not a single cut point); otherwise the children are exact
/// clones of their respective parent. Fitness starts at 0 either way.
pub fn crossover_offspring<R: Rng>(
    parent_a: &Genome,
    parent_b: &Genome,
    crossover_prob: f32,
    rng: &mut R,
) -> (Genome, Genome) {
    debug_assert_eq!(parent_a.values.len(), parent_b.values.len());

    let num_genes = parent_a.values.len();
    let mut out_a = Genome::zeroed(num_genes);
    let mut out_b = Genome::zeroed(num_genes);

    if !(rng.gen::<f32>() < crossover_prob) {
        out_a.values.copy_from_slice(&parent_a.values);
        out_b.values.copy_from_slice(&parent_b.values);
    } else {
        for i in 0..num_genes {
            if rng.gen::<bool>() {
                out_a.values[i] = parent_a.values[i];
                out_b.values[i] = parent_b.values[i];
            } else {
                out_a.values[i] = parent_b.values[i];
                out_b.values[i] = parent_a.values[i];
            }
        }
    }

    (out_a, out_b)
}

/// Perturbs every gene of the genome: the new value is drawn uniformly from
/// `[current - strength, current + strength]`, rounded and clamped to
/// `[0, resolution - 1]`, where `strength = (resolution - 1) * mutation_strength`.
pub fn mutate<R: Rng>(genome: &mut Genome, resolution: u32, mutation_strength: f32, rng: &mut R) {
    let max_coord = (resolution.max(1) - 1) as f32;
    let strength = max_coord * mutation_strength;

    for value in genome.values.iter_mut() {
        let current = *value as f32;
        let low = (current - strength).max(0.0);
        let high = (current + strength).min(max_coord);

        let mutation = rng.gen_range(low..=high).round();
        *value = mutation.clamp(0.0, max_coord) as u16;
    }
}

/// A genome with every gene drawn uniformly from `[0, resolution - 1]`.
pub fn random_genome<R: Rng>(num_genes: usize, resolution: u32, rng: &mut R) -> Genome {
    let mut genome = Genome::zeroed(num_genes);
    for value in genome.values.iter_mut() {
        *value = rng.gen_range(0..resolution.max(1)) as u16;
    }
    genome
}
