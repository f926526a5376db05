use crate::config::genetics::GeneticsConfig;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::operators::{
    crossover_offspring, mutate, random_genome, roulette_selection,
};
use crate::error::{CarEvolverError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters of one genetic algorithm run.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithmDesc {
    pub seed: u64,
    pub pop_size: u32,
    /// How many elites to copy over to the next generation.
    pub elite_count: u32,
    /// Probability of an offspring getting mutated.
    pub mutation_prob: f32,
    /// How far (in relation to the texture resolution) a gene value can
    /// change in a single mutation.
    pub mutation_strength: f32,
    pub crossover_prob: f32,
}

impl From<&GeneticsConfig> for GeneticAlgorithmDesc {
    fn from(config: &GeneticsConfig) -> Self {
        Self {
            seed: config.seed,
            pop_size: config.population_size,
            elite_count: config.elite_count,
            mutation_prob: config.mutation_rate,
            mutation_strength: config.mutation_strength,
            crossover_prob: config.crossover_rate,
        }
    }
}

/// Owns a population of genomes and advances it one generation at a time.
///
/// Reproducibility: all randomness flows through one generator seeded from
/// `desc.seed`, advanced only by selection draws, the crossover coin, the
/// per-gene swap coins and the mutation draws, in that order.
pub struct GeneticAlgorithm {
    rng: StdRng,
    desc: GeneticAlgorithmDesc,
    num_genes: usize,
    resolution: u32,
    population: Vec<Genome>,
    current_generation: u32,
    average_fitness: f32,
    best_individual: Genome,
}

impl GeneticAlgorithm {
    /// Creates an initial population of uniformly random genomes, all with
    /// fitness 0. Gene values range from 0 to `resolution - 1`.
    pub fn new(desc: GeneticAlgorithmDesc, num_genes: usize, resolution: u32) -> Result<Self> {
        if desc.pop_size < 1 {
            return Err(CarEvolverError::Generation(
                "Population size must be at least 1".to_string(),
            ));
        }
        if num_genes < 1 {
            return Err(CarEvolverError::Generation(
                "Need at least 1 enabled gene to evolve".to_string(),
            ));
        }
        if resolution < 1 {
            return Err(CarEvolverError::Generation(
                "Texture resolution must be at least 1".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(desc.seed);
        let population: Vec<Genome> = (0..desc.pop_size)
            .map(|_| random_genome(num_genes, resolution, &mut rng))
            .collect();
        let best_individual = population[0].clone();

        Ok(Self {
            rng,
            desc,
            num_genes,
            resolution,
            population,
            current_generation: 0,
            average_fitness: 0.0,
            best_individual,
        })
    }

    /// Assigns a fitness value to an individual. The fitness of each new
    /// individual must be assigned between generations; elites keep the
    /// fitness they earned in past generations.
    pub fn assign_fitness(&mut self, index: usize, fitness: u8) -> Result<()> {
        let genome = self.population.get_mut(index).ok_or_else(|| {
            CarEvolverError::Generation(format!("No individual at index {index}"))
        })?;
        genome.fitness = fitness;
        Ok(())
    }

    /// Runs the genetic algorithm for one generation: sort by fitness,
    /// record average/best, copy elites, then fill the rest of the next
    /// population with offspring pairs.
    pub fn advance_generation(&mut self) -> Result<()> {
        if self.population.len() != self.desc.pop_size as usize {
            return Err(CarEvolverError::Generation(format!(
                "Population size changed mid-run: {} != {}",
                self.population.len(),
                self.desc.pop_size
            )));
        }

        self.current_generation += 1;

        // Stable sort keeps tied individuals in their original order.
        self.population.sort_by(|a, b| b.fitness.cmp(&a.fitness));

        self.average_fitness = average_fitness(&self.population);
        self.best_individual = self.population[0].clone();

        let pop_size = self.desc.pop_size as usize;
        let mut new_pop: Vec<Genome> = Vec::with_capacity(pop_size + 1);
        new_pop.extend(
            self.population
                .iter()
                .take(self.desc.elite_count as usize)
                .cloned(),
        );

        while new_pop.len() < pop_size {
            let parent_a = roulette_selection(&self.population, &mut self.rng);
            let parent_b = roulette_selection(&self.population, &mut self.rng);

            let (mut child_a, mut child_b) = crossover_offspring(
                &self.population[parent_a],
                &self.population[parent_b],
                self.desc.crossover_prob,
                &mut self.rng,
            );
            if self.rng.gen::<f32>() < self.desc.mutation_prob {
                mutate(&mut child_a, self.resolution, self.desc.mutation_strength, &mut self.rng);
            }
            if self.rng.gen::<f32>() < self.desc.mutation_prob {
                mutate(&mut child_b, self.resolution, self.desc.mutation_strength, &mut self.rng);
            }

            new_pop.push(child_a);
            new_pop.push(child_b);
        }

        // The last offspring pair may overshoot by one.
        new_pop.truncate(pop_size);
        self.population = new_pop;

        log::debug!(
            "Generation {} ready: best fitness {}, average {:.2}",
            self.current_generation,
            self.best_individual.fitness,
            self.average_fitness
        );
        Ok(())
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    pub fn individual(&self, index: usize) -> Result<&Genome> {
        self.population
            .get(index)
            .ok_or_else(|| CarEvolverError::Generation(format!("No individual at index {index}")))
    }

    pub fn current_generation(&self) -> u32 {
        self.current_generation
    }

    pub fn average_fitness(&self) -> f32 {
        self.average_fitness
    }

    pub fn best_individual(&self) -> &Genome {
        &self.best_individual
    }

    pub fn num_genes(&self) -> usize {
        self.num_genes
    }
}

fn average_fitness(population: &[Genome]) -> f32 {
    if population.is_empty() {
        return 0.0;
    }
    let total: u32 = population.iter().map(|g| g.fitness as u32).sum();
    total as f32 / population.len() as f32
}
