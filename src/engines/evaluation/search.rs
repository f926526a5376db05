use crate::config::manager::AppConfig;
use crate::engines::evaluation::coordinate_space::CoordinateSpace;
use crate::engines::evaluation::fitness_texture::FitnessTexture;
use crate::engines::evaluation::trial::{calculate_score, Score, TrialSim};
use crate::engines::generation::genetic_algorithm::{GeneticAlgorithm, GeneticAlgorithmDesc};
use crate::engines::generation::genome::Genome;
use crate::engines::generation::interpreter::GeneId;
use crate::error::{CarEvolverError, Result};
use crate::types::TerrainDesc;

/// What the search is currently doing. Each variant carries only the state
/// that belongs to that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// The embedding application controls the car; trials restart on loss.
    Manual,
    /// The car drives itself on the current genome, forever.
    AutoDrive,
    /// Exhaustive enumeration of every coordinate in the design space.
    BruteForce,
    /// Generational genetic algorithm over a population of genomes.
    Evolving { population_index: usize },
    /// Re-runs the same genome on successive terrain seeds to find the
    /// terrain that best suits the current car.
    TerrainSearch { best_seed: u32, best_score: Score },
}

/// Progress reporting back into user code. The search driver never renders
/// or reads input; everything it has to say goes through here.
pub trait SearchCallback {
    fn on_status(&mut self, status: &str);
    fn on_generation_complete(&mut self, generation: u32, best_fitness: u8, average_fitness: f32);
    fn on_search_complete(&mut self, best: &Genome);
}

/// Decides which genome gets tested next.
///
/// Driven from the embedding application's fixed-step loop: every call to
/// [`SearchDriver::step`] advances the external simulation one tick, checks
/// the trial-completion predicates and, when a trial ends, folds the score
/// into the active search and begins the next trial. Strictly synchronous:
/// one trial at a time, one logical caller.
pub struct SearchDriver<C: SearchCallback> {
    config: AppConfig,
    mode: SearchMode,
    space: CoordinateSpace,
    texture: Option<FitnessTexture>,
    ga: Option<GeneticAlgorithm>,
    genome: Genome,
    best_genome: Genome,
    current_terrain: TerrainDesc,
    step_count: u32,
    terrain_scores: Vec<Score>,
    terrain_index: u32,
    callback: C,
}

impl<C: SearchCallback> SearchDriver<C> {
    pub fn new(config: AppConfig, callback: C) -> Result<Self> {
        config.validate()?;

        let num_genes = config.interpreter.num_enabled();
        let resolution = config.interpreter.resolution;
        let space = CoordinateSpace::new(num_genes, resolution);
        let texture = build_texture(num_genes, resolution);
        let genome = Genome::zeroed(num_genes);
        let current_terrain = config.terrain.clone();

        Ok(Self {
            config,
            mode: SearchMode::Manual,
            space,
            texture,
            ga: None,
            best_genome: genome.clone(),
            genome,
            current_terrain,
            step_count: 0,
            terrain_scores: Vec::new(),
            terrain_index: 0,
            callback,
        })
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn current_genome(&self) -> &Genome {
        &self.genome
    }

    pub fn best_genome(&self) -> &Genome {
        &self.best_genome
    }

    pub fn texture(&self) -> Option<&FitnessTexture> {
        self.texture.as_ref()
    }

    pub fn genetic_algorithm(&self) -> Option<&GeneticAlgorithm> {
        self.ga.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn coordinate_space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    /// Begins the first trial. Call once before stepping.
    pub fn begin(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        self.respawn(sim)
    }

    /// Advances the simulation one tick. When the trial hits a terminal
    /// condition (saturated score, exhausted step budget or a loss
    /// condition), the score is committed and the next trial begins.
    pub fn step(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        if self.mode != SearchMode::Manual {
            self.step_count += 1;
        }

        let status = sim.step_trial();
        let score = calculate_score(status.displacement, sim.track_length());
        self.genome.fitness = score;

        if score == 0
            || score == 255
            || self.step_count > self.config.simulation.steps_per_trial
            || status.failed
        {
            self.on_trial_finished(sim, score)?;
        }
        Ok(())
    }

    /// Switches to manual operation without discarding the current genome.
    pub fn set_manual(&mut self) {
        self.mode = SearchMode::Manual;
        self.reset_terrain_accumulation();
    }

    /// Aborts any in-progress search. The trial in flight is discarded; no
    /// partial fitness is committed.
    pub fn cancel_search(&mut self) {
        self.mode = SearchMode::AutoDrive;
        self.reset_terrain_accumulation();
    }

    /// Starts exhaustive enumeration from the zero coordinate, with a fresh
    /// fitness texture.
    pub fn start_brute_force(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        let num_genes = self.config.interpreter.num_enabled();
        self.genome.reset(num_genes);
        self.best_genome = self.genome.clone();
        self.texture = build_texture(num_genes, self.config.interpreter.resolution);
        self.reset_terrain_accumulation();
        self.current_terrain = self.config.terrain.clone();
        self.mode = SearchMode::BruteForce;
        self.respawn(sim)
    }

    /// Starts the genetic algorithm. Fails if no genes are enabled.
    pub fn start_evolving(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        let desc = GeneticAlgorithmDesc::from(&self.config.genetics);
        let ga = GeneticAlgorithm::new(
            desc,
            self.config.interpreter.num_enabled(),
            self.config.interpreter.resolution,
        )?;

        self.genome = ga.individual(0)?.clone();
        self.best_genome = self.genome.clone();
        self.ga = Some(ga);
        self.reset_terrain_accumulation();
        self.current_terrain = self.config.terrain.clone();
        self.mode = SearchMode::Evolving {
            population_index: 0,
        };
        self.callback.on_status("Evolution in progress...");
        self.respawn(sim)
    }

    /// Tries `num_terrains` terrain seeds with the current genome, looking
    /// for the terrain this car performs best on.
    pub fn start_terrain_search(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        self.best_genome = self.genome.clone();
        self.reset_terrain_accumulation();
        self.current_terrain = self.config.terrain.clone();
        self.mode = SearchMode::TerrainSearch {
            best_seed: self.config.terrain.seed,
            best_score: 0,
        };
        self.respawn(sim)
    }

    /// Flips one gene on or off. This is a configuration-version boundary:
    /// the genome, fitness texture and genetic algorithm built under the old
    /// mask are discarded and any running search is stopped.
    pub fn set_gene_enabled(
        &mut self,
        sim: &mut dyn TrialSim,
        id: GeneId,
        enabled: bool,
    ) -> Result<()> {
        self.config.interpreter.set_enabled(id, enabled);
        self.rebuild_search_space();
        self.respawn(sim)
    }

    /// Changes the quantization granularity. Same rebuild rules as
    /// [`SearchDriver::set_gene_enabled`].
    pub fn set_resolution(&mut self, sim: &mut dyn TrialSim, resolution: u32) -> Result<()> {
        self.config.interpreter.resolution = resolution;
        self.rebuild_search_space();
        self.respawn(sim)
    }

    /// Replaces the current genome, e.g. from a texture cell the user
    /// picked. Stops any running search.
    pub fn set_current_genome(&mut self, sim: &mut dyn TrialSim, genome: Genome) -> Result<()> {
        let num_genes = self.config.interpreter.num_enabled();
        if genome.values.len() != num_genes {
            return Err(CarEvolverError::GenomeMismatch {
                expected: num_genes,
                actual: genome.values.len(),
            });
        }
        if matches!(
            self.mode,
            SearchMode::BruteForce | SearchMode::Evolving { .. } | SearchMode::TerrainSearch { .. }
        ) {
            self.cancel_search();
        }
        self.genome = genome;
        self.respawn(sim)
    }

    /// Forgets every cached fitness value without stopping the search.
    pub fn clear_texture(&mut self) {
        if let Some(texture) = &mut self.texture {
            texture.clear();
        }
    }

    /// Exports the fitness texture as grayscale images, one per depth slice.
    pub fn export_texture(&self, dest_dir: &std::path::Path, name: &str) -> Result<()> {
        match &self.texture {
            Some(texture) => texture.export_images(dest_dir, name),
            None => Err(CarEvolverError::Texture(
                "Too many dimensions to visualize".to_string(),
            )),
        }
    }

    fn rebuild_search_space(&mut self) {
        let num_genes = self.config.interpreter.num_enabled();
        let resolution = self.config.interpreter.resolution;

        self.space = CoordinateSpace::new(num_genes, resolution);
        self.texture = build_texture(num_genes, resolution);
        self.ga = None;
        self.genome.reset(num_genes);
        self.best_genome = self.genome.clone();
        if self.mode != SearchMode::Manual {
            self.mode = SearchMode::AutoDrive;
        }
        self.reset_terrain_accumulation();
    }

    fn reset_terrain_accumulation(&mut self) {
        self.terrain_scores.clear();
        self.terrain_index = 0;
    }

    /// Spawns the next trial for the current genome: resolves gravity
    /// (which may itself be a gene), interprets the genome into a car
    /// design and restarts the external simulation.
    fn respawn(&mut self, sim: &mut dyn TrialSim) -> Result<()> {
        let num_genes = self.config.interpreter.num_enabled();
        if self.genome.values.len() != num_genes {
            self.genome.reset(num_genes);
            self.best_genome = self.genome.clone();
        }
        self.genome.fitness = 0;

        let gravity = self
            .config
            .interpreter
            .world_gravity(&self.genome, self.config.simulation.gravity)?;
        let car = self
            .config
            .interpreter
            .interpret_genome(&self.genome, &self.config.car)?;

        sim.begin_trial(&car, &self.current_terrain, gravity)?;
        self.step_count = 0;
        Ok(())
    }

    fn on_trial_finished(&mut self, sim: &mut dyn TrialSim, score: Score) -> Result<()> {
        // Terrain search re-runs the same genome on a new seed every trial.
        if let SearchMode::TerrainSearch {
            mut best_seed,
            mut best_score,
        } = self.mode
        {
            let base_seed = self.config.terrain.seed;
            if score > best_score {
                best_score = score;
                best_seed = base_seed + self.terrain_index;
            }
            self.terrain_index += 1;

            if self.terrain_index >= self.config.simulation.num_terrains {
                self.callback.on_status(&format!(
                    "Finished testing {} different terrain seeds. Best seed: {}, score={}",
                    self.config.simulation.num_terrains, best_seed, best_score
                ));
                self.current_terrain = self.config.terrain.clone();
                self.current_terrain.seed = best_seed;
                self.mode = SearchMode::AutoDrive;
                self.reset_terrain_accumulation();
            } else {
                self.callback.on_status(&format!(
                    "Testing terrain seeds {}/{}",
                    self.terrain_index, self.config.simulation.num_terrains
                ));
                self.mode = SearchMode::TerrainSearch {
                    best_seed,
                    best_score,
                };
                self.current_terrain = self.config.terrain.clone();
                self.current_terrain.seed = base_seed + self.terrain_index;
            }
            return self.respawn(sim);
        }

        // Average the same car across several terrains before committing a
        // fitness value.
        let mut final_score = score;
        if matches!(
            self.mode,
            SearchMode::BruteForce | SearchMode::Evolving { .. }
        ) && self.config.simulation.multi_terrain_average
            && self.config.simulation.num_terrains > 0
        {
            let num_terrains = self.config.simulation.num_terrains;
            if self.terrain_index == 0 {
                self.terrain_scores.clear();
                self.terrain_scores.resize(num_terrains as usize, 0);
            }
            self.terrain_scores[self.terrain_index as usize] = score;
            self.terrain_index += 1;

            if self.terrain_index >= num_terrains {
                self.terrain_index = 0;
                let sum: f64 = self.terrain_scores.iter().map(|s| *s as f64).sum();
                let average = (sum / self.terrain_scores.len() as f64).round();
                final_score = average.clamp(0.0, 255.0) as Score;
                // Back to the default terrain for the next genome.
                self.current_terrain = self.config.terrain.clone();
            } else {
                // Same genome, next terrain seed.
                self.current_terrain = self.config.terrain.clone();
                self.current_terrain.seed = self.config.terrain.seed + self.terrain_index;
                return self.respawn(sim);
            }
        }

        self.genome.fitness = final_score;
        if final_score > self.best_genome.fitness {
            self.best_genome = self.genome.clone();
        }

        match self.mode {
            SearchMode::BruteForce => {
                if let Some(texture) = &mut self.texture {
                    texture.set_fitness(&self.genome, final_score)?;
                }

                if self.space.is_last_coordinate(&self.genome) {
                    self.callback.on_status("Brute force complete!");
                    self.genome = self.best_genome.clone();
                    self.mode = SearchMode::AutoDrive;
                    let best = self.best_genome.clone();
                    self.callback.on_search_complete(&best);
                } else {
                    self.space.step_to_next_coordinate(&mut self.genome);
                    let current = self.space.index_of(&self.genome) + 1;
                    let total = self.space.total_cells();
                    let progress = (current as f64 / total as f64 * 1000.0) as u64 as f64 * 0.1;
                    self.callback.on_status(&format!(
                        "Brute forcing solution space... {current}/{total} ({progress:.1}%)"
                    ));
                }
                self.respawn(sim)
            }

            SearchMode::Evolving {
                mut population_index,
            } => {
                if let Some(texture) = &mut self.texture {
                    texture.set_fitness(&self.genome, final_score)?;
                }

                let ga = self
                    .ga
                    .as_mut()
                    .ok_or_else(|| CarEvolverError::Search("Evolving without a GA".to_string()))?;
                ga.assign_fitness(population_index, final_score)?;
                population_index += 1;

                if population_index >= ga.population_size() {
                    if ga.current_generation() >= self.config.genetics.num_generations {
                        let generations = ga.current_generation();
                        self.genome = ga.best_individual().clone();
                        self.mode = SearchMode::AutoDrive;
                        self.current_terrain = self.config.terrain.clone();
                        self.callback.on_status(&format!(
                            "Genetic algorithm complete after {generations} generations!"
                        ));
                        let best = self.genome.clone();
                        self.callback.on_search_complete(&best);
                        return self.respawn(sim);
                    }

                    ga.advance_generation()?;
                    let generation = ga.current_generation();
                    let best_fitness = ga.best_individual().fitness;
                    let average_fitness = ga.average_fitness();

                    // Elites kept their fitness from the previous generation;
                    // resume evaluation at the first unassigned member.
                    population_index = 0;
                    while population_index + 1 < ga.population_size()
                        && ga.individual(population_index)?.fitness != 0
                    {
                        population_index += 1;
                    }

                    self.callback
                        .on_generation_complete(generation, best_fitness, average_fitness);
                }

                let ga = self
                    .ga
                    .as_ref()
                    .ok_or_else(|| CarEvolverError::Search("Evolving without a GA".to_string()))?;
                self.genome = ga.individual(population_index)?.clone();
                let generation = ga.current_generation();
                let max_generations = self.config.genetics.num_generations;
                let progress =
                    (generation as f64 / max_generations as f64 * 1000.0) as u64 as f64 * 0.1;
                self.callback.on_status(&format!(
                    "Evolution in progress... Generation {generation}/{max_generations} ({progress:.1}%)"
                ));
                self.mode = SearchMode::Evolving { population_index };
                self.respawn(sim)
            }

            SearchMode::Manual | SearchMode::AutoDrive => self.respawn(sim),

            SearchMode::TerrainSearch { .. } => {
                unreachable!("terrain search trials are handled above")
            }
        }
    }
}

fn build_texture(num_genes: usize, resolution: u32) -> Option<FitnessTexture> {
    let texture = FitnessTexture::new(num_genes, resolution);
    if texture.is_none() && num_genes > 3 {
        log::warn!("{num_genes} genes enabled: too many dimensions to visualize, searching without a fitness texture");
    }
    texture
}
