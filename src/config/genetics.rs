use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::CarEvolverError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticsConfig {
    pub seed: u64,
    pub population_size: u32,
    /// How many of the fittest individuals are copied unchanged into the
    /// next generation.
    pub elite_count: u32,
    /// Probability that an offspring gets mutated at all.
    pub mutation_rate: f32,
    /// How far (as a fraction of the texture resolution) a gene value can
    /// move in a single mutation.
    pub mutation_strength: f32,
    pub crossover_rate: f32,
    /// Generations to evaluate before the evolving search completes.
    pub num_generations: u32,
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            population_size: 50,
            elite_count: 5,
            mutation_rate: 0.25,
            mutation_strength: 0.125,
            crossover_rate: 0.75,
            num_generations: 100,
        }
    }
}

impl ConfigSection for GeneticsConfig {
    fn section_name() -> &'static str {
        "genetics"
    }

    fn validate(&self) -> Result<(), CarEvolverError> {
        if self.population_size < 1 {
            return Err(CarEvolverError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.elite_count > self.population_size {
            return Err(CarEvolverError::Configuration(
                "Elite count cannot exceed population size".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(CarEvolverError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_strength) {
            return Err(CarEvolverError::Configuration(
                "Mutation strength must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(CarEvolverError::Configuration(
                "Crossover rate must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Genetics".to_string(),
            fields: vec![
                FieldManifest {
                    name: "population_size".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(50),
                    min: Some(1.0),
                    max: Some(10000.0),
                    description: "Number of car designs in the population".to_string(),
                },
                FieldManifest {
                    name: "elite_count".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(5),
                    min: Some(0.0),
                    max: Some(10000.0),
                    description: "Top individuals carried unchanged into the next generation"
                        .to_string(),
                },
                FieldManifest {
                    name: "mutation_rate".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(0.25),
                    min: Some(0.0),
                    max: Some(1.0),
                    description: "Probability that an offspring is mutated".to_string(),
                },
                FieldManifest {
                    name: "mutation_strength".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(0.125),
                    min: Some(0.0),
                    max: Some(1.0),
                    description: "Mutation reach as a fraction of the texture resolution"
                        .to_string(),
                },
                FieldManifest {
                    name: "crossover_rate".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(0.75),
                    min: Some(0.0),
                    max: Some(1.0),
                    description: "Probability that two parents exchange genes".to_string(),
                },
                FieldManifest {
                    name: "num_generations".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(100),
                    min: Some(1.0),
                    max: Some(100000.0),
                    description: "Generations to run before the search completes".to_string(),
                },
            ],
        }
    }
}
