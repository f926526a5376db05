use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::CarEvolverError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Physics steps to simulate before giving up on a car and moving on.
    pub steps_per_trial: u32,
    /// World gravity, used whenever the gravity gene is disabled.
    pub gravity: f32,
    /// How many terrain seeds the search tries, both when hunting for an
    /// optimal terrain and when averaging a car across terrains.
    pub num_terrains: u32,
    /// Score each car on `num_terrains` different terrains and average.
    pub multi_terrain_average: bool,
    pub power_front_wheel: bool,
    pub power_back_wheel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_trial: 700,
            gravity: 80.0,
            num_terrains: 1000,
            multi_terrain_average: false,
            power_front_wheel: false,
            power_back_wheel: true,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), CarEvolverError> {
        if self.steps_per_trial < 1 {
            return Err(CarEvolverError::Configuration(
                "Steps per trial must be at least 1".to_string(),
            ));
        }
        if self.multi_terrain_average && self.num_terrains < 1 {
            return Err(CarEvolverError::Configuration(
                "Multi-terrain averaging needs at least 1 terrain".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Simulation".to_string(),
            fields: vec![
                FieldManifest {
                    name: "steps_per_trial".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(700),
                    min: Some(1.0),
                    max: Some(1000000.0),
                    description: "Physics steps per trial before moving to the next car"
                        .to_string(),
                },
                FieldManifest {
                    name: "gravity".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(80.0),
                    min: Some(0.0),
                    max: Some(1000.0),
                    description: "World gravity when not controlled by a gene".to_string(),
                },
                FieldManifest {
                    name: "num_terrains".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(1000),
                    min: Some(1.0),
                    max: Some(100000.0),
                    description: "Terrain seeds to try when searching or averaging".to_string(),
                },
                FieldManifest {
                    name: "multi_terrain_average".to_string(),
                    field_type: "boolean".to_string(),
                    default: serde_json::json!(false),
                    min: None,
                    max: None,
                    description: "Average each car's score across several terrains".to_string(),
                },
            ],
        }
    }
}
