use super::{genetics::GeneticsConfig, simulation::SimulationConfig, traits::ConfigSection};
use crate::engines::generation::interpreter::GeneInterpreter;
use crate::error::CarEvolverError;
use crate::types::{CarDesc, TerrainDesc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub genetics: GeneticsConfig,
    pub simulation: SimulationConfig,
    pub interpreter: GeneInterpreter,
    /// Field values for every gene that is disabled.
    pub car: CarDesc,
    /// Base terrain; searches derive seed variations from it.
    pub terrain: TerrainDesc,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), CarEvolverError> {
        self.genetics.validate()?;
        self.simulation.validate()?;
        self.interpreter.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CarEvolverError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CarEvolverError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| CarEvolverError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.config.write().unwrap() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CarEvolverError> {
        let config = self.config.read().unwrap();
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| CarEvolverError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| CarEvolverError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), CarEvolverError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap();
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}
