pub mod genetics;
pub mod manager;
pub mod simulation;
pub mod traits;

pub use genetics::GeneticsConfig;
pub use manager::{AppConfig, ConfigManager};
pub use simulation::SimulationConfig;
