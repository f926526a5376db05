use anyhow::Context;
use carevolver::config::ConfigManager;
use carevolver::engines::evaluation::{LogProgress, SearchDriver, SearchMode, TrialSim, TrialStatus};
use carevolver::engines::generation::GeneId;
use carevolver::types::{CarDesc, TerrainDesc};
use std::path::Path;

const CONFIG_PATH: &str = "carevolver.toml";
const SAVED_IMAGES_DIR: &str = "saved-images";

/// Crude kinematic stand-in for the external physics engine, so the search
/// can be demonstrated headless. Wheel geometry, friction and gravity
/// combine into a per-step speed; badly balanced designs tip over early.
struct RolloutModel {
    position: f32,
    speed: f32,
    tips_over_at: Option<f32>,
    track_length: f32,
}

impl RolloutModel {
    fn new() -> Self {
        Self {
            position: 0.0,
            speed: 0.0,
            tips_over_at: None,
            track_length: 1.0,
        }
    }
}

impl TrialSim for RolloutModel {
    fn begin_trial(
        &mut self,
        car: &CarDesc,
        terrain: &TerrainDesc,
        gravity: f32,
    ) -> carevolver::Result<()> {
        self.track_length = terrain.num_chunks as f32 * terrain.max_chunk_width / terrain.scale;

        // Bigger wheels and more grip go faster, up to a point; heavy
        // gravity on rough terrain slows everything down.
        let wheel = (car.wheel0_radius + car.wheel1_radius) * 0.5;
        let grip = (car.wheel_friction / 20.0).min(1.0);
        let roughness = 1.0 + (terrain.seed % 7) as f32 * 0.05;
        self.speed = wheel * grip * 60.0 / (roughness * (gravity / 80.0).max(0.1));
        self.position = 0.0;

        // Wheels wider than their track are unstable and flip partway in.
        let span = (car.wheel1_pos.x - car.wheel0_pos.x).abs().max(0.1);
        self.tips_over_at = if wheel * 2.0 > span {
            Some(self.track_length * 0.2)
        } else {
            None
        };
        Ok(())
    }

    fn step_trial(&mut self) -> TrialStatus {
        self.position += self.speed;
        let failed = self
            .tips_over_at
            .map(|limit| self.position >= limit)
            .unwrap_or(false);
        TrialStatus {
            displacement: self.position,
            failed,
        }
    }

    fn track_length(&self) -> f32 {
        self.track_length
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if Path::new(CONFIG_PATH).exists() {
        manager
            .load_from_file(CONFIG_PATH)
            .with_context(|| format!("loading {CONFIG_PATH}"))?;
    } else {
        manager.update(|config| {
            config.interpreter.resolution = 32;
            config.genetics.population_size = 20;
            config.genetics.num_generations = 10;
            config.simulation.steps_per_trial = 200;
        })?;
        manager
            .save_to_file(CONFIG_PATH)
            .with_context(|| format!("writing {CONFIG_PATH}"))?;
        log::info!("Wrote default config to {CONFIG_PATH}");
    }

    manager.update(|config| {
        config
            .interpreter
            .set_enabled(GeneId::Wheel0Radius, true);
        config
            .interpreter
            .set_enabled(GeneId::WheelFriction, true);
    })?;

    let mut sim = RolloutModel::new();
    let mut driver = SearchDriver::new(manager.get(), LogProgress)?;

    driver.start_evolving(&mut sim)?;
    while !matches!(driver.mode(), SearchMode::AutoDrive) {
        driver.step(&mut sim)?;
    }

    let best = driver.best_genome();
    log::info!("Best design found: {best}");

    driver
        .export_texture(Path::new(SAVED_IMAGES_DIR), "fitness")
        .context("exporting fitness texture")?;

    Ok(())
}
