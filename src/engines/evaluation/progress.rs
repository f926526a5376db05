use super::search::SearchCallback;
use crate::engines::generation::genome::Genome;

/// Callback that forwards search progress to the log.
pub struct LogProgress;

impl SearchCallback for LogProgress {
    fn on_status(&mut self, status: &str) {
        log::info!("{status}");
    }

    fn on_generation_complete(&mut self, generation: u32, best_fitness: u8, average_fitness: f32) {
        log::info!(
            "Generation {generation} complete. Best fitness: {best_fitness}, average: {average_fitness:.2}"
        );
    }

    fn on_search_complete(&mut self, best: &Genome) {
        log::info!("Search complete. Best individual: {best}");
    }
}

/// Callback that keeps per-generation fitness history around, e.g. for an
/// embedding UI to plot.
#[derive(Default)]
pub struct HistoryProgress {
    pub statuses: Vec<String>,
    pub best_fitness: Vec<f32>,
    pub average_fitness: Vec<f32>,
    pub completed: Option<Genome>,
}

impl SearchCallback for HistoryProgress {
    fn on_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }

    fn on_generation_complete(&mut self, _generation: u32, best_fitness: u8, average_fitness: f32) {
        self.best_fitness.push(best_fitness as f32);
        self.average_fitness.push(average_fitness);
    }

    fn on_search_complete(&mut self, best: &Genome) {
        self.completed = Some(best.clone());
    }
}
