pub mod coordinate_space;
pub mod fitness_texture;
pub mod progress;
pub mod search;
pub mod trial;

pub use coordinate_space::CoordinateSpace;
pub use fitness_texture::FitnessTexture;
pub use progress::{HistoryProgress, LogProgress};
pub use search::{SearchCallback, SearchDriver, SearchMode};
pub use trial::{calculate_score, Score, TrialSim, TrialStatus};
