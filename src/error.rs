use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarEvolverError {
    #[error("Invalid gene: {0}")]
    InvalidGene(String),

    #[error("Genome mismatch: expected {expected} values, got {actual}")]
    GenomeMismatch { expected: usize, actual: usize },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CarEvolverError>;
