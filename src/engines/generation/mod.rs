pub mod genetic_algorithm;
pub mod genome;
pub mod interpreter;
pub mod operators;

pub use genetic_algorithm::{GeneticAlgorithm, GeneticAlgorithmDesc};
pub use genome::Genome;
pub use interpreter::{GeneBinding, GeneId, GeneInterpreter, NUM_GENE_IDS};
