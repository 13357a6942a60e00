pub mod chain;
pub mod prover;
