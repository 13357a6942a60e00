use alloy::primitives::{
    Bytes,
    B256,
};
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::domain::witness::CircuitInputs;

/// Errors that can occur during proof generation or verification.
#[derive(Debug, Error)]
pub enum ProverError {
    #[error("Witness generation failed: {0}")]
    WitnessError(String),

    #[error("Proof generation failed: {0}")]
    ProofGenerationError(String),

    #[error("Proof verification failed: {0}")]
    VerificationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// An opaque proof plus the public signals it was produced against, exactly
/// as the pool contract expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Proving-system specific blob, passed through unmodified.
    pub proof: Bytes,
    /// Ordered public signals, 32-byte big-endian field elements.
    pub public_signals: Vec<B256>,
}

/// Trait for generating ZK proofs for pool operations.
///
/// Implementations may shell out to external provers or use in-process
/// proving libraries; this crate never interprets the proof bytes.
pub trait Prover: Send + Sync {
    /// Generate a proof for an assembled 2-in/2-out operation.
    fn prove(
        &self,
        inputs: &CircuitInputs,
    ) -> impl core::future::Future<Output = Result<ProofBundle, ProverError>>;
}

/// Trait for verifying proof bundles before they are submitted on-chain.
pub trait Verifier: Send + Sync {
    /// Verify a bundle against its embedded public signals.
    fn verify(
        &self,
        bundle: &ProofBundle,
    ) -> impl core::future::Future<Output = Result<bool, ProverError>>;
}
