use alloy::primitives::{B256, U256};
use thiserror::Error;

use crate::ports::{chain::OnChainError, prover::ProverError};

/// Errors surfaced by the core protocol engine.
///
/// Every expected failure mode maps to a variant here; callers get enough
/// structure (which index, which value, which bound) to render something
/// actionable without parsing strings.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed key material, meta-address string, or an operation that
    /// violates a construction rule (wrong slot counts, asset mix, balance).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Amount exceeds the protocol maximum. Distinct from `InvalidInput`
    /// because the bound is protocol-defined, not a formatting issue.
    #[error("amount {amount} exceeds protocol maximum {max}")]
    AmountOutOfRange { amount: U256, max: U256 },

    /// Leaf capacity exceeded. Fatal for this tree instance; recovery means
    /// migrating to a new pool generation, which happens outside the core.
    #[error("merkle tree is full (capacity {capacity})")]
    TreeFull { capacity: u64 },

    /// Local cached state is inconsistent with the authoritative replay.
    #[error("reconciliation mismatch: {0}")]
    ReconciliationMismatch(String),

    /// A returned public signal differs from the expected value at `index`.
    /// Hard integrity failure: the proof must never be submitted.
    #[error("public signal mismatch at index {index}: expected {expected}, got {got}")]
    ProofSignalMismatch {
        index: usize,
        expected: B256,
        got: B256,
    },

    /// The prover returned the wrong number of public signals.
    #[error("public signal count mismatch: expected {expected}, got {got}")]
    ProofSignalCountMismatch { expected: usize, got: usize },

    /// Local re-verification of a generated proof failed.
    #[error("proof rejected by local verification")]
    ProofRejected,

    /// The proving/verifying/chain collaborator errored or timed out.
    /// Retryable by the caller with backoff.
    #[error("external service failure: {0}")]
    ExternalServiceFailure(String),
}

impl From<ProverError> for CoreError {
    fn from(err: ProverError) -> Self {
        CoreError::ExternalServiceFailure(err.to_string())
    }
}

impl From<OnChainError> for CoreError {
    fn from(err: OnChainError) -> Self {
        CoreError::ExternalServiceFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
