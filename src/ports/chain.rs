use alloy::primitives::B256;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// A commitment-insertion event emitted by the pool contract.
///
/// `(block_number, log_index)` is the canonical ordering key; the local
/// tree must replay events in exactly this order to reproduce the
/// contract's root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub commitment: B256,
    pub block_number: u64,
    pub log_index: u64,
}

/// Resume point for incremental event fetching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    pub block_number: u64,
    pub log_index: u64,
}

impl SyncCursor {
    /// Cursor positioned just after `event`.
    pub fn after(event: &DepositEvent) -> Self {
        Self {
            block_number: event.block_number,
            log_index: event.log_index + 1,
        }
    }
}

/// Errors that can occur during on-chain interactions.
#[derive(Debug, Error)]
pub enum OnChainError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout waiting for response")]
    Timeout,
}

/// Read access to the pool contract's published state.
///
/// Abstracts the Ethereum RPC layer; clients maintain local trees from the
/// event stream and only cross-check roots and nullifier status here.
pub trait ChainReader: Send + Sync {
    /// Current commitment tree root published by the pool.
    fn pool_root(&self) -> impl core::future::Future<Output = Result<B256, OnChainError>>;

    /// Number of commitments inserted so far.
    fn leaf_count(&self) -> impl core::future::Future<Output = Result<u64, OnChainError>>;

    /// Whether a nullifier has been published (note spent).
    fn is_nullifier_spent(
        &self,
        nullifier: B256,
    ) -> impl core::future::Future<Output = Result<bool, OnChainError>>;

    /// Commitment-insertion events at or after `cursor`, in canonical
    /// `(block_number, log_index)` order.
    fn deposit_events(
        &self,
        cursor: SyncCursor,
    ) -> impl core::future::Future<Output = Result<Vec<DepositEvent>, OnChainError>>;
}
