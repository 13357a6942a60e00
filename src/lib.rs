//! Privacy layer for account-based payments: stealth addresses for
//! unlinkable receiving, a Poseidon-commitment shielded pool for private
//! balances, a local mirror of the on-chain commitment tree, and prover
//! input assembly for the pool's ZK circuits.
//!
//! The crate is organised hexagonally:
//! - [`crypto`]: curve and hash primitives (secp256k1 ECDH, Poseidon,
//!   key derivation)
//! - [`domain`]: keys, stealth payments, notes, operations, witnesses
//! - [`ports`]: traits for the chain and the proving backend
//! - [`adapters`]: the local commitment tree, note store, reconciliation,
//!   and in-process mocks

pub mod adapters;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::PoolConfig;
pub use domain::{
    keys::{
        KeyPair,
        MetaAddress,
        SpendingKey,
        ViewingKey,
    },
    merkle::TREE_DEPTH,
    note::Note,
    operation::{
        Operation,
        OperationKind,
    },
    witness::ProofSystem,
};
pub use error::{
    CoreError,
    Result,
};
