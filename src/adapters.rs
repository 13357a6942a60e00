pub mod memory_store;
pub mod merkle_tree;
pub mod mock_chain;
pub mod mock_prover;
pub mod reconcile;
