use std::{
    collections::HashSet,
    sync::Mutex,
};

use alloy::primitives::B256;

use crate::{
    adapters::merkle_tree::PoolTree,
    ports::chain::{
        ChainReader,
        DepositEvent,
        OnChainError,
        SyncCursor,
    },
};

struct MockChainState {
    tree: PoolTree,
    events: Vec<DepositEvent>,
    spent_nullifiers: HashSet<B256>,
    current_block: u64,
}

/// In-process stand-in for the pool contract.
///
/// Maintains its own commitment tree so local mirrors can be checked
/// against an independently computed root.
pub struct MockChain {
    state: Mutex<MockChainState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockChainState {
                tree: PoolTree::new(),
                events: Vec::new(),
                spent_nullifiers: HashSet::new(),
                current_block: 0,
            }),
        }
    }

    /// Insert one commitment in a fresh block.
    pub fn submit_deposit(&self, commitment: B256) -> DepositEvent {
        self.submit_deposits_in_block(&[commitment])
            .pop()
            .expect("one commitment submitted")
    }

    /// Insert several commitments in a single block, with consecutive log
    /// indices.
    pub fn submit_deposits_in_block(&self, commitments: &[B256]) -> Vec<DepositEvent> {
        let mut state = self.state.lock().expect("mock chain lock");
        state.current_block += 1;
        let block_number = state.current_block;

        let mut emitted = Vec::with_capacity(commitments.len());
        for (log_index, commitment) in commitments.iter().enumerate() {
            state
                .tree
                .insert(*commitment)
                .expect("mock pool capacity exceeded");
            let event = DepositEvent {
                commitment: *commitment,
                block_number,
                log_index: log_index as u64,
            };
            state.events.push(event);
            emitted.push(event);
        }
        emitted
    }

    pub fn publish_nullifier(&self, nullifier: B256) {
        let mut state = self.state.lock().expect("mock chain lock");
        state.spent_nullifiers.insert(nullifier);
    }

    /// Drop the last `count` events and rebuild the contract tree, as a
    /// chain reorg would.
    pub fn revert_last_events(&self, count: usize) {
        let mut state = self.state.lock().expect("mock chain lock");
        let keep = state.events.len().saturating_sub(count);
        state.events.truncate(keep);
        let leaves: Vec<B256> = state.events.iter().map(|e| e.commitment).collect();
        state.tree = PoolTree::from_leaves(&leaves).expect("rebuild below capacity");
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainReader for MockChain {
    async fn pool_root(&self) -> Result<B256, OnChainError> {
        let state = self.state.lock().expect("mock chain lock");
        Ok(state.tree.root())
    }

    async fn leaf_count(&self) -> Result<u64, OnChainError> {
        let state = self.state.lock().expect("mock chain lock");
        Ok(state.tree.len())
    }

    async fn is_nullifier_spent(&self, nullifier: B256) -> Result<bool, OnChainError> {
        let state = self.state.lock().expect("mock chain lock");
        Ok(state.spent_nullifiers.contains(&nullifier))
    }

    async fn deposit_events(
        &self,
        cursor: SyncCursor,
    ) -> Result<Vec<DepositEvent>, OnChainError> {
        let state = self.state.lock().expect("mock chain lock");
        Ok(state
            .events
            .iter()
            .filter(|e| (e.block_number, e.log_index) >= (cursor.block_number, cursor.log_index))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_ordered_and_cursored() {
        let chain = MockChain::new();
        chain.submit_deposit(B256::repeat_byte(0x01));
        let batch = chain
            .submit_deposits_in_block(&[B256::repeat_byte(0x02), B256::repeat_byte(0x03)]);
        assert_eq!(batch[0].log_index, 0);
        assert_eq!(batch[1].log_index, 1);
        assert_eq!(batch[0].block_number, batch[1].block_number);

        let all = chain.deposit_events(SyncCursor::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let resumed = chain
            .deposit_events(SyncCursor::after(&all[0]))
            .await
            .unwrap();
        assert_eq!(resumed.len(), 2);
        assert_eq!(resumed[0].commitment, B256::repeat_byte(0x02));
    }

    #[tokio::test]
    async fn test_nullifier_tracking() {
        let chain = MockChain::new();
        let nf = B256::repeat_byte(0xAB);
        assert!(!chain.is_nullifier_spent(nf).await.unwrap());
        chain.publish_nullifier(nf);
        assert!(chain.is_nullifier_spent(nf).await.unwrap());
    }

    #[tokio::test]
    async fn test_revert_shrinks_tree() {
        let chain = MockChain::new();
        chain.submit_deposit(B256::repeat_byte(0x01));
        chain.submit_deposit(B256::repeat_byte(0x02));
        let root_before = chain.pool_root().await.unwrap();

        chain.revert_last_events(1);
        assert_eq!(chain.leaf_count().await.unwrap(), 1);
        assert_ne!(chain.pool_root().await.unwrap(), root_before);
    }
}
