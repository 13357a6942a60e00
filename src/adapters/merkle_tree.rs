use std::sync::OnceLock;

use alloy::primitives::B256;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crypto::poseidon::poseidon2,
    domain::merkle::{
        MerkleProof,
        TREE_DEPTH,
    },
    error::{
        CoreError,
        Result,
    },
    ports::chain::SyncCursor,
};

/// Precomputed subtree hashes of the empty tree, indexed by level.
/// zeros[0] = 0, zeros[i + 1] = poseidon2(zeros[i], zeros[i]).
fn zero_hashes() -> &'static [B256; TREE_DEPTH + 1] {
    static ZEROS: OnceLock<[B256; TREE_DEPTH + 1]> = OnceLock::new();
    ZEROS.get_or_init(|| {
        let mut zeros = [B256::ZERO; TREE_DEPTH + 1];
        for level in 0..TREE_DEPTH {
            zeros[level + 1] = poseidon2(zeros[level], zeros[level]);
        }
        zeros
    })
}

/// Serializable tree state: the leaves are sufficient to rebuild every
/// level, the cursor records how far the event stream was consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub depth: usize,
    pub leaves: Vec<B256>,
    pub cursor: SyncCursor,
}

/// Local mirror of the on-chain commitment tree.
///
/// Fixed depth with zero-padded empty slots, matching the contract's
/// incremental tree byte for byte. Only occupied nodes are stored; empty
/// subtrees resolve through the precomputed zero-hash table, so an almost
/// empty depth-20 tree costs almost nothing.
#[derive(Debug, Clone)]
pub struct PoolTree {
    /// levels[0] are the leaves, levels[TREE_DEPTH] is the root level.
    levels: Vec<Vec<B256>>,
    cursor: SyncCursor,
}

impl PoolTree {
    pub fn new() -> Self {
        Self {
            levels: vec![Vec::new(); TREE_DEPTH + 1],
            cursor: SyncCursor::default(),
        }
    }

    /// Rebuild a tree by inserting `leaves` in order.
    pub fn from_leaves(leaves: &[B256]) -> Result<Self> {
        let mut tree = Self::new();
        for leaf in leaves {
            tree.insert(*leaf)?;
        }
        Ok(tree)
    }

    pub fn len(&self) -> u64 {
        self.levels[0].len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    pub fn capacity() -> u64 {
        1u64 << TREE_DEPTH
    }

    pub fn leaves(&self) -> &[B256] {
        &self.levels[0]
    }

    pub fn cursor(&self) -> SyncCursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: SyncCursor) {
        self.cursor = cursor;
    }

    /// The node at `(level, index)`, falling back to the empty-subtree hash.
    fn node(&self, level: usize, index: u64) -> B256 {
        self.levels[level]
            .get(index as usize)
            .copied()
            .unwrap_or(zero_hashes()[level])
    }

    pub fn root(&self) -> B256 {
        self.node(TREE_DEPTH, 0)
    }

    /// Append a leaf and recompute the path to the root. Returns the leaf
    /// index.
    pub fn insert(&mut self, leaf: B256) -> Result<u64> {
        let index = self.len();
        if index >= Self::capacity() {
            return Err(CoreError::TreeFull {
                capacity: Self::capacity(),
            });
        }
        self.levels[0].push(leaf);

        let mut current = index;
        for level in 0..TREE_DEPTH {
            let left = current & !1;
            let parent = poseidon2(self.node(level, left), self.node(level, left + 1));
            let parent_index = (current / 2) as usize;
            if parent_index == self.levels[level + 1].len() {
                self.levels[level + 1].push(parent);
            } else {
                self.levels[level + 1][parent_index] = parent;
            }
            current /= 2;
        }
        Ok(index)
    }

    /// Membership proof for the leaf at `leaf_index` against the current
    /// root.
    pub fn proof(&self, leaf_index: u64) -> Result<MerkleProof> {
        if leaf_index >= self.len() {
            return Err(CoreError::InvalidInput(format!(
                "leaf index {leaf_index} out of bounds (tree has {} leaves)",
                self.len()
            )));
        }

        let mut path_elements = Vec::with_capacity(TREE_DEPTH);
        let mut path_indices = Vec::with_capacity(TREE_DEPTH);
        let mut current = leaf_index;
        for level in 0..TREE_DEPTH {
            let is_right = (current & 1) as u8;
            let sibling = if is_right == 1 { current - 1 } else { current + 1 };
            path_elements.push(self.node(level, sibling));
            path_indices.push(is_right);
            current /= 2;
        }
        Ok(MerkleProof::new(path_elements, path_indices, leaf_index))
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            depth: TREE_DEPTH,
            leaves: self.levels[0].clone(),
            cursor: self.cursor,
        }
    }

    pub fn restore(snapshot: &TreeSnapshot) -> Result<Self> {
        if snapshot.depth != TREE_DEPTH {
            return Err(CoreError::InvalidInput(format!(
                "snapshot depth {} does not match tree depth {TREE_DEPTH}",
                snapshot.depth
            )));
        }
        let mut tree = Self::from_leaves(&snapshot.leaves)?;
        tree.cursor = snapshot.cursor;
        Ok(tree)
    }
}

impl Default for PoolTree {
    fn default() -> Self {
        Self::new()
    }
}
