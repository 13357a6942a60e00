use alloy::primitives::B256;
use serde::{
    Deserialize,
    Serialize,
};

use crate::crypto::poseidon::poseidon2;

/// Fixed depth of the commitment tree: 2^20 (~1.05M) leaf capacity.
pub const TREE_DEPTH: usize = 20;

/// Membership proof for a leaf in the commitment tree.
///
/// Wire format: `path_elements` is an ordered array of `TREE_DEPTH` field
/// elements in leaf-to-root order; `path_indices` the matching left/right
/// bits (0 = leaf side is left, 1 = right), the bit pattern of the leaf
/// index from LSB up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub path_elements: Vec<B256>,
    pub path_indices: Vec<u8>,
    pub leaf_index: u64,
}

impl MerkleProof {
    pub fn new(path_elements: Vec<B256>, path_indices: Vec<u8>, leaf_index: u64) -> Self {
        Self {
            path_elements,
            path_indices,
            leaf_index,
        }
    }

    /// All-zero proof used for the dummy input slots of a padded operation.
    pub fn dummy() -> Self {
        Self {
            path_elements: vec![B256::ZERO; TREE_DEPTH],
            path_indices: vec![0; TREE_DEPTH],
            leaf_index: 0,
        }
    }

    /// Fold the path over a leaf to recompute the implied root.
    pub fn compute_root(&self, leaf: B256) -> B256 {
        let mut node = leaf;
        for (element, index) in self.path_elements.iter().zip(&self.path_indices) {
            node = if *index == 0 {
                poseidon2(node, *element)
            } else {
                poseidon2(*element, node)
            };
        }
        node
    }

    /// Check the path against a known root.
    pub fn verify(&self, leaf: B256, root: B256) -> bool {
        self.path_elements.len() == TREE_DEPTH
            && self.path_indices.len() == TREE_DEPTH
            && self.compute_root(leaf) == root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_proof_shape() {
        let proof = MerkleProof::dummy();
        assert_eq!(proof.path_elements.len(), TREE_DEPTH);
        assert_eq!(proof.path_indices.len(), TREE_DEPTH);
        assert!(proof.path_elements.iter().all(|e| *e == B256::ZERO));
    }

    #[test]
    fn test_verify_rejects_truncated_path() {
        let mut proof = MerkleProof::dummy();
        proof.path_elements.pop();
        assert!(!proof.verify(B256::ZERO, proof.compute_root(B256::ZERO)));
    }

    #[test]
    fn test_index_bit_changes_root() {
        let mut proof = MerkleProof::dummy();
        proof.path_elements[0] = B256::repeat_byte(0x01);
        let left_root = proof.compute_root(B256::repeat_byte(0x02));
        proof.path_indices[0] = 1;
        let right_root = proof.compute_root(B256::repeat_byte(0x02));
        assert_ne!(left_root, right_root);
    }
}
