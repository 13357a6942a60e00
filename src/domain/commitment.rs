use alloy::primitives::B256;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crypto::poseidon::poseidon2,
    domain::{
        keys::SpendingKey,
        nullifier::Nullifier,
    },
};

/// The public, hiding and binding representation of a note, inserted as a
/// Merkle leaf. Wire format: 32-byte big-endian field element.
/// commitment = poseidon5(owner, amount, asset_id, chain_id, blinding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub B256);

impl Commitment {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(B256::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_ref()
    }

    /// Compute the nullifier for this commitment given the spending key.
    pub fn nullifier(&self, spending_key: &SpendingKey) -> Nullifier {
        Nullifier(poseidon2(self.0, spending_key.to_b256()))
    }
}

impl From<B256> for Commitment {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Commitment> for B256 {
    fn from(value: Commitment) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::stealth::random_scalar;

    #[test]
    fn test_nullifier_deterministic() {
        let commitment = Commitment(B256::repeat_byte(0x42));
        let sk = SpendingKey::from_scalar(random_scalar()).unwrap();
        assert_eq!(commitment.nullifier(&sk), commitment.nullifier(&sk));
    }

    #[test]
    fn test_nullifier_differs_per_key() {
        let commitment = Commitment(B256::repeat_byte(0x42));
        let sk1 = SpendingKey::from_scalar(random_scalar()).unwrap();
        let sk2 = SpendingKey::from_scalar(random_scalar()).unwrap();
        assert_ne!(commitment.nullifier(&sk1), commitment.nullifier(&sk2));
    }

    #[test]
    fn test_nullifier_differs_per_commitment() {
        let sk = SpendingKey::from_scalar(random_scalar()).unwrap();
        let c1 = Commitment(B256::repeat_byte(0x01));
        let c2 = Commitment(B256::repeat_byte(0x02));
        assert_ne!(c1.nullifier(&sk), c2.nullifier(&sk));
    }
}
