use alloy::primitives::{
    Address,
    B256,
    U256,
};
use rand::Rng;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crypto::poseidon::{
        poseidon2,
        poseidon5,
    },
    domain::{
        commitment::Commitment,
        keys::SpendingKey,
        nullifier::Nullifier,
    },
    error::{
        CoreError,
        Result,
    },
};

/// Protocol maximum note amount: 2^64 - 1 raw token units.
pub fn max_note_amount() -> U256 {
    U256::from(u64::MAX)
}

/// Multi-asset identifier: asset_id = poseidon2(chain_id, token_address).
pub fn asset_id(chain_id: u64, token: Address) -> B256 {
    poseidon2(
        B256::from(U256::from(chain_id)),
        B256::left_padding_from(token.as_slice()),
    )
}

/// A note is the UTXO primitive of the shielded pool: a private balance
/// bound to an owner commitment. Its fields are bearer secrets; anyone who
/// learns them can spend the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Owner commitment, poseidon1(spending_key). Distinct from any
    /// stealth address: this identity lives inside the shielded model.
    pub owner: B256,
    /// Token amount (raw units), bounded by the protocol maximum.
    pub amount: U256,
    /// poseidon2(chain_id, token_address)
    pub asset_id: B256,
    /// Deployment chain id; blocks cross-chain replay of proofs.
    pub chain_id: u64,
    /// Fresh random field element making the commitment hiding.
    pub blinding: B256,
}

impl Note {
    /// Create a note with a fresh random blinding.
    pub fn new(owner: B256, amount: U256, asset_id: B256, chain_id: u64) -> Result<Self> {
        Self::with_blinding(owner, amount, asset_id, chain_id, random_blinding())
    }

    /// Create a note with a specific blinding (reconstruction or testing).
    pub fn with_blinding(
        owner: B256,
        amount: U256,
        asset_id: B256,
        chain_id: u64,
        blinding: B256,
    ) -> Result<Self> {
        if amount > max_note_amount() {
            return Err(CoreError::AmountOutOfRange {
                amount,
                max: max_note_amount(),
            });
        }
        Ok(Self {
            owner,
            amount,
            asset_id,
            chain_id,
            blinding,
        })
    }

    /// The canonical all-zero note used to pad unused input/output slots
    /// so the circuit always sees a fixed 2-in/2-out shape.
    pub fn dummy() -> Self {
        Self {
            owner: B256::ZERO,
            amount: U256::ZERO,
            asset_id: B256::ZERO,
            chain_id: 0,
            blinding: B256::ZERO,
        }
    }

    /// Whether this is the canonical dummy note.
    pub fn is_dummy(&self) -> bool {
        self == &Self::dummy()
    }

    /// Compute the commitment for this note.
    /// commitment = poseidon5(owner, amount, asset_id, chain_id, blinding)
    pub fn commitment(&self) -> Commitment {
        Commitment(poseidon5(
            self.owner,
            B256::from(self.amount),
            self.asset_id,
            B256::from(U256::from(self.chain_id)),
            self.blinding,
        ))
    }

    /// Compute the nullifier for this note given the spending key.
    pub fn nullifier(&self, spending_key: &SpendingKey) -> Nullifier {
        self.commitment().nullifier(spending_key)
    }
}

fn random_blinding() -> B256 {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes[5..]); // keep within the field
    B256::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_note(blinding: B256) -> Note {
        Note::with_blinding(
            B256::repeat_byte(0x0A),
            U256::from(1000u64),
            asset_id(1, Address::repeat_byte(0x11)),
            1,
            blinding,
        )
        .unwrap()
    }

    #[test]
    fn test_commitment_deterministic() {
        let note = test_note(B256::repeat_byte(0x05));
        assert_eq!(note.commitment(), note.commitment());
    }

    #[test]
    fn test_commitment_hiding_via_blinding() {
        // Same fields, different blinding: different commitments.
        let n1 = test_note(B256::repeat_byte(0x05));
        let n2 = test_note(B256::repeat_byte(0x06));
        assert_ne!(n1.commitment(), n2.commitment());
    }

    #[test]
    fn test_fresh_blindings_differ() {
        let owner = B256::repeat_byte(0x0A);
        let asset = asset_id(1, Address::ZERO);
        let n1 = Note::new(owner, U256::from(7u64), asset, 1).unwrap();
        let n2 = Note::new(owner, U256::from(7u64), asset, 1).unwrap();
        assert_ne!(n1.blinding, n2.blinding);
        assert_ne!(n1.commitment(), n2.commitment());
    }

    #[test]
    fn test_amount_bound_enforced() {
        let over = U256::from(u64::MAX) + U256::from(1u64);
        let err = Note::new(B256::ZERO, over, B256::ZERO, 1).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));

        // the bound itself is allowed
        assert!(Note::new(B256::ZERO, U256::from(u64::MAX), B256::ZERO, 1).is_ok());
    }

    #[test]
    fn test_dummy_note_is_all_zero() {
        let dummy = Note::dummy();
        assert!(dummy.is_dummy());
        // its commitment is poseidon5 over all-zero inputs, not zero itself
        assert_ne!(dummy.commitment().0, B256::ZERO);
    }

    #[test]
    fn test_asset_id_separates_chains_and_tokens() {
        let token = Address::repeat_byte(0x11);
        assert_ne!(asset_id(1, token), asset_id(10, token));
        assert_ne!(asset_id(1, token), asset_id(1, Address::repeat_byte(0x12)));
    }

    #[test]
    fn test_chain_id_bound_into_commitment() {
        let n1 = test_note(B256::repeat_byte(0x05));
        let mut n2 = n1.clone();
        n2.chain_id = 10;
        assert_ne!(n1.commitment(), n2.commitment());
    }
}
