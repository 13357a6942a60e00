use alloy::primitives::{
    B256,
    U256,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crypto::poseidon::field_encode_amount,
    domain::{
        keys::SpendingKey,
        merkle::MerkleProof,
        note::Note,
        operation::Operation,
    },
    error::{
        CoreError,
        Result,
    },
    ports::prover::{
        ProofBundle,
        Verifier,
    },
};

/// Which proving backend the pool contract verifies against.
///
/// `ConstantSize` appends the chain id as an explicit public signal; the
/// Groth16 deployment bakes it into the verifying key instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofSystem {
    Groth16,
    ConstantSize,
}

/// The ordered public signals of the 2-in/2-out circuit.
///
/// Flattened order is fixed by the verifier contract:
/// `[merkleRoot, nullifier0, nullifier1, outCommitment0, outCommitment1,
/// publicAmount, publicAsset, recipient (, chainId)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    pub merkle_root: B256,
    pub nullifiers: [B256; 2],
    pub output_commitments: [B256; 2],
    /// Field-encoded signed amount: `p - x` for a withdrawal of `x`.
    pub public_amount: B256,
    pub public_asset: B256,
    /// Withdrawal recipient, left-padded to 32 bytes; zero otherwise.
    pub recipient: B256,
    pub chain_id: u64,
}

impl PublicSignals {
    /// Flatten into the contract's signal order for the given backend.
    pub fn to_vec(&self, system: ProofSystem) -> Vec<B256> {
        let mut signals = vec![
            self.merkle_root,
            self.nullifiers[0],
            self.nullifiers[1],
            self.output_commitments[0],
            self.output_commitments[1],
            self.public_amount,
            self.public_asset,
            self.recipient,
        ];
        if system == ProofSystem::ConstantSize {
            signals.push(B256::from(U256::from(self.chain_id)));
        }
        signals
    }
}

/// Private circuit inputs. The spending key travels as its big-endian
/// scalar bytes, the same form the nullifier hash consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateWitness {
    pub spending_key: B256,
    pub input_notes: [Note; 2],
    pub output_notes: [Note; 2],
    pub input_proofs: [MerkleProof; 2],
}

/// Everything an external prover needs for one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitInputs {
    pub system: ProofSystem,
    pub public: PublicSignals,
    pub private: PrivateWitness,
}

/// Assemble prover inputs for a validated operation.
///
/// `input_proofs` carries one membership proof per real input note, in
/// slot order. Every real input is checked for ownership under
/// `spending_key` and its proof re-verified against `merkle_root` before
/// anything is handed to the prover; dummy slots get a zero nullifier and
/// an all-zero path.
pub fn build_inputs(
    spending_key: &SpendingKey,
    operation: &Operation,
    input_proofs: Vec<MerkleProof>,
    merkle_root: B256,
    system: ProofSystem,
) -> Result<CircuitInputs> {
    operation.check_balance()?;

    let real_count = operation.real_inputs().count();
    if input_proofs.len() != real_count {
        return Err(CoreError::InvalidInput(format!(
            "expected {real_count} input proofs, got {}",
            input_proofs.len()
        )));
    }

    let owner = spending_key.owner();
    let mut proofs = input_proofs.into_iter();
    let mut nullifiers = [B256::ZERO; 2];
    let mut slot_proofs = [MerkleProof::dummy(), MerkleProof::dummy()];

    for (slot, note) in operation.inputs.iter().enumerate() {
        if note.is_dummy() {
            continue;
        }
        if note.owner != owner {
            return Err(CoreError::InvalidInput(format!(
                "input note in slot {slot} is not owned by the spending key"
            )));
        }
        let proof = proofs.next().expect("proof count checked above");
        let commitment = note.commitment();
        if !proof.verify(commitment.0, merkle_root) {
            return Err(CoreError::InvalidInput(format!(
                "membership proof for slot {slot} does not match the root"
            )));
        }
        nullifiers[slot] = note.nullifier(spending_key).0;
        slot_proofs[slot] = proof;
    }

    let public = PublicSignals {
        merkle_root,
        nullifiers,
        output_commitments: [
            operation.outputs[0].commitment().0,
            operation.outputs[1].commitment().0,
        ],
        public_amount: field_encode_amount(operation.public_amount),
        public_asset: operation.public_asset,
        recipient: B256::left_padding_from(operation.recipient.as_slice()),
        chain_id: operation.chain_id,
    };

    Ok(CircuitInputs {
        system,
        public,
        private: PrivateWitness {
            spending_key: spending_key.to_b256(),
            input_notes: operation.inputs.clone(),
            output_notes: operation.outputs.clone(),
            input_proofs: slot_proofs,
        },
    })
}

/// Compare a bundle's signals against the locally expected set,
/// positionally. The first diverging position is reported; submitting a
/// bundle with mismatched signals would burn gas on a guaranteed revert.
pub fn check_signals(
    bundle: &ProofBundle,
    expected: &PublicSignals,
    system: ProofSystem,
) -> Result<()> {
    let expected = expected.to_vec(system);
    if bundle.public_signals.len() != expected.len() {
        return Err(CoreError::ProofSignalCountMismatch {
            expected: expected.len(),
            got: bundle.public_signals.len(),
        });
    }
    for (index, (want, got)) in expected.iter().zip(&bundle.public_signals).enumerate() {
        if want != got {
            return Err(CoreError::ProofSignalMismatch {
                index,
                expected: *want,
                got: *got,
            });
        }
    }
    Ok(())
}

/// Full local gate before submission: signal check, then cryptographic
/// re-verification of the proof itself.
pub async fn validate_bundle<V: Verifier>(
    bundle: &ProofBundle,
    expected: &PublicSignals,
    system: ProofSystem,
    verifier: &V,
) -> Result<()> {
    check_signals(bundle, expected, system)?;
    if !verifier.verify(bundle).await? {
        return Err(CoreError::ProofRejected);
    }
    Ok(())
}
