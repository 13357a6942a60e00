use alloy::primitives::{
    keccak256,
    Bytes,
    B256,
};

use crate::{
    domain::witness::CircuitInputs,
    ports::prover::{
        ProofBundle,
        Prover,
        ProverError,
        Verifier,
    },
};

fn signal_digest(signals: &[B256]) -> B256 {
    let mut preimage = Vec::with_capacity(signals.len() * 32);
    for signal in signals {
        preimage.extend_from_slice(signal.as_slice());
    }
    keccak256(&preimage)
}

/// Prover stand-in: the "proof" is a keccak digest of the public signals.
///
/// No zero-knowledge property whatsoever; it exists so the assembly and
/// validation pipeline can run end to end without a proving backend.
#[derive(Debug, Default, Clone)]
pub struct MockProver;

impl Prover for MockProver {
    async fn prove(&self, inputs: &CircuitInputs) -> Result<ProofBundle, ProverError> {
        let public_signals = inputs.public.to_vec(inputs.system);
        let proof = Bytes::copy_from_slice(signal_digest(&public_signals).as_slice());
        Ok(ProofBundle {
            proof,
            public_signals,
        })
    }
}

/// Counterpart to [`MockProver`]: accepts a bundle iff its proof is the
/// digest of its signals.
#[derive(Debug, Default, Clone)]
pub struct MockVerifier;

impl Verifier for MockVerifier {
    async fn verify(&self, bundle: &ProofBundle) -> Result<bool, ProverError> {
        let expected = signal_digest(&bundle.public_signals);
        Ok(bundle.proof.as_ref() == expected.as_slice())
    }
}
