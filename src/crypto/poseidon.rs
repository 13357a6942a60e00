use alloy::primitives::B256;
use ark_bn254::Fr;
use ark_ff::{
    BigInteger,
    PrimeField,
};
use light_poseidon::{
    Poseidon,
    PoseidonHasher,
};

/// Convert B256 to BN254 field element.
pub fn b256_to_fr(value: B256) -> Fr {
    Fr::from_be_bytes_mod_order(value.as_ref())
}

/// Convert BN254 field element to B256.
pub fn fr_to_b256(value: Fr) -> B256 {
    let big_int = value.into_bigint();
    let bytes = big_int.to_bytes_be();
    B256::from_slice(&bytes)
}

fn hash_n(inputs: &[Fr]) -> B256 {
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .expect("Failed to create Poseidon hasher");
    let result = hasher
        .hash(inputs)
        .expect("Failed to compute Poseidon hash");
    fr_to_b256(result)
}

/// Poseidon hash with 1 input.
/// Used for: owner = poseidon1(spending_key)
pub fn poseidon1(a: B256) -> B256 {
    hash_n(&[b256_to_fr(a)])
}

/// Poseidon hash with 2 inputs.
/// Used for:
/// - nullifier = poseidon2(commitment, spending_key)
/// - merkle_node = poseidon2(left, right)
/// - asset_id = poseidon2(chain_id, token_address)
pub fn poseidon2(a: B256, b: B256) -> B256 {
    hash_n(&[b256_to_fr(a), b256_to_fr(b)])
}

/// Poseidon hash with 5 inputs.
/// Used for: commitment = poseidon5(owner, amount, asset_id, chain_id, blinding)
pub fn poseidon5(a: B256, b: B256, c: B256, d: B256, e: B256) -> B256 {
    hash_n(&[
        b256_to_fr(a),
        b256_to_fr(b),
        b256_to_fr(c),
        b256_to_fr(d),
        b256_to_fr(e),
    ])
}

/// Encode a signed public amount as a BN254 field element.
///
/// Withdrawals carry a conceptually negative public amount; the circuit
/// convention represents `-x` as `p - x` in the field.
pub fn field_encode_amount(amount: i128) -> B256 {
    if amount >= 0 {
        fr_to_b256(Fr::from(amount as u128))
    } else {
        fr_to_b256(-Fr::from(amount.unsigned_abs()))
    }
}
