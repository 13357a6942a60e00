use alloy::primitives::{
    keccak256,
    Address,
    B256,
};
use k256::{
    elliptic_curve::{
        ops::Reduce,
        sec1::ToEncodedPoint,
    },
    ProjectivePoint,
    PublicKey,
    Scalar,
    SecretKey,
};

use crate::error::{
    CoreError,
    Result,
};

/// Sample a uniformly random non-zero secp256k1 scalar.
pub fn random_scalar() -> Scalar {
    *SecretKey::random(&mut rand::thread_rng()).to_nonzero_scalar()
}

/// Reduce 32 big-endian bytes to a secp256k1 scalar (mod the group order).
pub fn reduce_to_scalar(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<k256::U256>>::reduce(k256::U256::from_be_slice(bytes))
}

/// Keccak-256 of the compressed SEC1 encoding of an ECDH shared point.
///
/// Both sides of the exchange arrive at the same point, so this hash is the
/// shared secret from which the stealth offset and view tag derive.
pub fn shared_secret_hash(point: &ProjectivePoint) -> Result<B256> {
    let affine = point.to_affine();
    let pk = PublicKey::from_affine(affine)
        .map_err(|_| CoreError::InvalidInput("shared secret is the identity point".into()))?;
    let encoded = pk.to_encoded_point(true);
    Ok(keccak256(encoded.as_bytes()))
}

/// Interpret a 32-byte hash as a scalar (mod the group order).
pub fn hash_to_scalar(hash: B256) -> Scalar {
    reduce_to_scalar(&hash.0)
}

/// Standard Ethereum address encoding of a curve point:
/// keccak256 of the uncompressed point body, last 20 bytes.
pub fn point_to_eth_address(pk: &PublicKey) -> Address {
    let encoded = pk.to_encoded_point(false);
    let digest = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Big-endian bytes of a scalar as B256.
pub fn scalar_to_b256(scalar: &Scalar) -> B256 {
    B256::from_slice(&scalar.to_bytes())
}
