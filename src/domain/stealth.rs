use alloy::primitives::{
    Address,
    B256,
};
use k256::{
    ProjectivePoint,
    PublicKey,
    Scalar,
};

use crate::{
    crypto::stealth::{
        hash_to_scalar,
        point_to_eth_address,
        random_scalar,
        shared_secret_hash,
    },
    domain::keys::{
        KeyPair,
        MetaAddress,
        SpendingKey,
    },
    error::{
        CoreError,
        Result,
    },
};

/// A one-time payment destination derived from a meta-address.
///
/// ```text
/// s          = r · V                      (sender-side ECDH)
/// h          = keccak256(compress(s))
/// P_stealth  = S + reduce(h) · G
/// address    = eth_address(P_stealth)
/// view_tag   = h[0]
/// ```
///
/// Created by the sender per payment, never reused. Repeated derivations
/// for the same meta-address are unlinkable because `r` is fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealthPayment {
    /// One-time receiving address.
    pub stealth_address: Address,
    /// Ephemeral public key R = r·G, published in the announcement.
    pub ephemeral_pubkey: PublicKey,
    /// First byte of the shared-secret hash; lets scanners cheaply reject
    /// non-matches before doing full EC recomputation.
    pub view_tag: u8,
}

/// Derive a fresh stealth payment for a recipient's meta-address.
pub fn generate_stealth_payment(meta: &MetaAddress) -> Result<StealthPayment> {
    derive_with_ephemeral(meta, &random_scalar())
}

/// Deterministic core of stealth derivation, split out for testing.
pub(crate) fn derive_with_ephemeral(
    meta: &MetaAddress,
    r: &Scalar,
) -> Result<StealthPayment> {
    let shared = meta.view_pubkey.to_projective() * r;
    let shared_hash = shared_secret_hash(&shared)?;
    let offset = hash_to_scalar(shared_hash);

    let stealth_point = meta.spend_pubkey.to_projective() + ProjectivePoint::GENERATOR * offset;
    let stealth_pubkey = PublicKey::from_affine(stealth_point.to_affine())
        .map_err(|_| CoreError::InvalidInput("degenerate stealth point".into()))?;

    let ephemeral_point = ProjectivePoint::GENERATOR * r;
    let ephemeral_pubkey = PublicKey::from_affine(ephemeral_point.to_affine())
        .map_err(|_| CoreError::InvalidInput("ephemeral scalar is zero".into()))?;

    Ok(StealthPayment {
        stealth_address: point_to_eth_address(&stealth_pubkey),
        ephemeral_pubkey,
        view_tag: shared_hash[0],
    })
}

/// Recipient-side shared-secret hash for an announced ephemeral key:
/// `keccak256(compress(v · R))`, the same point as the sender's `r · V`.
///
/// This is the cheap half of detection: one scalar multiplication and one
/// hash. The view tag is its first byte.
pub fn shared_hash_for(keys: &KeyPair, ephemeral: &PublicKey) -> Result<B256> {
    let shared = ephemeral.to_projective() * keys.viewing.scalar();
    shared_secret_hash(&shared)
}

/// The stealth address implied by a shared-secret hash: the expensive half
/// of detection, run only after the view tag matched.
pub fn stealth_address_from_shared(keys: &KeyPair, shared_hash: B256) -> Result<Address> {
    let offset = hash_to_scalar(shared_hash);
    let stealth_point =
        keys.spending.public_key().to_projective() + ProjectivePoint::GENERATOR * offset;
    let stealth_pubkey = PublicKey::from_affine(stealth_point.to_affine())
        .map_err(|_| CoreError::InvalidInput("degenerate stealth point".into()))?;
    Ok(point_to_eth_address(&stealth_pubkey))
}

/// Recompute the stealth address and view tag implied by an announced
/// ephemeral key.
pub fn expected_payment(keys: &KeyPair, ephemeral: &PublicKey) -> Result<(Address, u8)> {
    let shared_hash = shared_hash_for(keys, ephemeral)?;
    let address = stealth_address_from_shared(keys, shared_hash)?;
    Ok((address, shared_hash[0]))
}

/// Recover the private key behind a detected stealth address:
/// `sk_stealth = spend + reduce(keccak(compress(v · R))) mod n`.
///
/// The returned key must equal the private key behind the address the
/// sender produced; the whole scheme rests on that equality.
pub fn recover_stealth_private_key(
    keys: &KeyPair,
    ephemeral: &PublicKey,
) -> Result<SpendingKey> {
    let shared = ephemeral.to_projective() * keys.viewing.scalar();
    let shared_hash = shared_secret_hash(&shared)?;
    let offset = hash_to_scalar(shared_hash);

    SpendingKey::from_scalar(keys.spending.scalar() + &offset)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        crypto::stealth::random_scalar,
        domain::keys::{
            SpendingKey,
            ViewingKey,
        },
    };

    fn test_keypair() -> KeyPair {
        KeyPair {
            spending: SpendingKey::from_scalar(random_scalar()).unwrap(),
            viewing: ViewingKey::from_scalar(random_scalar()).unwrap(),
        }
    }

    #[test]
    fn test_recovered_key_controls_stealth_address() {
        let keys = test_keypair();
        let meta = keys.meta_address();

        let payment = generate_stealth_payment(&meta).unwrap();
        let recovered =
            recover_stealth_private_key(&keys, &payment.ephemeral_pubkey).unwrap();

        // recovered · G must land on the announced address
        assert_eq!(
            point_to_eth_address(&recovered.public_key()),
            payment.stealth_address
        );
    }

    #[test]
    fn test_recipient_recomputes_same_address_and_tag() {
        let keys = test_keypair();
        let meta = keys.meta_address();

        let payment = generate_stealth_payment(&meta).unwrap();
        let (address, tag) = expected_payment(&keys, &payment.ephemeral_pubkey).unwrap();

        assert_eq!(address, payment.stealth_address);
        assert_eq!(tag, payment.view_tag);
    }

    #[test]
    fn test_unlinkability_no_collisions_over_1000_draws() {
        let keys = test_keypair();
        let meta = keys.meta_address();

        let mut addresses = HashSet::new();
        let mut ephemerals = HashSet::new();
        for _ in 0..1000 {
            let payment = generate_stealth_payment(&meta).unwrap();
            assert!(addresses.insert(payment.stealth_address));
            assert!(ephemerals.insert(payment.ephemeral_pubkey.to_sec1_bytes()));
        }
    }

    #[test]
    fn test_derivation_deterministic_for_fixed_ephemeral() {
        let keys = test_keypair();
        let meta = keys.meta_address();
        let r = random_scalar();

        let p1 = derive_with_ephemeral(&meta, &r).unwrap();
        let p2 = derive_with_ephemeral(&meta, &r).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_wrong_keys_do_not_match() {
        let keys = test_keypair();
        let intruder = test_keypair();
        let meta = keys.meta_address();

        let payment = generate_stealth_payment(&meta).unwrap();
        let (address, _) =
            expected_payment(&intruder, &payment.ephemeral_pubkey).unwrap();
        assert_ne!(address, payment.stealth_address);
    }
}
