use std::{
    fmt,
    str::FromStr,
};

use alloy::primitives::B256;
use k256::{
    elliptic_curve::sec1::ToEncodedPoint,
    ProjectivePoint,
    PublicKey,
    Scalar,
};

use crate::{
    crypto::{
        poseidon::poseidon1,
        stealth::scalar_to_b256,
    },
    error::{
        CoreError,
        Result,
    },
};

/// Length of a compressed SEC1 point encoding.
const COMPRESSED_POINT_LEN: usize = 33;

/// URI prefix for the meta-address string encoding.
pub const META_ADDRESS_PREFIX: &str = "st:eth:";

/// Spending key: the master secret for spending authority. Authorizes
/// stealth-address spends and derives nullifiers in the shielded pool.
#[derive(Clone, PartialEq, Eq)]
pub struct SpendingKey(Scalar);

impl SpendingKey {
    /// Wrap a scalar, rejecting zero (a zero key has no public half).
    pub fn from_scalar(scalar: Scalar) -> Result<Self> {
        if scalar_to_b256(&scalar) == B256::ZERO {
            return Err(CoreError::InvalidInput("spending key is zero".into()));
        }
        Ok(Self(scalar))
    }

    pub fn scalar(&self) -> &Scalar {
        &self.0
    }

    /// Big-endian scalar bytes.
    pub fn to_b256(&self) -> B256 {
        scalar_to_b256(&self.0)
    }

    /// Public spend key, S = spend · G.
    pub fn public_key(&self) -> PublicKey {
        public_from_scalar(&self.0)
    }

    /// Shielded-pool owner commitment, owner = poseidon1(spending_key).
    ///
    /// The same scalar backs both the stealth scheme and the shielded-pool
    /// identity; the owner hash never reveals the scalar.
    pub fn owner(&self) -> B256 {
        poseidon1(self.to_b256())
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the scalar
        f.write_str("SpendingKey(..)")
    }
}

/// Viewing key: detects incoming stealth payments via ECDH. Cannot spend.
#[derive(Clone, PartialEq, Eq)]
pub struct ViewingKey(Scalar);

impl ViewingKey {
    pub fn from_scalar(scalar: Scalar) -> Result<Self> {
        if scalar_to_b256(&scalar) == B256::ZERO {
            return Err(CoreError::InvalidInput("viewing key is zero".into()));
        }
        Ok(Self(scalar))
    }

    pub fn scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn to_b256(&self) -> B256 {
        scalar_to_b256(&self.0)
    }

    /// Public view key, V = view · G.
    pub fn public_key(&self) -> PublicKey {
        public_from_scalar(&self.0)
    }
}

impl fmt::Debug for ViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewingKey(..)")
    }
}

/// The full private key pair, derived per session and held only in memory.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub spending: SpendingKey,
    pub viewing: ViewingKey,
}

impl KeyPair {
    /// The public half, published as the recipient's reusable identity.
    pub fn meta_address(&self) -> MetaAddress {
        MetaAddress {
            spend_pubkey: self.spending.public_key(),
            view_pubkey: self.viewing.public_key(),
        }
    }
}

/// A recipient's published `(spend public key, view public key)` pair.
///
/// String form: `st:eth:0x<hex(compressed_spend ‖ compressed_view)>`,
/// a 66-byte payload of two compressed SEC1 points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaAddress {
    pub spend_pubkey: PublicKey,
    pub view_pubkey: PublicKey,
}

impl MetaAddress {
    /// Concatenated compressed point encodings (66 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * COMPRESSED_POINT_LEN);
        out.extend_from_slice(self.spend_pubkey.to_encoded_point(true).as_bytes());
        out.extend_from_slice(self.view_pubkey.to_encoded_point(true).as_bytes());
        out
    }

    /// Parse from the concatenated compressed point encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 2 * COMPRESSED_POINT_LEN {
            return Err(CoreError::InvalidInput(format!(
                "meta-address payload must be {} bytes, got {}",
                2 * COMPRESSED_POINT_LEN,
                bytes.len()
            )));
        }
        let spend_pubkey = PublicKey::from_sec1_bytes(&bytes[..COMPRESSED_POINT_LEN])
            .map_err(|_| CoreError::InvalidInput("invalid spend public key".into()))?;
        let view_pubkey = PublicKey::from_sec1_bytes(&bytes[COMPRESSED_POINT_LEN..])
            .map_err(|_| CoreError::InvalidInput("invalid view public key".into()))?;
        Ok(Self {
            spend_pubkey,
            view_pubkey,
        })
    }
}

impl fmt::Display for MetaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{META_ADDRESS_PREFIX}0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for MetaAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let payload = s.strip_prefix(META_ADDRESS_PREFIX).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "meta-address must start with {META_ADDRESS_PREFIX:?}"
            ))
        })?;
        let payload = payload.strip_prefix("0x").unwrap_or(payload);
        let bytes = hex::decode(payload)
            .map_err(|e| CoreError::InvalidInput(format!("meta-address hex: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

fn public_from_scalar(scalar: &Scalar) -> PublicKey {
    let point = ProjectivePoint::GENERATOR * scalar;
    PublicKey::from_affine(point.to_affine())
        .expect("non-zero scalar always yields a valid public key")
}
