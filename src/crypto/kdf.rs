use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;

use crate::{
    crypto::stealth::reduce_to_scalar,
    domain::keys::{
        KeyPair,
        SpendingKey,
        ViewingKey,
    },
    error::{
        CoreError,
        Result,
    },
};

/// PBKDF2 iteration count. Deliberately slow: the signature is attacker
/// observable in some threat models, so the PIN must be expensive to grind.
pub const KDF_ITERATIONS: u32 = 100_000;

/// Derive the spending/viewing key pair from a wallet signature and a PIN.
///
/// Runs PBKDF2-HMAC-SHA512 over `(signature, pin)` producing 64 bytes; the
/// first half becomes the spending scalar and the second half the viewing
/// scalar, each reduced mod the secp256k1 group order. Both inputs are
/// required: neither alone reproduces the pair. Keys are computed per
/// session and held only in memory.
pub fn derive_keys(signature: &str, pin: &str) -> Result<KeyPair> {
    if signature.is_empty() {
        return Err(CoreError::InvalidInput(
            "signature must not be empty".into(),
        ));
    }
    if pin.is_empty() {
        return Err(CoreError::InvalidInput("pin must not be empty".into()));
    }

    let mut output = [0u8; 64];
    pbkdf2_hmac::<Sha512>(
        signature.as_bytes(),
        pin.as_bytes(),
        KDF_ITERATIONS,
        &mut output,
    );

    let mut spend_half = [0u8; 32];
    spend_half.copy_from_slice(&output[..32]);
    let mut view_half = [0u8; 32];
    view_half.copy_from_slice(&output[32..]);

    let spending = SpendingKey::from_scalar(reduce_to_scalar(&spend_half))?;
    let viewing = ViewingKey::from_scalar(reduce_to_scalar(&view_half))?;

    Ok(KeyPair { spending, viewing })
}
