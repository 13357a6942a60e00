use alloy::primitives::{
    Address,
    Bytes,
    U256,
};
use k256::PublicKey;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    domain::stealth::StealthPayment,
    error::{
        CoreError,
        Result,
    },
};

/// Scheme identifier for the secp256k1 / keccak view-tag scheme.
pub const SCHEME_ID: u64 = 1;

/// Payload type marker: ERC-20 transfer descriptor.
const MARKER_ERC20: u8 = 0x01;
/// Payload type marker: UTF-8 link slug.
const MARKER_LINK: u8 = 0x02;

/// Byte length of an encoded ERC-20 transfer descriptor.
const ERC20_PAYLOAD_LEN: usize = 4 + 20 + 32;

/// Public record written to the append-only announcement log.
///
/// Metadata layout: 1-byte view tag, then optionally a type marker byte
/// followed by a fixed-layout payload for that type. Immutable once
/// published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub scheme_id: u64,
    /// 20-byte one-time account identifier.
    pub stealth_address: Address,
    /// Compressed SEC1 point encoding of R = r·G.
    pub ephemeral_pubkey: Bytes,
    /// View tag plus optional typed payload.
    pub metadata: Bytes,
}

/// Decoded form of the optional typed payload following the view tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementPayload {
    /// View tag only, no auxiliary context.
    None,
    /// An ERC-20 transfer descriptor:
    /// 4-byte BE chain id, 20-byte token address, 32-byte amount.
    Erc20Transfer {
        chain_id: u32,
        token: Address,
        amount: U256,
    },
    /// A payment-link slug.
    LinkSlug(String),
}

impl AnnouncementPayload {
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            AnnouncementPayload::None => {}
            AnnouncementPayload::Erc20Transfer {
                chain_id,
                token,
                amount,
            } => {
                out.push(MARKER_ERC20);
                out.extend_from_slice(&chain_id.to_be_bytes());
                out.extend_from_slice(token.as_slice());
                out.extend_from_slice(&amount.to_be_bytes::<32>());
            }
            AnnouncementPayload::LinkSlug(slug) => {
                out.push(MARKER_LINK);
                out.extend_from_slice(slug.as_bytes());
            }
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let Some((&marker, rest)) = bytes.split_first() else {
            return Ok(AnnouncementPayload::None);
        };
        match marker {
            MARKER_ERC20 => {
                if rest.len() != ERC20_PAYLOAD_LEN {
                    return Err(CoreError::InvalidInput(format!(
                        "erc20 payload must be {ERC20_PAYLOAD_LEN} bytes, got {}",
                        rest.len()
                    )));
                }
                let chain_id = u32::from_be_bytes(rest[..4].try_into().expect("4 bytes"));
                let token = Address::from_slice(&rest[4..24]);
                let amount = U256::from_be_slice(&rest[24..]);
                Ok(AnnouncementPayload::Erc20Transfer {
                    chain_id,
                    token,
                    amount,
                })
            }
            MARKER_LINK => {
                let slug = std::str::from_utf8(rest)
                    .map_err(|_| {
                        CoreError::InvalidInput("link slug is not valid UTF-8".into())
                    })?
                    .to_owned();
                Ok(AnnouncementPayload::LinkSlug(slug))
            }
            other => Err(CoreError::InvalidInput(format!(
                "unknown announcement payload marker 0x{other:02x}"
            ))),
        }
    }
}

impl Announcement {
    /// Build the announcement for a freshly generated stealth payment.
    pub fn new(payment: &StealthPayment, payload: &AnnouncementPayload) -> Self {
        let mut metadata = vec![payment.view_tag];
        payload.encode_into(&mut metadata);

        Self {
            scheme_id: SCHEME_ID,
            stealth_address: payment.stealth_address,
            ephemeral_pubkey: Bytes::copy_from_slice(
                &payment.ephemeral_pubkey.to_sec1_bytes(),
            ),
            metadata: metadata.into(),
        }
    }

    /// The view-tag hint, if the metadata carries one.
    pub fn view_tag(&self) -> Option<u8> {
        self.metadata.first().copied()
    }

    /// Decode the typed payload following the view tag.
    pub fn payload(&self) -> Result<AnnouncementPayload> {
        if self.metadata.is_empty() {
            return Ok(AnnouncementPayload::None);
        }
        AnnouncementPayload::decode(&self.metadata[1..])
    }

    /// Parse the announced ephemeral public key.
    pub fn ephemeral_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_sec1_bytes(&self.ephemeral_pubkey)
            .map_err(|_| CoreError::InvalidInput("invalid ephemeral public key".into()))
    }
}
