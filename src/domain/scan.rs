use alloy::primitives::Address;
use k256::PublicKey;

use crate::domain::{
    announcement::{
        Announcement,
        AnnouncementPayload,
        SCHEME_ID,
    },
    keys::KeyPair,
    stealth::{
        shared_hash_for,
        stealth_address_from_shared,
    },
};

/// A detected incoming payment.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    /// Index of the announcement in the log.
    pub index: u64,
    pub stealth_address: Address,
    pub ephemeral_pubkey: PublicKey,
    pub payload: AnnouncementPayload,
}

/// Cursor-restartable scanner over the announcement log.
///
/// The view tag is checked before any EC work: a mismatched tag can never
/// belong to this key pair (the tag is a pure function of the shared
/// secret), so the cheap filter has no false negatives. Tag collisions
/// from other recipients are resolved by the full address recomputation.
#[derive(Debug)]
pub struct Scanner {
    keys: KeyPair,
    cursor: u64,
}

impl Scanner {
    pub fn new(keys: KeyPair) -> Self {
        Self::with_cursor(keys, 0)
    }

    /// Resume from a previously persisted cursor; announcements before it
    /// are never re-examined.
    pub fn with_cursor(keys: KeyPair, cursor: u64) -> Self {
        Self { keys, cursor }
    }

    /// Index of the next announcement to examine.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Scan the log from the current cursor, returning matches and
    /// advancing the cursor past every examined entry. An interrupted
    /// caller can persist `cursor()` and resume without rework.
    pub fn scan(&mut self, announcements: &[Announcement]) -> Vec<ScanMatch> {
        let start = self.cursor as usize;
        let mut matches = Vec::new();

        for (index, announcement) in announcements.iter().enumerate().skip(start) {
            if let Some(m) = self.check(index as u64, announcement) {
                matches.push(m);
            }
        }

        // everything up to the end of the log has now been examined
        self.cursor = self.cursor.max(announcements.len() as u64);
        matches
    }

    fn check(&self, index: u64, announcement: &Announcement) -> Option<ScanMatch> {
        if announcement.scheme_id != SCHEME_ID {
            return None;
        }

        let ephemeral = match announcement.ephemeral_public_key() {
            Ok(pk) => pk,
            Err(_) => {
                tracing::debug!(index, "skipping announcement with malformed ephemeral key");
                return None;
            }
        };

        let shared_hash = shared_hash_for(&self.keys, &ephemeral).ok()?;

        // Cheap filter: the tag is a pure function of the shared secret, so
        // a mismatch can never hide a true match. Only survivors pay for
        // the stealth-point recomputation below.
        if let Some(announced_tag) = announcement.view_tag() {
            if announced_tag != shared_hash[0] {
                return None;
            }
        }

        let address = stealth_address_from_shared(&self.keys, shared_hash).ok()?;
        if address != announcement.stealth_address {
            return None;
        }

        // A misparsed payload must never be passed off as a plain payment;
        // the entry is dropped loudly so the wallet can investigate.
        let payload = match announcement.payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(index, %err, "skipping matched announcement with undecodable payload");
                return None;
            }
        };
        Some(ScanMatch {
            index,
            stealth_address: address,
            ephemeral_pubkey: ephemeral,
            payload,
        })
    }
}
