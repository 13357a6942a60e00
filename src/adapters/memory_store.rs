use std::collections::HashMap;

use alloy::primitives::{
    B256,
    U256,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::domain::{
    commitment::Commitment,
    note::Note,
};

/// A tracked note with its pool position and spend status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub note: Note,
    /// Position in the commitment tree, `None` until the deposit event is
    /// observed on-chain.
    pub leaf_index: Option<u64>,
    pub spent: bool,
    /// Block number at which the note was first tracked.
    pub created_at: u64,
}

/// In-memory wallet store keyed by commitment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteStore {
    records: HashMap<Commitment, NoteRecord>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a note. Returns its commitment; re-inserting an existing
    /// commitment leaves the stored record untouched.
    pub fn insert(&mut self, note: Note, created_at: u64) -> Commitment {
        let commitment = note.commitment();
        self.records.entry(commitment).or_insert(NoteRecord {
            note,
            leaf_index: None,
            spent: false,
            created_at,
        });
        commitment
    }

    pub fn get(&self, commitment: &Commitment) -> Option<&NoteRecord> {
        self.records.get(commitment)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record the tree position of a confirmed note.
    pub fn mark_included(&mut self, commitment: &Commitment, leaf_index: u64) -> bool {
        match self.records.get_mut(commitment) {
            Some(record) => {
                record.leaf_index = Some(leaf_index);
                true
            }
            None => false,
        }
    }

    pub fn mark_spent(&mut self, commitment: &Commitment) -> bool {
        match self.records.get_mut(commitment) {
            Some(record) => {
                record.spent = true;
                true
            }
            None => false,
        }
    }

    /// Confirmed, unspent notes for one asset, ordered by tree position.
    pub fn spendable(&self, asset_id: B256) -> Vec<&NoteRecord> {
        let mut notes: Vec<&NoteRecord> = self
            .records
            .values()
            .filter(|r| !r.spent && r.leaf_index.is_some() && r.note.asset_id == asset_id)
            .collect();
        notes.sort_by_key(|r| r.leaf_index);
        notes
    }

    /// Total spendable balance for one asset.
    pub fn balance(&self, asset_id: B256) -> U256 {
        self.spendable(asset_id)
            .iter()
            .fold(U256::ZERO, |acc, r| acc + r.note.amount)
    }

    pub fn records(&self) -> impl Iterator<Item = (&Commitment, &NoteRecord)> {
        self.records.iter()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = (&Commitment, &mut NoteRecord)> {
        self.records.iter_mut()
    }
}
