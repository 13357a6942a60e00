use alloy::primitives::{
    Address,
    B256,
    U256,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    domain::note::Note,
    error::{
        CoreError,
        Result,
    },
};

/// The fixed operation-kind tag of the 2-in/2-out circuit shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// 0 real inputs, public amount > 0, at least one real output.
    Deposit,
    /// 1-2 real inputs, public amount < 0, value leaves to a public recipient.
    Withdraw,
    /// Pool-composition only (transfer/split/merge), public amount = 0.
    Transfer,
}

/// A balance-checked shielded-pool operation in canonical 2-in/2-out shape.
///
/// Unused slots are padded with the canonical dummy note. The balance
/// invariant `Σ inputs + public_amount == Σ outputs` (per asset) is the
/// contract the external circuit enforces; it is validated here first so a
/// bad operation fails fast instead of wasting proving time.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    pub inputs: [Note; 2],
    pub outputs: [Note; 2],
    /// Signed public amount: positive for deposits, negative for
    /// withdrawals, zero for transfers.
    pub public_amount: i128,
    /// Asset id shared by every real note in the operation.
    pub public_asset: B256,
    /// Public recipient of a withdrawal; zero otherwise.
    pub recipient: Address,
    pub chain_id: u64,
}

impl Operation {
    /// A deposit brings public value into the pool as one or two new notes.
    pub fn deposit(output: Note, second_output: Option<Note>) -> Result<Self> {
        let outputs = [output, second_output.unwrap_or_else(Note::dummy)];
        let public_amount = sum_amounts(&outputs)?;
        if public_amount <= 0 {
            return Err(CoreError::InvalidInput(
                "deposit must create a positive public amount".into(),
            ));
        }
        let op = Self {
            kind: OperationKind::Deposit,
            inputs: [Note::dummy(), Note::dummy()],
            outputs,
            public_amount,
            public_asset: B256::ZERO,
            recipient: Address::ZERO,
            chain_id: 0,
        };
        op.finish()
    }

    /// A withdrawal spends 1-2 notes, pays `recipient` publicly, and keeps
    /// any remainder as an optional change note.
    pub fn withdraw(
        inputs: Vec<Note>,
        change: Option<Note>,
        recipient: Address,
    ) -> Result<Self> {
        let inputs = pad_real_slots(inputs, "input")?;
        let outputs = [change.unwrap_or_else(Note::dummy), Note::dummy()];
        let public_amount = sum_amounts(&outputs)? - sum_amounts(&inputs)?;
        if public_amount >= 0 {
            return Err(CoreError::InvalidInput(
                "withdrawal must release a positive amount to the recipient".into(),
            ));
        }
        if recipient == Address::ZERO {
            return Err(CoreError::InvalidInput(
                "withdrawal recipient must not be the zero address".into(),
            ));
        }
        let op = Self {
            kind: OperationKind::Withdraw,
            inputs,
            outputs,
            public_amount,
            public_asset: B256::ZERO,
            recipient,
            chain_id: 0,
        };
        op.finish()
    }

    /// Transfer, split, or merge: inputs and outputs balance exactly.
    pub fn transfer(inputs: Vec<Note>, outputs: Vec<Note>) -> Result<Self> {
        let inputs = pad_real_slots(inputs, "input")?;
        let outputs = pad_real_slots(outputs, "output")?;
        let op = Self {
            kind: OperationKind::Transfer,
            inputs,
            outputs,
            public_amount: 0,
            public_asset: B256::ZERO,
            recipient: Address::ZERO,
            chain_id: 0,
        };
        op.finish()
    }

    /// Real (non-dummy) input notes with their slot positions.
    pub fn real_inputs(&self) -> impl Iterator<Item = (usize, &Note)> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_dummy())
    }

    /// Real (non-dummy) output notes with their slot positions.
    pub fn real_outputs(&self) -> impl Iterator<Item = (usize, &Note)> {
        self.outputs
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_dummy())
    }

    /// Re-check the balance identity. Construction already guarantees it;
    /// the assembler calls this again as a final gate before proving.
    pub fn check_balance(&self) -> Result<()> {
        let inputs = sum_amounts(&self.inputs)?;
        let outputs = sum_amounts(&self.outputs)?;
        if inputs + self.public_amount != outputs {
            return Err(CoreError::InvalidInput(format!(
                "balance violation: inputs {inputs} + public {} != outputs {outputs}",
                self.public_amount
            )));
        }
        Ok(())
    }

    /// Shared validation: asset/chain consistency across real notes, slot
    /// rules per kind, and the balance identity.
    fn finish(mut self) -> Result<Self> {
        let mut asset: Option<B256> = None;
        let mut chain: Option<u64> = None;

        for (slot, note) in self.real_inputs().chain(self.real_outputs()) {
            match asset {
                None => asset = Some(note.asset_id),
                Some(expected) if expected != note.asset_id => {
                    return Err(CoreError::InvalidInput(format!(
                        "asset mismatch in slot {slot}: operation notes must share one asset"
                    )));
                }
                Some(_) => {}
            }
            match chain {
                None => chain = Some(note.chain_id),
                Some(expected) if expected != note.chain_id => {
                    return Err(CoreError::InvalidInput(format!(
                        "chain id mismatch in slot {slot}"
                    )));
                }
                Some(_) => {}
            }
        }

        let (asset, chain) = match (asset, chain) {
            (Some(a), Some(c)) => (a, c),
            _ => {
                return Err(CoreError::InvalidInput(
                    "operation has no real notes".into(),
                ));
            }
        };
        self.public_asset = asset;
        self.chain_id = chain;

        match self.kind {
            OperationKind::Deposit => {
                if self.real_inputs().count() != 0 {
                    return Err(CoreError::InvalidInput(
                        "deposit must not spend existing notes".into(),
                    ));
                }
            }
            OperationKind::Withdraw | OperationKind::Transfer => {
                if self.real_inputs().count() == 0 {
                    return Err(CoreError::InvalidInput(
                        "operation must spend at least one real note".into(),
                    ));
                }
            }
        }
        if self.kind == OperationKind::Transfer && self.real_outputs().count() == 0 {
            return Err(CoreError::InvalidInput(
                "transfer must create at least one real note".into(),
            ));
        }

        self.check_balance()?;
        Ok(self)
    }
}

/// Sum note amounts as i128 (amounts are bounded by 2^64 - 1, so two of
/// them always fit).
fn sum_amounts(notes: &[Note; 2]) -> Result<i128> {
    let mut total: i128 = 0;
    for note in notes {
        if note.amount > U256::from(u64::MAX) {
            return Err(CoreError::AmountOutOfRange {
                amount: note.amount,
                max: U256::from(u64::MAX),
            });
        }
        total += note.amount.to::<u64>() as i128;
    }
    Ok(total)
}

fn pad_real_slots(notes: Vec<Note>, role: &str) -> Result<[Note; 2]> {
    match notes.len() {
        1 => {
            let mut it = notes.into_iter();
            Ok([it.next().expect("len checked"), Note::dummy()])
        }
        2 => {
            let mut it = notes.into_iter();
            Ok([
                it.next().expect("len checked"),
                it.next().expect("len checked"),
            ])
        }
        n => Err(CoreError::InvalidInput(format!(
            "expected 1-2 {role} notes, got {n}"
        ))),
    }
}
