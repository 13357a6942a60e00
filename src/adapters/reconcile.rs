use std::collections::HashMap;

use alloy::primitives::B256;

use crate::{
    adapters::{
        memory_store::NoteStore,
        merkle_tree::PoolTree,
    },
    error::{
        CoreError,
        Result,
    },
    ports::chain::{
        DepositEvent,
        SyncCursor,
    },
};

/// Outcome of reconciling local note state against the event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Notes whose commitment no longer appears in the event log. Their
    /// tree positions were cleared; they are unspendable until observed
    /// again.
    pub phantoms: usize,
    /// Notes whose leaf index was assigned or corrected.
    pub reindexed: usize,
}

/// Rebuild a tree by replaying commitment events in canonical order.
///
/// The events must already be strictly ordered by `(block_number,
/// log_index)`; an out-of-order or duplicate entry means the event source
/// is unreliable and any root derived from it would be wrong.
pub fn rebuild_from_events(events: &[DepositEvent]) -> Result<PoolTree> {
    let mut tree = PoolTree::new();
    let mut previous: Option<(u64, u64)> = None;

    for event in events {
        let key = (event.block_number, event.log_index);
        if let Some(prev) = previous {
            if key <= prev {
                return Err(CoreError::ReconciliationMismatch(format!(
                    "event log not strictly ordered: {key:?} after {prev:?}"
                )));
            }
        }
        previous = Some(key);
        tree.insert(event.commitment)?;
    }

    if let Some(last) = events.last() {
        tree.set_cursor(SyncCursor::after(last));
    }
    Ok(tree)
}

/// Rebuild the tree from `events` and realign the store's leaf indices to
/// it. Tracked notes missing from the log are phantoms, typically the
/// residue of a chain reorg, and lose their tree position.
pub fn reconcile_store(
    store: &mut NoteStore,
    events: &[DepositEvent],
) -> Result<(PoolTree, ReconcileReport)> {
    let tree = rebuild_from_events(events)?;

    let mut positions: HashMap<B256, u64> = HashMap::with_capacity(events.len());
    for (index, event) in events.iter().enumerate() {
        positions.insert(event.commitment, index as u64);
    }

    let mut report = ReconcileReport::default();
    for (commitment, record) in store.records_mut() {
        match positions.get(&commitment.0) {
            Some(&index) => {
                if record.leaf_index != Some(index) {
                    record.leaf_index = Some(index);
                    report.reindexed += 1;
                }
            }
            None => {
                if record.leaf_index.is_some() {
                    tracing::warn!(
                        commitment = %commitment.0,
                        "tracked note absent from event log, clearing tree position"
                    );
                    record.leaf_index = None;
                    report.phantoms += 1;
                }
            }
        }
    }

    Ok((tree, report))
}

/// Cross-check a rebuilt tree against the root the contract publishes.
pub fn expect_root(tree: &PoolTree, chain_root: B256) -> Result<()> {
    let local = tree.root();
    if local != chain_root {
        return Err(CoreError::ReconciliationMismatch(format!(
            "local root {local} does not match chain root {chain_root}"
        )));
    }
    Ok(())
}
