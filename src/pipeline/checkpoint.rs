//! Incremental checkpoint persistence on the storage collaborator.
//!
//! Checkpoints are partial snapshots saved under sequential keys. Loading a
//! checkpoint folds the saved partials back together with the idempotent
//! merge, so replaying a checkpoint sequence that contains duplicates (a
//! crash between write and acknowledgment) converges to the same state.

use crate::error::{AtlasError, Result};
use crate::snapshot::{merge_partial, Snapshot};
use crate::storage::Storage;

/// Key prefix for checkpoint entries.
pub const CHECKPOINT_PREFIX: &str = "snapshot/";

/// Persist one incremental snapshot under the next sequence key.
///
/// State mutated after this call returns but before a subsequent checkpoint
/// must not be assumed persisted.
pub fn save_incremental(storage: &dyn Storage, snapshot: &Snapshot, seq: usize) -> Result<()> {
    let key = format!("{CHECKPOINT_PREFIX}{seq:06}");
    let value = serde_json::to_value(snapshot)
        .map_err(|e| AtlasError::storage(key.clone(), e.to_string()))?;
    storage.put(&key, value)?;
    tracing::debug!(key, "checkpoint saved");
    Ok(())
}

/// Reassemble the accumulated snapshot from all saved checkpoints.
///
/// Returns `None` when no checkpoint exists.
pub fn load_checkpoint(storage: &dyn Storage) -> Result<Option<Snapshot>> {
    let mut accumulated: Option<Snapshot> = None;
    for value in storage.query_by_prefix(CHECKPOINT_PREFIX)? {
        let partial: Snapshot = serde_json::from_value(value)
            .map_err(|e| AtlasError::storage(CHECKPOINT_PREFIX, e.to_string()))?;
        accumulated = Some(merge_partial(accumulated.as_ref(), &partial, false));
    }
    Ok(accumulated)
}
