//! The volatile state table facade.
//!
//! The table holds a primary replica's authoritative in-memory state while
//! replication is in flight. Prepared batches wait in the staging list until
//! the replicator acknowledges them; acknowledgements may arrive in any
//! order, but entries advance into the committed view strictly in ascending
//! sequence order, whole groups at a time. Readers and snapshot builders go
//! through the read side of the gate and never block each other.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::{CommitWait, ReplicationContext};
use super::entry::StateEntry;
use super::list::{CommittedView, StagingList, StagingNode};
use super::snapshot::SnapshotCursor;
use crate::core::error::WeftError;

/// Volatile replicated state table.
///
/// All mutating operations serialize through the write side of a
/// reader-writer gate; reads share the read side. The gate is not
/// reentrant: completion signals fire only after the write guard drops, so
/// a commit waiter may safely call back into the table.
pub struct StateTable<T, K, V> {
    gate: RwLock<TableInner<T, K, V>>,
}

struct TableInner<T, K, V> {
    staging: StagingList<T, K, V>,
    committed: CommittedView<T, K, V>,
    pending: HashMap<u64, Arc<ReplicationContext>>,
    last_prepared_seq: u64,
}

/// Point-in-time counters for a state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Entries waiting in the staging list.
    pub staging_entries: usize,

    /// Nodes in the committed list, including a trailing tombstone marker.
    pub committed_entries: usize,

    /// Live (non-deleted) committed entries across all types.
    pub live_entries: usize,

    /// Replication groups with staged entries still pending.
    pub pending_groups: usize,
}

impl<T, K, V> StateTable<T, K, V>
where
    T: Clone + Eq + Hash,
    K: Clone + Eq + Hash + Ord,
{
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            gate: RwLock::new(TableInner {
                staging: StagingList::new(),
                committed: CommittedView::new(),
                pending: HashMap::new(),
                last_prepared_seq: 0,
            }),
        }
    }

    /// Stage a batch of entries under one replication sequence number.
    ///
    /// Every entry is stamped with `seq` and appended to the staging list in
    /// the order given; the whole batch later commits or fails as a unit.
    /// Callers must pass strictly increasing sequence numbers; zero is
    /// reserved as "unassigned" and the batch is dropped.
    pub fn prepare(&self, entries: Vec<StateEntry<T, K, V>>, seq: u64) {
        if seq == 0 || entries.is_empty() {
            return;
        }
        let mut inner = self.gate.write();
        debug_assert!(
            seq > inner.last_prepared_seq,
            "prepare sequence regressed: {} after {}",
            seq,
            inner.last_prepared_seq
        );
        inner.last_prepared_seq = seq;
        let context = Arc::new(ReplicationContext::new(seq, entries.len()));
        for mut entry in entries {
            entry.assign_seq(seq);
            inner
                .staging
                .push_back(Arc::new(entry), Arc::clone(&context));
        }
        inner.pending.insert(seq, context);
    }

    /// Record the replicator's acknowledgement for a prepared group.
    ///
    /// A commit for the staging head drains every contiguous acknowledged
    /// group into the committed view; a commit above the head only marks its
    /// group and drains later, when the head catches up. A group whose
    /// acknowledgement carries `failure` drains without being applied, and
    /// the failure surfaces through the returned handle.
    pub fn commit(&self, seq: u64, failure: Option<WeftError>) -> CommitWait {
        if seq == 0 {
            return CommitWait::Ready(Err(failure.unwrap_or(WeftError::InvalidSequenceNumber)));
        }
        let mut to_signal = Vec::new();
        let wait = {
            let mut inner = self.gate.write();
            let context = match inner.pending.get(&seq) {
                Some(context) => Arc::clone(context),
                None => return CommitWait::Ready(Err(WeftError::UnknownSequence { seq })),
            };
            context.mark_done(failure);
            if inner.staging.head_seq() == Some(seq) {
                inner.drain_ready(&mut to_signal);
            }
            if context.remaining_entries() == 0 {
                CommitWait::Ready(context.failure().map_or(Ok(()), Err))
            } else {
                match context.take_waiter() {
                    Some(waiter) => CommitWait::Pending(waiter),
                    None => CommitWait::Ready(Err(WeftError::SignalLost)),
                }
            }
        };
        // Completion signals fire only after the write guard is released;
        // waiters may call back into the table synchronously.
        for context in &to_signal {
            context.fire();
        }
        wait
    }

    /// Install already-committed entries, bypassing the staging list.
    ///
    /// Secondary replicas apply entries straight off the replication stream;
    /// the caller provides them in ascending sequence order.
    pub fn apply_many<I>(&self, entries: I)
    where
        I: IntoIterator<Item = StateEntry<T, K, V>>,
    {
        let mut inner = self.gate.write();
        for entry in entries {
            inner.committed.apply(Arc::new(entry));
        }
    }

    /// Look up the live committed entry for a key.
    pub fn try_get(&self, kind: &T, key: &K) -> Option<Arc<StateEntry<T, K, V>>> {
        self.gate.read().committed.get(kind, key).map(Arc::clone)
    }

    /// Keys of the live committed entries of one type, ascending.
    pub fn keys(&self, kind: &T) -> Vec<K> {
        let mut keys = self.gate.read().committed.keys(kind);
        // Sort outside the read guard.
        keys.sort();
        keys
    }

    /// Live committed entries of one type, in no particular order.
    pub fn values(&self, kind: &T) -> Vec<Arc<StateEntry<T, K, V>>> {
        self.gate.read().committed.values(kind)
    }

    /// Snapshot the live committed entries of one type.
    pub fn enumerate_type(&self, kind: &T) -> SnapshotCursor<T, K, V> {
        let committed = self.gate.read().committed.entries_of_kind(kind);
        SnapshotCursor::new(committed, Vec::new())
    }

    /// Snapshot all entries with `seq <= max_seq` for a build.
    ///
    /// The committed prefix is always copied. The staging list is walked
    /// only when the committed copy stopped short of the bound; those
    /// entries are provisional and may later roll back on the primary.
    pub fn snapshot_up_to(&self, max_seq: u64) -> SnapshotCursor<T, K, V> {
        let inner = self.gate.read();
        let (committed, highest_copied) = inner.committed.copy_up_to(max_seq);
        let uncommitted = if highest_copied < max_seq {
            inner.staging.copy_up_to(max_seq)
        } else {
            Vec::new()
        };
        drop(inner);
        SnapshotCursor::new(committed, uncommitted)
    }

    /// Highest sequence number the table has seen, staged or committed.
    pub fn highest_known_seq(&self) -> u64 {
        let inner = self.gate.read();
        inner
            .staging
            .last_seq()
            .or_else(|| inner.committed.last_seq())
            .unwrap_or(0)
    }

    /// Highest committed sequence number, including trailing tombstones.
    pub fn highest_committed_seq(&self) -> u64 {
        self.gate.read().committed.last_seq().unwrap_or(0)
    }

    /// Current counters.
    pub fn stats(&self) -> TableStats {
        let inner = self.gate.read();
        TableStats {
            staging_entries: inner.staging.len(),
            committed_entries: inner.committed.len(),
            live_entries: inner.committed.live_len(),
            pending_groups: inner.pending.len(),
        }
    }
}

impl<T, K, V> Default for StateTable<T, K, V>
where
    T: Clone + Eq + Hash,
    K: Clone + Eq + Hash + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K, V> TableInner<T, K, V>
where
    T: Clone + Eq + Hash,
    K: Clone + Eq + Hash + Ord,
{
    /// Drain the acknowledged prefix of the staging list into the committed
    /// view. Fully drained groups leave the pending map and are queued for
    /// signaling, ascending by sequence number.
    fn drain_ready(&mut self, to_signal: &mut Vec<Arc<ReplicationContext>>) {
        let mut drained = 0usize;
        while let Some(node) = self.staging.pop_front_if_done() {
            let StagingNode { entry, context } = node;
            if context.failure().is_none() {
                self.committed.apply(entry);
            }
            drained += 1;
            if context.release_entry() == 0 {
                self.pending.remove(&context.seq());
                if let Some(failure) = context.failure() {
                    tracing::warn!(
                        seq = context.seq(),
                        %failure,
                        "replication group failed; its entries were discarded"
                    );
                }
                to_signal.push(context);
            }
        }
        if drained > 0 {
            tracing::debug!(
                drained,
                committed_seq = self.committed.last_seq().unwrap_or(0),
                "drained staging prefix into committed view"
            );
        }
    }
}
