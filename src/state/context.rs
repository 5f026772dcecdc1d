//! Replication group tracking and commit completion.
//!
//! Each prepare call creates one replication context shared by every staged
//! entry of the batch. The context records whether the replicator has
//! acknowledged the group, the failure it reported if any, and how many
//! staging nodes still reference it. A one-shot channel carries the
//! completion signal to the commit caller; the table fires it only after the
//! write gate has been released.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::core::error::{WeftError, WeftResult};

type SignalResult = Result<(), WeftError>;

/// Completion state of one replicated group.
pub(crate) struct ReplicationContext {
    seq: u64,
    state: Mutex<ContextState>,
}

struct ContextState {
    replication_done: bool,
    failure: Option<WeftError>,
    associated_entries: usize,
    signal: Option<oneshot::Sender<SignalResult>>,
    waiter: Option<oneshot::Receiver<SignalResult>>,
}

impl ReplicationContext {
    pub(crate) fn new(seq: u64, associated_entries: usize) -> Self {
        let (signal, waiter) = oneshot::channel();
        Self {
            seq,
            state: Mutex::new(ContextState {
                replication_done: false,
                failure: None,
                associated_entries,
                signal: Some(signal),
                waiter: Some(waiter),
            }),
        }
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// Record the replicator's acknowledgement, keeping the first failure.
    pub(crate) fn mark_done(&self, failure: Option<WeftError>) {
        let mut state = self.state.lock();
        state.replication_done = true;
        if state.failure.is_none() {
            state.failure = failure;
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state.lock().replication_done
    }

    pub(crate) fn failure(&self) -> Option<WeftError> {
        self.state.lock().failure.clone()
    }

    /// Drop one staging node's reference; returns how many remain.
    pub(crate) fn release_entry(&self) -> usize {
        let mut state = self.state.lock();
        state.associated_entries = state.associated_entries.saturating_sub(1);
        state.associated_entries
    }

    pub(crate) fn remaining_entries(&self) -> usize {
        self.state.lock().associated_entries
    }

    pub(crate) fn take_waiter(&self) -> Option<oneshot::Receiver<SignalResult>> {
        self.state.lock().waiter.take()
    }

    /// Fire the completion signal. Must not be called while the table's
    /// write gate is held.
    pub(crate) fn fire(&self) {
        let (signal, result) = {
            let mut state = self.state.lock();
            let result = state.failure.clone().map_or(Ok(()), Err);
            (state.signal.take(), result)
        };
        if let Some(signal) = signal {
            // The waiter may already be gone; completion is best-effort.
            let _ = signal.send(result);
        }
    }
}

/// Awaitable outcome of a commit call.
///
/// Ready when the group drained during the call itself; pending when the
/// drain is still waiting on lower sequence numbers.
#[must_use = "a commit outcome reports replication failures"]
pub enum CommitWait {
    /// The group already drained; the outcome is known.
    Ready(WeftResult<()>),
    /// The group is still staged; the signal fires when it drains.
    Pending(oneshot::Receiver<SignalResult>),
}

impl CommitWait {
    /// Check whether the outcome is already known.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Wait for the group to drain from the staging list.
    pub async fn wait(self) -> WeftResult<()> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(waiter) => waiter.await.unwrap_or(Err(WeftError::SignalLost)),
        }
    }
}
