//! State entry records.
//!
//! An entry is the immutable carrier of one key mutation. After construction
//! it changes exactly once: the replicator-assigned sequence number is
//! stamped onto every entry of a batch during prepare. Entries serialize with
//! serde so the embedder can ship them to secondaries and into checkpoints.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Metadata flags for a state entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntryFlags: u32 {
        /// Entry is a tombstone: the value is absent, and a prior live entry
        /// for the same key is erased when the tombstone commits.
        const TOMBSTONE = 0b0000_0001;
    }
}

impl Default for EntryFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One state mutation: a typed key carrying a value or a tombstone, plus the
/// replication sequence number assigned during prepare.
///
/// Sequence number zero is reserved as "unassigned".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry<T, K, V> {
    kind: T,
    key: K,
    value: Option<V>,
    flags: EntryFlags,
    seq: u64,
}

impl<T, K, V> StateEntry<T, K, V> {
    /// Create a live entry carrying `value`.
    pub fn put(kind: T, key: K, value: V) -> Self {
        Self {
            kind,
            key,
            value: Some(value),
            flags: EntryFlags::empty(),
            seq: 0,
        }
    }

    /// Create a tombstone that erases `key` when it commits.
    pub fn tombstone(kind: T, key: K) -> Self {
        Self {
            kind,
            key,
            value: None,
            flags: EntryFlags::TOMBSTONE,
            seq: 0,
        }
    }

    /// Stamp a pre-assigned sequence number onto this entry.
    ///
    /// Used on the secondary path, where entries arrive already carrying the
    /// sequence number the primary assigned.
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    pub(crate) fn assign_seq(&mut self, seq: u64) {
        self.seq = seq;
    }

    /// Type discriminator this entry belongs to.
    pub fn kind(&self) -> &T {
        &self.kind
    }

    /// Key within the type.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Value payload; absent for tombstones.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Metadata flags.
    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    /// Replication sequence number; zero until assigned.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Check if this entry is a tombstone (deleted).
    pub fn is_tombstone(&self) -> bool {
        self.flags.contains(EntryFlags::TOMBSTONE)
    }
}
