//! Ordered entry lists backing the state table.
//!
//! Both lists are ordered maps keyed by `(seq, ord)`: every entry of one
//! prepared batch shares a sequence number, and the ordinal keeps batch
//! entries distinct and in submission order. The map key doubles as a stable
//! node position, so the committed index can unlink a replaced node directly
//! without walking the list.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use super::context::ReplicationContext;
use super::entry::StateEntry;

/// Stable position of a node within an ordered entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodePos {
    seq: u64,
    ord: u64,
}

/// A staged entry together with its replication group.
pub(crate) struct StagingNode<T, K, V> {
    pub(crate) entry: Arc<StateEntry<T, K, V>>,
    pub(crate) context: Arc<ReplicationContext>,
}

/// Pending entries in ascending sequence order; the head is the oldest.
pub(crate) struct StagingList<T, K, V> {
    nodes: BTreeMap<NodePos, StagingNode<T, K, V>>,
    next_ord: u64,
}

impl<T, K, V> StagingList<T, K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_ord: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Append a staged entry; sequence numbers must be non-decreasing.
    pub(crate) fn push_back(
        &mut self,
        entry: Arc<StateEntry<T, K, V>>,
        context: Arc<ReplicationContext>,
    ) {
        let pos = NodePos {
            seq: entry.seq(),
            ord: self.next_ord,
        };
        self.next_ord += 1;
        debug_assert!(
            self.nodes.last_key_value().map_or(true, |(last, _)| *last < pos),
            "staging order violated at seq {}",
            entry.seq()
        );
        self.nodes.insert(pos, StagingNode { entry, context });
    }

    pub(crate) fn head_seq(&self) -> Option<u64> {
        self.nodes.first_key_value().map(|(pos, _)| pos.seq)
    }

    /// Pop the head node if its replication group has completed.
    pub(crate) fn pop_front_if_done(&mut self) -> Option<StagingNode<T, K, V>> {
        match self.nodes.first_key_value() {
            Some((_, node)) if node.context.is_done() => {
                self.nodes.pop_first().map(|(_, node)| node)
            }
            _ => None,
        }
    }

    pub(crate) fn last_seq(&self) -> Option<u64> {
        self.nodes.last_key_value().map(|(pos, _)| pos.seq)
    }

    /// Shallow-copy entries with `seq <= max_seq`, in list order.
    pub(crate) fn copy_up_to(&self, max_seq: u64) -> Vec<Arc<StateEntry<T, K, V>>> {
        let bound = NodePos {
            seq: max_seq,
            ord: u64::MAX,
        };
        self.nodes
            .range(..=bound)
            .map(|(_, node)| Arc::clone(&node.entry))
            .collect()
    }
}

/// The committed view: an ordered list of committed entries plus a per-type
/// key index over the live ones.
///
/// The list holds at most one node per live (type, key) and at most one
/// trailing tombstone. The tombstone keeps the last committed sequence
/// number observable after a delete; the next committed write evicts it.
pub(crate) struct CommittedView<T, K, V> {
    nodes: BTreeMap<NodePos, Arc<StateEntry<T, K, V>>>,
    index: HashMap<T, HashMap<K, NodePos>>,
    next_ord: u64,
}

impl<T, K, V> CommittedView<T, K, V>
where
    T: Clone + Eq + Hash,
    K: Clone + Eq + Hash + Ord,
{
    pub(crate) fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            index: HashMap::new(),
            next_ord: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn live_len(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    pub(crate) fn last_seq(&self) -> Option<u64> {
        self.nodes.last_key_value().map(|(pos, _)| pos.seq)
    }

    /// Install one committed entry.
    ///
    /// A tombstone for a type this view has never seen is a no-op. A prior
    /// live entry for the same key is unlinked first, and a trailing
    /// tombstone is evicted before the new node is appended.
    pub(crate) fn apply(&mut self, entry: Arc<StateEntry<T, K, V>>) {
        if entry.is_tombstone() && !self.index.contains_key(entry.kind()) {
            return;
        }
        let by_key = self.index.entry(entry.kind().clone()).or_default();
        if let Some(old) = by_key.remove(entry.key()) {
            self.nodes.remove(&old);
        }
        if let Some((&tail, node)) = self.nodes.last_key_value() {
            if node.is_tombstone() {
                self.nodes.remove(&tail);
            }
        }
        let pos = NodePos {
            seq: entry.seq(),
            ord: self.next_ord,
        };
        self.next_ord += 1;
        if !entry.is_tombstone() {
            by_key.insert(entry.key().clone(), pos);
        }
        self.nodes.insert(pos, entry);
    }

    pub(crate) fn get(&self, kind: &T, key: &K) -> Option<&Arc<StateEntry<T, K, V>>> {
        let pos = self.index.get(kind)?.get(key)?;
        self.nodes.get(pos)
    }

    /// Keys of the live entries of one type, in no particular order.
    pub(crate) fn keys(&self, kind: &T) -> Vec<K> {
        self.index
            .get(kind)
            .map_or_else(Vec::new, |by_key| by_key.keys().cloned().collect())
    }

    /// Live entries of one type, in no particular order.
    pub(crate) fn values(&self, kind: &T) -> Vec<Arc<StateEntry<T, K, V>>> {
        match self.index.get(kind) {
            Some(by_key) => by_key
                .values()
                .filter_map(|pos| self.nodes.get(pos))
                .map(Arc::clone)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Shallow-copy the live entries of one type, in list order.
    pub(crate) fn entries_of_kind(&self, kind: &T) -> Vec<Arc<StateEntry<T, K, V>>> {
        self.nodes
            .values()
            .filter(|entry| !entry.is_tombstone() && entry.kind() == kind)
            .map(Arc::clone)
            .collect()
    }

    /// Copy the committed prefix with `seq <= max_seq`, in list order.
    ///
    /// Returns the buffer and the highest sequence number copied (zero when
    /// nothing qualified).
    pub(crate) fn copy_up_to(&self, max_seq: u64) -> (Vec<Arc<StateEntry<T, K, V>>>, u64) {
        let bound = NodePos {
            seq: max_seq,
            ord: u64::MAX,
        };
        let mut highest = 0;
        let mut buf = Vec::new();
        for (pos, entry) in self.nodes.range(..=bound) {
            highest = pos.seq;
            buf.push(Arc::clone(entry));
        }
        (buf, highest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Entry = StateEntry<&'static str, &'static str, u32>;

    fn live(key: &'static str, value: u32, seq: u64) -> Arc<Entry> {
        Arc::new(StateEntry::put("T", key, value).with_seq(seq))
    }

    fn gone(key: &'static str, seq: u64) -> Arc<Entry> {
        Arc::new(StateEntry::tombstone("T", key).with_seq(seq))
    }

    #[test]
    fn apply_replaces_prior_live_entry() {
        let mut view = CommittedView::new();
        view.apply(live("a", 1, 10));
        view.apply(live("a", 2, 20));

        assert_eq!(view.len(), 1);
        assert_eq!(view.live_len(), 1);
        assert_eq!(view.get(&"T", &"a").unwrap().seq(), 20);
        assert_eq!(view.last_seq(), Some(20));
    }

    #[test]
    fn tombstone_for_unknown_type_is_noop() {
        let mut view: CommittedView<&str, &str, u32> = CommittedView::new();
        view.apply(gone("a", 10));

        assert_eq!(view.len(), 0);
        assert_eq!(view.last_seq(), None);
    }

    #[test]
    fn trailing_tombstone_keeps_last_seq_until_next_commit() {
        let mut view = CommittedView::new();
        view.apply(live("a", 1, 10));
        view.apply(gone("a", 20));

        assert_eq!(view.len(), 1);
        assert_eq!(view.live_len(), 0);
        assert_eq!(view.last_seq(), Some(20));
        assert!(view.get(&"T", &"a").is_none());

        view.apply(live("b", 2, 30));
        assert_eq!(view.len(), 1);
        assert_eq!(view.last_seq(), Some(30));
    }

    #[test]
    fn copy_up_to_stops_at_bound() {
        let mut view = CommittedView::new();
        view.apply(live("a", 1, 10));
        view.apply(live("b", 2, 20));
        view.apply(live("c", 3, 30));

        let (buf, highest) = view.copy_up_to(25);
        assert_eq!(buf.len(), 2);
        assert_eq!(highest, 20);
        assert_eq!(buf[0].seq(), 10);
        assert_eq!(buf[1].seq(), 20);
    }
}
