//! Weft - volatile replicated state table for actor services.
//!
//! Weft holds the authoritative in-memory state of a primary replica while
//! replication to secondaries is in flight. Mutations arrive in batches
//! tagged with monotonically increasing sequence numbers assigned by an
//! external replicator, wait in a staging area until the replicator
//! acknowledges them, and then advance into the committed view strictly in
//! sequence order, whole batches at a time, even when acknowledgements
//! arrive out of order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Replicator                             │
//! │        (assigns sequence numbers, drives prepare/commit)        │
//! └─────────────────────────────────────────────────────────────────┘
//!          │ prepare(batch, seq)              │ commit(seq, failure?)
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Staging list                            │
//! │        pending batches, ascending by sequence number            │
//! └─────────────────────────────────────────────────────────────────┘
//!                      │ drain (contiguous acknowledged prefix)
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Committed view                           │
//! │     ordered entry list │ per-type key index │ tombstones        │
//! └─────────────────────────────────────────────────────────────────┘
//!          │ try_get / keys / values          │ snapshots
//! ┌─────────────────────────────────────────────────────────────────┐
//! │             Readers and build (state transfer) cursors          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::error`] - Error types
//! - [`core::config`] - Replicator and state-provider settings
//!
//! ## State
//! - [`state::entry`] - State entry records
//! - [`state::context`] - Replication group tracking and commit completion
//! - [`state::table`] - The state table facade
//! - [`state::snapshot`] - Snapshot cursor for state transfer
//!
//! ## Naming
//! - [`naming`] - Canonical service-name derivation
//!
//! # Key Guarantees
//!
//! - Entries become visible in ascending sequence order with no holes, even
//!   when replication acknowledgements arrive out of order.
//! - A prepared batch commits atomically: readers see all of its entries or
//!   none of them.
//! - A batch whose replication failed never reaches the committed view; the
//!   failure surfaces through that batch's commit handle.
//! - Snapshots are point-in-time copies bounded by a sequence number and
//!   never observe a torn batch.
//! - Completion signals fire only after the write gate is released, so a
//!   waiter may call straight back into the table.

// Core infrastructure
pub mod core;

// Service-name derivation
pub mod naming;

// State table
pub mod state;

// Re-exports for convenience
pub use self::core::{config, error};
pub use self::core::config::{
    ReplicatorConfig, ReplicatorSecurityConfig, ServiceSettings, StateProviderConfig,
};
pub use self::core::error::{WeftError, WeftResult};
pub use state::context::CommitWait;
pub use state::entry::{EntryFlags, StateEntry};
pub use state::snapshot::SnapshotCursor;
pub use state::table::{StateTable, TableStats};
