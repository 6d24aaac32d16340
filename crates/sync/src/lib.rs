//! Replication and recovery.
//!
//! [`Replicator`] drives the per-write pipeline: synchronous local commit,
//! then fire-and-forget replication to the primary document tier and
//! snapshot backup to the secondary tier. [`recovery`] decides at startup
//! whether to trust local data or materialize a remote snapshot.

pub mod recovery;
pub mod replicator;
pub mod status;

pub use recovery::{recover, RecoveryDecision, RecoveryReport};
pub use replicator::{Replicator, SaveReceipt, StorageTier, WipeOutcome};
pub use status::{ReplicationLog, WriteState};
