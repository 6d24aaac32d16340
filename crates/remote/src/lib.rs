//! Remote store adapters.
//!
//! Two adapter shapes sit behind the replication pipeline:
//!
//! - a **primary** document-oriented store ([`DocumentStore`]) with
//!   per-record writes, bulk reads, and server-side aggregation;
//! - a **secondary** blob-oriented store ([`SnapshotStore`]) that only
//!   understands whole-collection snapshots (last write wins).
//!
//! Both are wrapped in availability enums ([`PrimaryRemote`],
//! [`SecondaryRemote`]): an adapter whose credentials were absent at process
//! start is `Unavailable` and every operation on it is a no-op returning an
//! empty result, so the rest of the pipeline never null-checks a concrete
//! client. Running with neither adapter configured (local-only mode) is a
//! fully supported steady state, not an error.

pub mod config;
pub mod document;
pub mod error;
pub mod memory;
pub mod rest;
pub mod s3;
pub mod snapshot;

pub use config::RemoteConfig;
pub use document::{DocumentStore, PrimaryRemote};
pub use error::{RemoteError, RemoteResult};
pub use snapshot::{Collection, SecondaryRemote, SnapshotStore};
