//! Calcmark domain core.
//!
//! Canonical record model for annotations and their aggregate statistics,
//! plus mask payload decoding. Everything that crosses a storage boundary
//! (local store, document adapter, snapshot adapter) is defined here so all
//! tiers share one serialization contract.

pub mod annotation;
pub mod error;
pub mod mask;
pub mod stats;
pub mod types;
