//! HTTP boundary for the annotation service.
//!
//! Thin layer over `calcmark-sync`: handlers validate and decode client
//! payloads, then delegate to the replicator and the local store. No storage
//! policy lives here.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
