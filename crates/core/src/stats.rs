//! Aggregate statistics records.
//!
//! One [`UserStat`] per user and one [`ImageStat`] per image, maintained
//! incrementally on every append and rebuildable by a full scan of the
//! annotation log. Counters are monotonically non-decreasing and eventually
//! equal the matching record counts in the local store.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Source recorded for images that were never registered by the catalog.
pub const UNKNOWN_IMAGE_SOURCE: &str = "unknown";

/// Per-user annotation counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStat {
    pub user_id: String,
    pub first_annotation_at: Timestamp,
    pub last_annotation_at: Timestamp,
    pub total_annotations: i64,
}

/// Per-image annotation counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStat {
    pub image_id: String,
    pub filename: String,
    /// `"test"`, `"annotate"`, or `"unknown"` when never registered.
    pub source: String,
    pub annotation_count: i64,
}

/// Whole-store aggregate counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_annotations: i64,
    pub unique_users: i64,
    pub annotated_images: i64,
    pub test_annotations: i64,
    pub direct_annotations: i64,
}

impl AggregateStats {
    /// True when every counter is zero (an empty store).
    pub fn is_empty(&self) -> bool {
        self.total_annotations == 0 && self.unique_users == 0 && self.annotated_images == 0
    }
}
