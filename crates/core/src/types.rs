//! Shared identifier and timestamp types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// UTC timestamp used across all records.
pub type Timestamp = DateTime<Utc>;

/// Process-unique annotation identifier.
///
/// UUID v7 is time-ordered, so sorting by id approximates creation order,
/// and generation is collision-free across concurrent writers.
pub type AnnotationId = Uuid;

/// Generate a fresh annotation id.
pub fn new_annotation_id() -> AnnotationId {
    Uuid::now_v7()
}

/// Sentinel user id recorded when a submission carries no user.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Normalize an optional submitted user id.
///
/// `None`, empty, and whitespace-only values all collapse to
/// [`ANONYMOUS_USER`]; a stored annotation never has a null user.
pub fn normalize_user_id(user_id: Option<&str>) -> String {
    match user_id {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => ANONYMOUS_USER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_present_user() {
        assert_eq!(normalize_user_id(Some("user-7")), "user-7");
        assert_eq!(normalize_user_id(Some("  padded  ")), "padded");
    }

    #[test]
    fn normalize_missing_user_is_anonymous() {
        assert_eq!(normalize_user_id(None), ANONYMOUS_USER);
        assert_eq!(normalize_user_id(Some("")), ANONYMOUS_USER);
        assert_eq!(normalize_user_id(Some("   ")), ANONYMOUS_USER);
    }

    #[test]
    fn annotation_ids_are_unique_and_ordered() {
        let a = new_annotation_id();
        let b = new_annotation_id();
        assert_ne!(a, b);
        // v7 ids generated in sequence sort in generation order.
        assert!(a < b);
    }
}
