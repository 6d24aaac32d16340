//! Annotation record model and submission DTO.
//!
//! An [`Annotation`] is immutable once created: the log is append-only, so
//! `updated_at` equals `created_at` unless a record was backfilled during a
//! migration. Serialization is snake_case JSON and must round-trip through
//! every storage tier without losing `id`, `image_id`, `user_id`, `source`,
//! `original_image`, or `created_at`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::mask::MaskReference;
use crate::types::{AnnotationId, Timestamp};

/// Provenance of an annotation submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Calibration flow against known test images.
    Test,
    /// Regular annotation flow.
    Annotate,
}

impl Source {
    /// Stable string form used in queries and per-source counters.
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Test => "test",
            Source::Annotate => "annotate",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "test" => Ok(Source::Test),
            "annotate" => Ok(Source::Annotate),
            other => Err(CoreError::Validation(format!(
                "Unknown annotation source '{other}'. Must be one of: test, annotate"
            ))),
        }
    }

    /// Derive the source from an image id prefix (`test-*` vs everything else).
    pub fn for_image_id(image_id: &str) -> Self {
        if image_id.starts_with("test-") {
            Source::Test
        } else {
            Source::Annotate
        }
    }
}

/// A single recorded region-of-interest annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: String,
    /// Never empty after normalization; anonymous submissions use the sentinel.
    pub user_id: String,
    pub source: Source,
    /// Display name of the source image; empty when unknown.
    #[serde(default)]
    pub original_image: String,
    pub mask: MaskReference,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Client submission for a new annotation, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnnotation {
    pub image_id: String,
    pub user_id: Option<String>,
    /// Base64 PNG mask, with or without a `data:image/png;base64,` prefix.
    pub mask_data: String,
    #[serde(default)]
    pub original_image: String,
}

impl NewAnnotation {
    /// Validate the submission: image id and mask data must be present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.image_id.trim().is_empty() {
            return Err(CoreError::Validation("image_id is required".into()));
        }
        if self.mask_data.trim().is_empty() {
            return Err(CoreError::Validation("Mask data is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskReference;
    use crate::types::new_annotation_id;
    use chrono::Utc;

    #[test]
    fn source_round_trips_through_str() {
        assert_eq!(Source::parse("test").unwrap(), Source::Test);
        assert_eq!(Source::parse("annotate").unwrap(), Source::Annotate);
        assert!(Source::parse("import").is_err());
        assert_eq!(Source::Test.as_str(), "test");
    }

    #[test]
    fn source_derived_from_image_prefix() {
        assert_eq!(Source::for_image_id("test-3"), Source::Test);
        assert_eq!(Source::for_image_id("annotate-12"), Source::Annotate);
        assert_eq!(Source::for_image_id("upload-9"), Source::Annotate);
    }

    #[test]
    fn annotation_json_round_trip_is_lossless() {
        let now = Utc::now();
        let original = Annotation {
            id: new_annotation_id(),
            image_id: "annotate-4".into(),
            user_id: "user-1".into(),
            source: Source::Annotate,
            original_image: "molar_04.jpg".into(),
            mask: MaskReference::File {
                filename: "annotate-4-1700000000.png".into(),
            },
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn validate_rejects_missing_mask() {
        let sub = NewAnnotation {
            image_id: "annotate-1".into(),
            user_id: None,
            mask_data: "".into(),
            original_image: String::new(),
        };
        assert!(sub.validate().is_err());
    }
}
