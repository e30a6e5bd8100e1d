// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation store contract.
//!
//! The editor never talks to a server or a directory directly; everything
//! that crosses the persistence boundary goes through [`Backend`]. Images
//! stay on the client, only ROI lists and the property schema travel.

use crate::models::properties::PropertySchema;
use crate::models::roi::Roi;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors reported by a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a failure status.
    #[error("request failed with status {code}: {description}")]
    Status { code: u16, description: String },

    /// The backend refused the request and said why.
    #[error("{0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-file annotation state shown in the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationStatus {
    /// Saved with at least one ROI.
    Annotated,
    /// Saved with an empty ROI list.
    Empty,
    /// Never saved, or the backend does not know.
    #[default]
    Unknown,
}

impl AnnotationStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            AnnotationStatus::Annotated => "✅",
            AnnotationStatus::Empty => "🟡",
            AnnotationStatus::Unknown => "📄",
        }
    }

    /// Status of a stored ROI list.
    pub fn of_list(len: usize) -> Self {
        if len == 0 {
            AnnotationStatus::Empty
        } else {
            AnnotationStatus::Annotated
        }
    }
}

/// Status value as sent by the server. Older servers answer with a plain
/// "has an annotation file" flag.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Text(String),
    Flag(bool),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for AnnotationStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StatusRepr::deserialize(deserializer)? {
            StatusRepr::Text(s) if s == "annotated" => AnnotationStatus::Annotated,
            StatusRepr::Text(s) if s == "empty" => AnnotationStatus::Empty,
            StatusRepr::Flag(true) => AnnotationStatus::Annotated,
            StatusRepr::Text(_) | StatusRepr::Flag(false) | StatusRepr::Other(_) => {
                AnnotationStatus::Unknown
            }
        })
    }
}

/// Persistence operations used by the session.
pub trait Backend: Send + Sync {
    /// Default property schema.
    fn properties_config(&self) -> Result<PropertySchema, BackendError>;

    /// Annotation status for each name. Names missing from the result are
    /// [`AnnotationStatus::Unknown`].
    fn annotation_status(
        &self,
        filenames: &[String],
    ) -> Result<HashMap<String, AnnotationStatus>, BackendError>;

    /// Stored ROIs of one image. "Nothing stored yet" is an empty list.
    fn load_annotations(&self, filename: &str) -> Result<Vec<Roi>, BackendError>;

    fn save_annotations(&self, filename: &str, rois: &[Roi]) -> Result<(), BackendError>;

    /// Redirect where annotations are stored. Returns the effective path.
    fn set_annotation_dir(&self, path: &str) -> Result<String, BackendError>;

    /// Raw bytes of an icon referenced by the schema.
    fn icon(&self, name: &str) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        let json = r#"{"a.png": "annotated", "b.png": "empty", "c.png": true,
                       "d.png": false, "e.png": null, "f.png": "weird"}"#;
        let map: HashMap<String, AnnotationStatus> = serde_json::from_str(json).unwrap();

        assert_eq!(map["a.png"], AnnotationStatus::Annotated);
        assert_eq!(map["b.png"], AnnotationStatus::Empty);
        assert_eq!(map["c.png"], AnnotationStatus::Annotated);
        assert_eq!(map["d.png"], AnnotationStatus::Unknown);
        assert_eq!(map["e.png"], AnnotationStatus::Unknown);
        assert_eq!(map["f.png"], AnnotationStatus::Unknown);
    }

    #[test]
    fn test_status_of_list() {
        assert_eq!(AnnotationStatus::of_list(0), AnnotationStatus::Empty);
        assert_eq!(AnnotationStatus::of_list(3), AnnotationStatus::Annotated);
    }
}
