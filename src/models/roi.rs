// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region of interest data structures.
//!
//! An ROI is an axis-aligned rectangle in image pixel space plus the
//! property options that were selected when it was drawn. The serialized
//! form is the annotation file format exchanged with the backend:
//!
//! ```json
//! {"x": 10.0, "y": 12.5, "w": 40.0, "h": 22.0,
//!  "properties": {"Class": {"name": "Cell", "icon": "cell.png"}},
//!  "version": 2}
//! ```

use super::properties::{label_of, PropertyAssignment};
use crate::util::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Current ROI serialization version. Version 1 files stored property
/// options either as plain names or as objects and carried no version field.
pub const ROI_FORMAT_VERSION: u32 = 2;

fn legacy_version() -> u32 {
    1
}

/// An annotated rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default)]
    pub properties: PropertyAssignment,
    #[serde(default = "legacy_version")]
    pub version: u32,
}

impl Roi {
    pub fn new(rect: Rect, properties: PropertyAssignment) -> Self {
        Self {
            rect,
            properties,
            version: ROI_FORMAT_VERSION,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains(p)
    }

    /// Name shown next to the rectangle.
    pub fn label(&self) -> &str {
        label_of(&self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::properties::{PropertyOption, UNTITLED_LABEL};

    #[test]
    fn test_wire_shape() {
        let mut props = PropertyAssignment::new();
        props.insert("Class".to_string(), PropertyOption::new("Cell").with_icon("cell.png"));
        let roi = Roi::new(Rect::new(1.0, 2.0, 30.0, 40.0), props);

        let value = serde_json::to_value(&roi).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "x": 1.0, "y": 2.0, "w": 30.0, "h": 40.0,
                "properties": {"Class": {"name": "Cell", "icon": "cell.png"}},
                "version": 2
            })
        );
    }

    #[test]
    fn test_reads_legacy_string_properties() {
        let json = r#"{"x": 5, "y": 6, "w": 20, "h": 30, "properties": {"Class": "Debris"}}"#;
        let roi: Roi = serde_json::from_str(json).unwrap();

        assert_eq!(roi.version, 1);
        assert_eq!(roi.rect, Rect::new(5.0, 6.0, 20.0, 30.0));
        assert_eq!(roi.label(), "Debris");
        assert_eq!(roi.properties.get("Class").unwrap().icon, None);
    }

    #[test]
    fn test_missing_properties_is_untitled() {
        let roi: Roi = serde_json::from_str(r#"{"x": 0, "y": 0, "w": 9, "h": 9}"#).unwrap();
        assert!(roi.properties.is_empty());
        assert_eq!(roi.label(), UNTITLED_LABEL);
    }
}
