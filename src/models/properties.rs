// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Classification properties.
//!
//! A [`PropertySchema`] lists, per property name, the options a user can
//! choose from. The options currently selected in the properties panel form
//! a [`PropertyAssignment`], and every committed ROI keeps its own snapshot
//! of that assignment.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property whose selected option names the ROI on the canvas.
pub const LABEL_PROPERTY: &str = "Class";

/// Label used when an ROI has no `Class` option.
pub const UNTITLED_LABEL: &str = "Untitled";

/// One selectable option of a property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "OptionRepr")]
pub struct PropertyOption {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PropertyOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Accepted on-disk shapes of an option: older annotation files stored only
/// the option name.
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        icon: Option<String>,
    },
}

impl From<OptionRepr> for PropertyOption {
    fn from(repr: OptionRepr) -> Self {
        match repr {
            OptionRepr::Name(name) => Self { name, icon: None },
            OptionRepr::Full { name, icon } => Self { name, icon },
        }
    }
}

/// The selected option per property, attached to each ROI. Keeps document
/// order, which drives the panel layout and icon stacking.
pub type PropertyAssignment = IndexMap<String, PropertyOption>;

/// Property name to its ordered list of options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySchema {
    properties: IndexMap<String, Vec<PropertyOption>>,
}

impl PropertySchema {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyOption])> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn options(&self, property: &str) -> Option<&[PropertyOption]> {
        self.properties.get(property).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// First option of every property. Properties without options get an
    /// empty option so that every property is always assigned.
    pub fn default_assignment(&self) -> PropertyAssignment {
        self.properties
            .iter()
            .map(|(name, options)| (name.clone(), options.first().cloned().unwrap_or_default()))
            .collect()
    }

    /// Every distinct icon referenced by the schema, in first-seen order.
    pub fn icon_names(&self) -> Vec<String> {
        let mut icons: Vec<String> = Vec::new();
        for option in self.properties.values().flatten() {
            if let Some(icon) = &option.icon {
                if !icons.contains(icon) {
                    icons.push(icon.clone());
                }
            }
        }
        icons
    }
}

/// Canvas label for an assignment.
pub fn label_of(properties: &PropertyAssignment) -> &str {
    properties
        .get(LABEL_PROPERTY)
        .map(|o| o.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNTITLED_LABEL)
}
