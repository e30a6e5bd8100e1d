// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User-supplied property schema files.
//!
//! Schemas can be written in JSON or YAML; the format is picked from the
//! file extension.

use crate::models::properties::PropertySchema;
use anyhow::{Context, Result};
use std::path::Path;

/// Import a property schema from a `.json`, `.yaml` or `.yml` file.
pub fn import_schema(path: &Path) -> Result<PropertySchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yaml") | Some("yml") => import_yaml(&text),
        _ => import_json(&text),
    }
}

/// Parse a property schema from JSON text.
pub fn import_json(text: &str) -> Result<PropertySchema> {
    let schema: PropertySchema =
        serde_json::from_str(text).context("Failed to parse JSON from properties file")?;
    validate(schema)
}

/// Parse a property schema from YAML text.
pub fn import_yaml(text: &str) -> Result<PropertySchema> {
    let schema: PropertySchema =
        serde_yaml::from_str(text).context("Failed to parse YAML from properties file")?;
    validate(schema)
}

fn validate(schema: PropertySchema) -> Result<PropertySchema> {
    if schema.is_empty() {
        anyhow::bail!("properties file defines no properties");
    }
    for (name, options) in schema.iter() {
        if options.iter().any(|o| o.name.trim().is_empty()) {
            anyhow::bail!("property \"{}\" has an option without a name", name);
        }
    }
    Ok(schema)
}
