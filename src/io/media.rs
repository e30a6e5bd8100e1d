// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Decodes local image files and icon bytes into RGBA pixels suitable for
//! uploading as egui textures, and decides which files of a picked folder
//! are annotatable.

use anyhow::{Context, Result};
use std::path::Path;

/// Raster formats offered for annotation.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LoadedImage {
    pub fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

impl From<image::DynamicImage> for LoadedImage {
    fn from(img: image::DynamicImage) -> Self {
        let rgba = img.into_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }
}

/// Decode an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path).with_context(|| format!("cannot decode {}", path.display()))?;
    let loaded = LoadedImage::from(img);
    if loaded.width == 0 || loaded.height == 0 {
        anyhow::bail!("{} has no pixels", path.display());
    }
    Ok(loaded)
}

/// Decode an in-memory image (icons).
pub fn decode_bytes(bytes: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(bytes).context("cannot decode image data")?;
    Ok(LoadedImage::from(img))
}

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
