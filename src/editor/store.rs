// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered ROI collection for the image currently open.

use crate::models::properties::PropertyAssignment;
use crate::models::roi::Roi;
use crate::util::geometry::{Point, Rect};

/// Rectangles whose width or height is not larger than this (in image
/// pixels) are treated as stray clicks and never stored.
pub const MIN_ROI_SIZE: f64 = 5.0;

/// ROIs in insertion order; later entries are drawn on top.
#[derive(Debug, Clone, Default)]
pub struct RoiStore {
    rois: Vec<Roi>,
    /// Bumped on every edit.
    revision: u64,
    /// Revision that is known to match the backend copy.
    saved_revision: u64,
}

impl RoiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rois(&self) -> &[Roi] {
        &self.rois
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Roi> {
        self.rois.get(index)
    }

    /// Append a new ROI. Returns `false` when the rectangle is too small.
    pub fn commit(&mut self, rect: Rect, properties: PropertyAssignment) -> bool {
        if !rect.exceeds(MIN_ROI_SIZE) {
            log::debug!("Discarded {:.1}x{:.1} rectangle", rect.w, rect.h);
            return false;
        }
        self.rois.push(Roi::new(rect, properties));
        self.revision += 1;
        true
    }

    /// Index of the most recently added ROI containing `world`.
    pub fn hit_test(&self, world: Point) -> Option<usize> {
        self.rois.iter().rposition(|roi| roi.contains(world))
    }

    pub fn delete(&mut self, index: usize) -> Option<Roi> {
        if index >= self.rois.len() {
            return None;
        }
        self.revision += 1;
        Some(self.rois.remove(index))
    }

    /// Swap in the ROI list of another image. The new list is considered
    /// saved.
    pub fn replace_all(&mut self, rois: Vec<Roi>) {
        self.rois = rois;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record that the list as of `revision` reached the backend.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision == self.revision {
            self.saved_revision = revision;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }
}
