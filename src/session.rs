// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session.
//!
//! The session owns everything tied to the image being annotated: its
//! name and size, the [`Editor`] (view + ROIs + interaction mode), the
//! table of local image files, their annotation status and the property
//! schema with the current option selection.
//!
//! Operations that need the backend or the decoder do not perform I/O
//! themselves. They return a [`Job`] for the worker and the matching
//! `finish_*` method applies the outcome once it arrives. Switching images
//! builds a single job that saves the previous image's unsaved edits before
//! decoding the next one, so no edit is ever dropped between images.

use crate::editor::{Editor, Effect, InputEvent};
use crate::io::backend::{AnnotationStatus, BackendError};
use crate::io::media::{self, LoadedImage};
use crate::io::serialization;
use crate::models::properties::{PropertyAssignment, PropertySchema};
use crate::models::roi::Roi;
use crate::worker::{Job, SaveOutcome, SaveRequest, SwitchOutcome, SwitchRequest};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please select an image first.")]
    NoImage,

    #[error("Unknown image: {0}")]
    UnknownImage(String),

    #[error("Could not open {filename}: {message}")]
    Decode { filename: String, message: String },

    #[error("Failed to save annotations for {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: BackendError,
    },

    #[error("Error setting directory: {0}")]
    AnnotationDir(String),

    #[error("Failed to load properties: {0}")]
    Schema(String),
}

/// The image currently on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl CurrentImage {
    pub fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

/// What the user should see after a finished save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReport {
    Saved { filename: String },
    /// Save of an image that is no longer open; nothing to show.
    Background,
}

pub struct Session {
    pub editor: Editor,
    current: Option<CurrentImage>,
    /// Image whose switch job is in flight.
    pending: Option<String>,
    /// Local image files by name. Never uploaded.
    files: BTreeMap<String, PathBuf>,
    status: HashMap<String, AnnotationStatus>,
    schema: PropertySchema,
    selection: PropertyAssignment,
    viewport: (f64, f64),
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            editor: Editor::new(),
            current: None,
            pending: None,
            files: BTreeMap::new(),
            status: HashMap::new(),
            schema: PropertySchema::default(),
            selection: PropertyAssignment::new(),
            viewport: (800.0, 600.0),
        }
    }

    pub fn current(&self) -> Option<&CurrentImage> {
        self.current.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn has_image(&self) -> bool {
        self.current.is_some()
    }

    /// Local file names in display order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn status_of(&self, filename: &str) -> AnnotationStatus {
        self.status.get(filename).copied().unwrap_or_default()
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn selection(&self) -> &PropertyAssignment {
        &self.selection
    }

    pub fn is_dirty(&self) -> bool {
        self.has_image() && self.editor.rois.is_dirty()
    }

    /// Canvas size in screen pixels; used by zoom-to-fit.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.viewport = (width, height);
        }
    }

    // --- File set -------------------------------------------------------

    /// Replace the working file set with the supported images among
    /// `paths`. Returns the jobs to run: a save of the open image when it
    /// has unsaved edits, followed by a status query.
    pub fn load_file_set(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> Vec<Job> {
        let mut jobs = Vec::new();
        if let Some(save) = self.unsaved_edits() {
            jobs.push(Job::Save(save));
        }

        self.reset();
        for path in paths {
            if !media::is_supported_image(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.files.insert(name.to_string(), path.clone());
            }
        }
        log::info!("Loaded {} images", self.files.len());

        jobs.extend(self.status_job());
        jobs
    }

    /// Status query for the current file set.
    pub fn status_job(&self) -> Option<Job> {
        if self.files.is_empty() {
            return None;
        }
        Some(Job::Status(self.files.keys().cloned().collect()))
    }

    pub fn finish_status(
        &mut self,
        result: Result<HashMap<String, AnnotationStatus>, BackendError>,
    ) {
        match result {
            Ok(status) => {
                self.status = status
                    .into_iter()
                    .filter(|(name, _)| self.files.contains_key(name))
                    .collect();
            }
            Err(e) => log::warn!("Could not fetch annotation status: {}", e),
        }
    }

    fn reset(&mut self) {
        self.editor = Editor::new();
        self.current = None;
        self.pending = None;
        self.files.clear();
        self.status.clear();
    }

    // --- Image switching ------------------------------------------------

    /// Start opening `filename`. Returns `Ok(None)` when it is already the
    /// current image.
    pub fn select_image(&mut self, filename: &str) -> Result<Option<Job>, SessionError> {
        let path = self
            .files
            .get(filename)
            .cloned()
            .ok_or_else(|| SessionError::UnknownImage(filename.to_string()))?;

        if self.current_name() == Some(filename) {
            self.pending = None;
            return Ok(None);
        }
        if self.pending.as_deref() == Some(filename) {
            return Ok(None);
        }

        self.editor.reset_interaction();
        let save = self.unsaved_edits();
        self.pending = Some(filename.to_string());
        log::info!("Switching to {}", filename);
        Ok(Some(Job::Switch(SwitchRequest {
            save,
            filename: filename.to_string(),
            path,
        })))
    }

    /// Apply a finished switch. On success returns the decoded image for
    /// upload to the GPU. Outcomes of superseded switches are ignored.
    pub fn finish_switch(
        &mut self,
        outcome: SwitchOutcome,
    ) -> Result<Option<LoadedImage>, SessionError> {
        if let Some(saved) = outcome.saved {
            // Non-fatal: the switch goes ahead and the failure is only logged.
            if let Err(e) = self.finish_save(saved) {
                log::warn!("{}", e);
            }
        }

        if self.pending.as_deref() != Some(outcome.filename.as_str()) {
            log::debug!("Dropping stale switch result for {}", outcome.filename);
            return Ok(None);
        }
        self.pending = None;

        let (image, rois) = outcome.loaded.map_err(|message| {
            log::error!("Failed to load image {}: {}", outcome.filename, message);
            SessionError::Decode {
                filename: outcome.filename.clone(),
                message,
            }
        })?;

        self.editor.open(rois, image.size(), self.viewport);
        self.current = Some(CurrentImage {
            name: outcome.filename,
            width: image.width,
            height: image.height,
        });
        log::info!(
            "Opened {} ({}x{}) with {} ROIs",
            self.current_name().unwrap_or_default(),
            image.width,
            image.height,
            self.editor.rois.len()
        );
        Ok(Some(image))
    }

    /// Name of the image after (`step = 1`) or before (`step = -1`) the
    /// current one, wrapping around.
    pub fn neighbour(&self, step: isize) -> Option<String> {
        let names: Vec<&String> = self.files.keys().collect();
        if names.is_empty() {
            return None;
        }
        let anchor = self.pending.as_deref().or(self.current_name());
        let index = match anchor.and_then(|a| names.iter().position(|n| n.as_str() == a)) {
            Some(i) => (i as isize + step).rem_euclid(names.len() as isize) as usize,
            None => 0,
        };
        Some(names[index].clone())
    }

    // --- Saving ---------------------------------------------------------

    fn save_request(&self) -> Option<SaveRequest> {
        let current = self.current.as_ref()?;
        Some(SaveRequest {
            filename: current.name.clone(),
            rois: self.editor.rois.rois().to_vec(),
            revision: self.editor.rois.revision(),
        })
    }

    /// Save of the current image, only when it has edits the backend has
    /// not seen. An untouched image is never written back, so a list that
    /// failed to load cannot overwrite the stored one.
    fn unsaved_edits(&self) -> Option<SaveRequest> {
        self.save_request().filter(|_| self.is_dirty())
    }

    /// Persist the current image's ROIs.
    pub fn save_current(&self) -> Result<Job, SessionError> {
        self.save_request().map(Job::Save).ok_or(SessionError::NoImage)
    }

    pub fn finish_save(&mut self, outcome: SaveOutcome) -> Result<SaveReport, SessionError> {
        let is_current = self.current_name() == Some(outcome.filename.as_str());
        match outcome.result {
            Ok(()) => {
                self.status.insert(
                    outcome.filename.clone(),
                    AnnotationStatus::of_list(outcome.saved_len),
                );
                if is_current {
                    self.editor.rois.mark_saved(outcome.revision);
                    Ok(SaveReport::Saved {
                        filename: outcome.filename,
                    })
                } else {
                    Ok(SaveReport::Background)
                }
            }
            Err(source) => Err(SessionError::Save {
                filename: outcome.filename,
                source,
            }),
        }
    }

    // --- Canvas ---------------------------------------------------------

    /// Route a canvas event to the editor. Input is ignored while a switch
    /// is in flight, since the ROIs on screen have already been handed to
    /// the save.
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<Effect> {
        let has_image = self.has_image() && self.pending.is_none();
        self.editor.handle(event, has_image, &self.selection)
    }

    pub fn confirm_delete(&mut self, index: usize, roi: &Roi) -> Option<Roi> {
        self.editor.confirm_delete(index, roi)
    }

    /// Fit the current image into the viewport again.
    pub fn reset_view(&mut self) {
        if let Some(current) = &self.current {
            let (w, h) = current.size();
            self.editor
                .view
                .zoom_to_fit(w, h, self.viewport.0, self.viewport.1);
        }
    }

    // --- Properties -----------------------------------------------------

    /// Install a new schema wholesale. The selection resets to defaults;
    /// existing ROIs keep their snapshots. Returns the icons to fetch.
    pub fn set_schema(&mut self, schema: PropertySchema) -> Vec<String> {
        self.selection = schema.default_assignment();
        self.schema = schema;
        self.schema.icon_names()
    }

    pub fn finish_schema(
        &mut self,
        result: Result<PropertySchema, BackendError>,
    ) -> Result<Vec<String>, SessionError> {
        match result {
            Ok(schema) => Ok(self.set_schema(schema)),
            Err(e) => {
                log::error!("Error loading default properties: {}", e);
                Err(SessionError::Schema(e.to_string()))
            }
        }
    }

    /// Replace the schema from a user file. On any error the current schema
    /// stays active.
    pub fn load_schema_file(&mut self, path: &Path) -> Result<Vec<String>, SessionError> {
        match serialization::import_schema(path) {
            Ok(schema) => {
                log::info!("Loaded properties from {}", path.display());
                Ok(self.set_schema(schema))
            }
            Err(e) => {
                log::error!("Failed to load properties from {}: {:#}", path.display(), e);
                Err(SessionError::Schema(format!("{:#}", e)))
            }
        }
    }

    /// Select option `index` of `property` for future ROIs.
    pub fn select_option(&mut self, property: &str, index: usize) -> bool {
        let Some(option) = self.schema.options(property).and_then(|o| o.get(index)) else {
            return false;
        };
        self.selection.insert(property.to_string(), option.clone());
        true
    }

    // --- Annotation directory -------------------------------------------

    pub fn set_annotation_dir(&self, path: &str) -> Option<Job> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        Some(Job::SetAnnotationDir(path.to_string()))
    }

    /// Returns the new directory and the status refresh to run.
    pub fn finish_annotation_dir(
        &mut self,
        result: Result<String, BackendError>,
    ) -> Result<(String, Option<Job>), SessionError> {
        match result {
            Ok(path) => {
                log::info!("Annotation directory set to {}", path);
                Ok((path, self.status_job()))
            }
            Err(BackendError::Rejected(description)) => {
                Err(SessionError::AnnotationDir(description))
            }
            Err(e) => Err(SessionError::AnnotationDir(e.to_string())),
        }
    }
}
