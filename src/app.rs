// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Owns the [`Session`], the background [`Worker`] and the GPU textures,
//! routes UI actions to the session, hands the resulting jobs to the
//! worker and applies finished jobs at the start of every frame.

use crate::editor::{Effect, InputEvent};
use crate::io::backend::Backend;
use crate::models::roi::Roi;
use crate::session::{SaveReport, Session};
use crate::ui::canvas::{self, CanvasImage, IconTextures};
use crate::ui::{file_list, properties, toolbar};
use crate::worker::{Job, JobOutcome, Worker};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main application state.
pub struct AnnotatorApp {
    session: Session,
    worker: Worker,

    /// Texture of the current image
    image: Option<CanvasImage>,

    icons: IconTextures,

    /// Annotation directory text field
    annotation_dir_input: String,

    /// Whether a folder has been picked yet
    folder_picked: bool,

    /// ROI waiting for the user to confirm deletion
    pending_delete: Option<(usize, Roi)>,

    /// Message shown in a modal until dismissed
    notice: Option<String>,
}

impl AnnotatorApp {
    /// Create the application and request the default property schema.
    pub fn new(cc: &eframe::CreationContext<'_>, backend: Arc<dyn Backend>) -> Self {
        let ctx = cc.egui_ctx.clone();
        let worker = Worker::spawn(backend, Box::new(move || ctx.request_repaint()));
        worker.submit(Job::Schema);

        Self {
            session: Session::new(),
            worker,
            image: None,
            icons: IconTextures::default(),
            annotation_dir_input: String::new(),
            folder_picked: false,
            pending_delete: None,
            notice: None,
        }
    }

    fn submit_all(&self, jobs: impl IntoIterator<Item = Job>) {
        for job in jobs {
            self.worker.submit(job);
        }
    }

    fn refresh_status(&self) {
        self.submit_all(self.session.status_job());
    }

    /// Replace the icon cache with the icons of a new schema.
    fn request_icons(&mut self, names: Vec<String>) {
        self.icons.clear();
        self.submit_all(names.into_iter().map(Job::Icon));
    }

    fn open_folder(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };
        match list_files(&dir) {
            Ok(paths) => {
                let jobs = self.session.load_file_set(paths);
                self.image = None;
                self.folder_picked = true;
                self.pending_delete = None;
                self.submit_all(jobs);
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", dir.display(), e);
                self.notice = Some(format!("Could not read folder {}:\n{}", dir.display(), e));
            }
        }
    }

    fn switch_to(&mut self, filename: &str) {
        self.pending_delete = None;
        match self.session.select_image(filename) {
            Ok(Some(job)) => self.worker.submit(job),
            Ok(None) => {}
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn step(&mut self, step: isize) {
        if let Some(name) = self.session.neighbour(step) {
            self.switch_to(&name);
        }
    }

    fn save(&mut self) {
        match self.session.save_current() {
            Ok(job) => self.worker.submit(job),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn load_schema_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Properties", &["json", "yaml", "yml"])
            .pick_file()
        else {
            return;
        };
        match self.session.load_schema_file(&path) {
            Ok(icons) => {
                self.request_icons(icons);
                self.notice = Some("Successfully loaded new properties file.".to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn set_annotation_dir(&mut self) {
        if let Some(job) = self.session.set_annotation_dir(&self.annotation_dir_input) {
            self.worker.submit(job);
        }
    }

    /// Apply every finished background job.
    fn process_outcomes(&mut self, ctx: &egui::Context) {
        while let Some(outcome) = self.worker.poll() {
            match outcome {
                JobOutcome::Switched(outcome) => {
                    let saved_previous = outcome.saved.is_some();
                    let filename = outcome.filename.clone();
                    match self.session.finish_switch(outcome) {
                        Ok(Some(image)) => {
                            self.image = Some(CanvasImage::upload(ctx, &filename, &image));
                        }
                        Ok(None) => {}
                        Err(e) => self.notice = Some(e.to_string()),
                    }
                    if saved_previous {
                        self.refresh_status();
                    }
                }
                JobOutcome::Saved(outcome) => match self.session.finish_save(outcome) {
                    Ok(SaveReport::Saved { .. }) => {
                        self.refresh_status();
                        self.notice = Some("Annotations saved!".to_string());
                    }
                    Ok(SaveReport::Background) => self.refresh_status(),
                    Err(e) => {
                        log::warn!("{}", e);
                        self.notice = Some(e.to_string());
                    }
                },
                JobOutcome::Status(result) => self.session.finish_status(result),
                JobOutcome::Schema(result) => match self.session.finish_schema(result) {
                    Ok(icons) => self.request_icons(icons),
                    Err(e) => log::error!("{}", e),
                },
                JobOutcome::AnnotationDirSet(result) => {
                    match self.session.finish_annotation_dir(result) {
                        Ok((path, refresh)) => {
                            self.submit_all(refresh);
                            self.notice = Some(format!("Annotation directory set to:\n{}", path));
                        }
                        Err(e) => self.notice = Some(e.to_string()),
                    }
                }
                JobOutcome::Icon { name, result } => match result {
                    Ok(image) => self.icons.insert(ctx, &name, &image),
                    Err(e) => log::warn!("Could not load icon {}: {}", name, e),
                },
            }
        }
    }

    fn apply_effects(&mut self, ctx: &egui::Context, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Redraw => ctx.request_repaint(),
                Effect::ConfirmDelete { index, roi } => self.pending_delete = Some((index, roi)),
                Effect::Committed { .. } => {}
            }
        }
    }

    /// Modal windows: delete confirmation and notices.
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some((index, roi)) = self.pending_delete.clone() {
            let mut answer = None;
            egui::Window::new("Delete ROI")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Delete ROI \"{}\"?", roi.label()));
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            answer = Some(true);
                        }
                        if ui.button("Cancel").clicked() {
                            answer = Some(false);
                        }
                    });
                });
            if let Some(confirmed) = answer {
                if confirmed {
                    self.session.confirm_delete(index, &roi);
                }
                self.pending_delete = None;
            }
        }

        if let Some(message) = self.notice.clone() {
            egui::Window::new("ROIDS")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        self.notice = None;
                    }
                });
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            let effects = self.session.handle_input(InputEvent::Cancel);
            self.apply_effects(ctx, effects);
            self.pending_delete = None;
        }

        // Only process shortcuts if no text field is focused
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            self.save();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.step(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.step(-1);
        }
    }
}

/// Files directly inside `dir`.
fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Canvas events to dispatch this frame. Dialogs are modal: while one is
/// open the canvas is inert and a gesture in progress is abandoned, since
/// its release may never reach the canvas.
fn canvas_input(events: Vec<InputEvent>, dialog_open: bool) -> Vec<InputEvent> {
    if dialog_open {
        vec![InputEvent::Cancel]
    } else {
        events
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_outcomes(ctx);
        self.handle_keys(ctx);

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.session, &mut self.annotation_dir_input))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::OpenFolder => self.open_folder(),
            toolbar::ToolbarAction::Save => self.save(),
            toolbar::ToolbarAction::ResetView => self.session.reset_view(),
            toolbar::ToolbarAction::Previous => self.step(-1),
            toolbar::ToolbarAction::Next => self.step(1),
            toolbar::ToolbarAction::SetAnnotationDir => self.set_annotation_dir(),
            toolbar::ToolbarAction::None => {}
        }

        // File list (left side)
        let clicked = egui::SidePanel::left("files")
            .default_width(220.0)
            .show(ctx, |ui| file_list::show(ui, &self.session, self.folder_picked))
            .inner;
        if let Some(name) = clicked {
            self.switch_to(&name);
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &self.session))
            .inner;
        match properties_action {
            properties::PropertiesAction::SelectOption { property, index } => {
                self.session.select_option(&property, index);
            }
            properties::PropertiesAction::LoadSchemaFile => self.load_schema_file(),
            properties::PropertiesAction::DeleteRoi(index) => {
                if let Some(roi) = self.session.editor.rois.get(index) {
                    self.pending_delete = Some((index, roi.clone()));
                }
            }
            properties::PropertiesAction::None => {}
        }

        // Main canvas (center)
        let output = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| canvas::show(ui, &self.session, self.image.as_ref(), &self.icons))
            .inner;
        self.session
            .set_viewport(output.size.x as f64, output.size.y as f64);

        let dialog_open = self.pending_delete.is_some() || self.notice.is_some();
        for event in canvas_input(output.events, dialog_open) {
            let effects = self.session.handle_input(event);
            self.apply_effects(ctx, effects);
        }

        self.show_dialogs(ctx);
    }
}

impl Drop for AnnotatorApp {
    fn drop(&mut self) {
        // Queued before the worker shuts down, so it still runs.
        if self.session.is_dirty() {
            if let Ok(job) = self.session.save_current() {
                log::info!("Saving unsaved annotations before exit");
                self.worker.submit(job);
            }
        }
    }
}
