// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar.
//!
//! Folder selection, saving, view reset, image navigation and the
//! annotation directory field.

use crate::session::Session;

pub enum ToolbarAction {
    None,
    OpenFolder,
    Save,
    ResetView,
    Previous,
    Next,
    SetAnnotationDir,
}

/// Display the toolbar. `dir_input` is the annotation directory text field.
pub fn show(ui: &mut egui::Ui, session: &Session, dir_input: &mut String) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_image = session.has_image();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Open Folder...").clicked() {
            action = ToolbarAction::OpenFolder;
        }
        if ui.add_enabled(has_image, egui::Button::new("💾 Save (Ctrl+S)")).clicked() {
            action = ToolbarAction::Save;
        }
        if ui.add_enabled(has_image, egui::Button::new("⟲ Reset View")).clicked() {
            action = ToolbarAction::ResetView;
        }

        ui.separator();

        if ui.button("◀").on_hover_text("Previous image").clicked() {
            action = ToolbarAction::Previous;
        }
        if ui.button("▶").on_hover_text("Next image").clicked() {
            action = ToolbarAction::Next;
        }

        ui.separator();

        ui.label("Annotation dir:");
        let field = ui.add(egui::TextEdit::singleline(dir_input).desired_width(220.0));
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Set").clicked() || submitted {
            action = ToolbarAction::SetAnnotationDir;
        }

        ui.separator();

        let status = match session.current_name() {
            Some(name) if session.is_dirty() => format!("Annotating: {} (unsaved)", name),
            Some(name) => format!("Annotating: {}", name),
            None => "No image selected".to_string(),
        };
        ui.label(egui::RichText::new(status).italics().weak());
    });

    action
}
