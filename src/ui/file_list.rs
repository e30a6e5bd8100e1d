// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image list with per-file annotation status.

use crate::session::Session;

/// Display the file list. Returns the file the user clicked.
pub fn show(ui: &mut egui::Ui, session: &Session, folder_picked: bool) -> Option<String> {
    let mut clicked = None;

    ui.heading("Images");
    ui.separator();

    if !folder_picked {
        ui.label("Select a folder to begin.");
        return None;
    }
    if session.filenames().next().is_none() {
        ui.label("No supported images found.");
        return None;
    }

    let active = session.pending().or(session.current_name());
    egui::ScrollArea::vertical().show(ui, |ui| {
        for name in session.filenames() {
            let text = format!("{} {}", session.status_of(name).icon(), name);
            if ui.selectable_label(active == Some(name), text).clicked() {
                clicked = Some(name.to_string());
            }
        }
    });

    clicked
}
