// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel.
//!
//! One selector per schema property for the options given to new ROIs,
//! followed by the ROIs of the open image.

use crate::session::Session;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    SelectOption { property: String, index: usize },
    LoadSchemaFile,
    DeleteRoi(usize),
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, session: &Session) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Properties");
    ui.separator();

    if session.schema().is_empty() {
        ui.label(egui::RichText::new("Could not load default properties.").weak());
    }

    egui::Grid::new("property_grid")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            for (property, options) in session.schema().iter() {
                ui.label(property);
                let selected = session
                    .selection()
                    .get(property)
                    .map(|o| o.name.as_str())
                    .unwrap_or_default();
                egui::ComboBox::from_id_source(("property", property))
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for (index, option) in options.iter().enumerate() {
                            if ui
                                .selectable_label(option.name == selected, option.name.as_str())
                                .clicked()
                            {
                                action = PropertiesAction::SelectOption {
                                    property: property.to_string(),
                                    index,
                                };
                            }
                        }
                    });
                ui.end_row();
            }
        });

    ui.add_space(6.0);
    if ui.button("Load properties file...").clicked() {
        action = PropertiesAction::LoadSchemaFile;
    }

    ui.add_space(12.0);
    ui.heading("Regions");
    ui.separator();

    let rois = session.editor.rois.rois();
    if rois.is_empty() {
        ui.label(egui::RichText::new("Drag on the image to add a region").italics().weak());
    }
    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, roi) in rois.iter().enumerate() {
            ui.horizontal(|ui| {
                if ui.small_button("🗑").on_hover_text("Delete region").clicked() {
                    action = PropertiesAction::DeleteRoi(index);
                }
                ui.label(format!(
                    "{}: {:.0}×{:.0} at ({:.0}, {:.0})",
                    roi.label(),
                    roi.rect.w,
                    roi.rect.h,
                    roi.rect.x,
                    roi.rect.y
                ));
            });
        }
    });

    action
}
