// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer interaction state machine.
//!
//! The canvas feeds structured [`InputEvent`]s into [`Editor::handle`],
//! which updates the view transform and ROI store and returns the side
//! effects the UI has to carry out. Drawing and panning are mutually
//! exclusive; wheel zoom is accepted in every mode because it does not
//! touch the drawing anchor (that is kept in world space).

use super::store::RoiStore;
use super::view::ViewTransform;
use crate::models::properties::PropertyAssignment;
use crate::models::roi::Roi;
use crate::util::geometry::{Point, Rect};

/// Mouse button of a press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Draws rectangles.
    Primary,
    /// Deletes the ROI under the pointer.
    Secondary,
    /// Pans the view (middle button).
    Auxiliary,
}

/// Canvas input, with positions in canvas-local screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press { button: PointerButton, pos: Point },
    Move { pos: Point },
    Release { button: PointerButton, pos: Point },
    Wheel { pos: Point, delta_y: f64 },
    /// Abort the current gesture (Escape).
    Cancel,
}

/// Work the UI must do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Redraw,
    /// Ask the user before deleting; answer through [`Editor::confirm_delete`].
    ConfirmDelete { index: usize, roi: Roi },
    Committed { index: usize },
}

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Drawing { anchor: Point, current: Rect },
    Panning { last: Point },
}

/// View, ROIs and interaction mode of the open image.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub view: ViewTransform,
    pub rois: RoiStore,
    mode: Mode,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangle being dragged out, if any.
    pub fn in_progress(&self) -> Option<Rect> {
        match self.mode {
            Mode::Drawing { current, .. } => Some(current),
            _ => None,
        }
    }

    /// Drop any gesture in progress and return to idle.
    pub fn reset_interaction(&mut self) {
        self.mode = Mode::Idle;
    }

    /// Replace the ROI list for a newly opened image and fit it into the
    /// viewport.
    pub fn open(&mut self, rois: Vec<Roi>, image_size: (f64, f64), viewport: (f64, f64)) {
        self.reset_interaction();
        self.rois.replace_all(rois);
        self.view
            .zoom_to_fit(image_size.0, image_size.1, viewport.0, viewport.1);
    }

    /// Dispatch one input event.
    ///
    /// `has_image` gates every gesture; `selection` is snapshotted into any
    /// ROI committed by this event.
    pub fn handle(
        &mut self,
        event: InputEvent,
        has_image: bool,
        selection: &PropertyAssignment,
    ) -> Vec<Effect> {
        if !has_image {
            self.mode = Mode::Idle;
            return Vec::new();
        }

        match (self.mode, event) {
            (Mode::Idle, InputEvent::Press { button, pos }) => self.press(button, pos),

            (Mode::Drawing { anchor, .. }, InputEvent::Move { pos }) => {
                let current = Rect::from_corners(anchor, self.view.to_world(pos));
                self.mode = Mode::Drawing { anchor, current };
                vec![Effect::Redraw]
            }

            (Mode::Panning { last }, InputEvent::Move { pos }) => {
                self.view.pan(pos.x - last.x, pos.y - last.y);
                self.mode = Mode::Panning { last: pos };
                vec![Effect::Redraw]
            }

            (
                Mode::Drawing { anchor, .. },
                InputEvent::Release {
                    button: PointerButton::Primary,
                    pos,
                },
            ) => {
                let rect = Rect::from_corners(anchor, self.view.to_world(pos));
                self.mode = Mode::Idle;
                let mut effects = Vec::new();
                if self.rois.commit(rect, selection.clone()) {
                    let index = self.rois.len() - 1;
                    log::info!("Added ROI {}, total: {}", index, self.rois.len());
                    effects.push(Effect::Committed { index });
                }
                effects.push(Effect::Redraw);
                effects
            }

            (
                Mode::Panning { .. },
                InputEvent::Release {
                    button: PointerButton::Auxiliary,
                    ..
                },
            ) => {
                self.mode = Mode::Idle;
                Vec::new()
            }

            (_, InputEvent::Wheel { pos, delta_y }) => {
                self.view.zoom_at(pos, ViewTransform::wheel_factor(delta_y));
                if let Mode::Drawing { anchor, .. } = self.mode {
                    let current = Rect::from_corners(anchor, self.view.to_world(pos));
                    self.mode = Mode::Drawing { anchor, current };
                }
                vec![Effect::Redraw]
            }

            (Mode::Drawing { .. }, InputEvent::Cancel) => {
                self.mode = Mode::Idle;
                vec![Effect::Redraw]
            }

            (Mode::Panning { .. }, InputEvent::Cancel) => {
                self.mode = Mode::Idle;
                Vec::new()
            }

            _ => Vec::new(),
        }
    }

    fn press(&mut self, button: PointerButton, pos: Point) -> Vec<Effect> {
        match button {
            PointerButton::Primary => {
                let anchor = self.view.to_world(pos);
                self.mode = Mode::Drawing {
                    anchor,
                    current: Rect::new(anchor.x, anchor.y, 0.0, 0.0),
                };
                Vec::new()
            }
            PointerButton::Auxiliary => {
                self.mode = Mode::Panning { last: pos };
                Vec::new()
            }
            PointerButton::Secondary => {
                let world = self.view.to_world(pos);
                match self.rois.hit_test(world) {
                    Some(index) => {
                        let roi = self.rois.rois()[index].clone();
                        vec![Effect::ConfirmDelete { index, roi }]
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    /// Delete the ROI the user confirmed, provided it is still at `index`.
    pub fn confirm_delete(&mut self, index: usize, roi: &Roi) -> Option<Roi> {
        if self.rois.get(index) != Some(roi) {
            log::warn!("ROI {} changed before deletion was confirmed", index);
            return None;
        }
        let removed = self.rois.delete(index)?;
        log::info!("Deleted ROI \"{}\", total: {}", removed.label(), self.rois.len());
        Some(removed)
    }
}
