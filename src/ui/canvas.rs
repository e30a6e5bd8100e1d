// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and annotation.
//!
//! Paints the draw list produced by [`crate::render`] under the current
//! view transform and turns raw egui pointer input into the editor's
//! [`InputEvent`]s. All annotation logic lives in the editor; this module
//! only translates.

use crate::editor::view::ViewTransform;
use crate::editor::{InputEvent, PointerButton};
use crate::io::media::LoadedImage;
use crate::render::{self, DrawCommand, Filter, IconSource, Paint, Scene, TextAnchor};
use crate::session::Session;
use crate::util::geometry::{Point, Rect};
use std::collections::HashMap;

/// The open image, uploaded once per sampling mode.
pub struct CanvasImage {
    linear: egui::TextureHandle,
    nearest: egui::TextureHandle,
}

impl CanvasImage {
    pub fn upload(ctx: &egui::Context, name: &str, image: &LoadedImage) -> Self {
        let color_image = to_color_image(image);
        Self {
            linear: ctx.load_texture(
                format!("{}#linear", name),
                color_image.clone(),
                egui::TextureOptions::LINEAR,
            ),
            nearest: ctx.load_texture(
                format!("{}#nearest", name),
                color_image,
                egui::TextureOptions::NEAREST,
            ),
        }
    }

    fn texture(&self, filter: Filter) -> &egui::TextureHandle {
        match filter {
            Filter::Linear => &self.linear,
            Filter::Nearest => &self.nearest,
        }
    }
}

/// Property icons by name.
#[derive(Default)]
pub struct IconTextures {
    textures: HashMap<String, egui::TextureHandle>,
}

impl IconTextures {
    pub fn clear(&mut self) {
        self.textures.clear();
    }

    pub fn insert(&mut self, ctx: &egui::Context, name: &str, image: &LoadedImage) {
        let texture = ctx.load_texture(
            format!("icon:{}", name),
            to_color_image(image),
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(name.to_string(), texture);
    }
}

impl IconSource for IconTextures {
    fn is_ready(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }
}

fn to_color_image(image: &LoadedImage) -> egui::ColorImage {
    let size = [image.width as usize, image.height as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels)
}

/// Result of one canvas frame.
pub struct CanvasOutput {
    pub events: Vec<InputEvent>,
    /// Canvas size in screen pixels.
    pub size: egui::Vec2,
}

fn paint_color(paint: Paint) -> egui::Color32 {
    match paint {
        Paint::Background => egui::Color32::from_gray(0xe9),
        Paint::Roi => egui::Color32::from_rgb(0, 255, 0),
        Paint::InProgress => egui::Color32::YELLOW,
        Paint::Hint => egui::Color32::BLACK,
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Auxiliary),
        _ => None,
    }
}

/// World point to absolute screen position.
fn to_screen(view: &ViewTransform, canvas_min: egui::Pos2, world: Point) -> egui::Pos2 {
    let p = view.to_screen(world);
    canvas_min + egui::vec2(p.x as f32, p.y as f32)
}

fn to_screen_rect(view: &ViewTransform, canvas_min: egui::Pos2, rect: Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        to_screen(view, canvas_min, Point::new(rect.x, rect.y)),
        to_screen(view, canvas_min, Point::new(rect.right(), rect.bottom())),
    )
}

/// Display the canvas and collect pointer input.
pub fn show(
    ui: &mut egui::Ui,
    session: &Session,
    image: Option<&CanvasImage>,
    icons: &IconTextures,
) -> CanvasOutput {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let view = &session.editor.view;

    let scene = Scene {
        view,
        image: session.current().map(|c| (c.width, c.height)),
        rois: session.editor.rois.rois(),
        in_progress: session.editor.in_progress(),
        viewport: (rect.width() as f64, rect.height() as f64),
    };
    let painter = ui.painter_at(rect);
    let scale = view.scale();
    let full_uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

    for command in render::render(&scene, icons) {
        match command {
            DrawCommand::Fill(paint) => {
                painter.rect_filled(rect, 0.0, paint_color(paint));
            }
            DrawCommand::Image { rect: world, filter } => {
                if let Some(image) = image {
                    painter.image(
                        image.texture(filter).id(),
                        to_screen_rect(view, rect.min, world),
                        full_uv,
                        egui::Color32::WHITE,
                    );
                }
            }
            DrawCommand::StrokeRect { rect: world, width, paint } => {
                painter.rect_stroke(
                    to_screen_rect(view, rect.min, world),
                    0.0,
                    egui::Stroke::new((width * scale) as f32, paint_color(paint)),
                );
            }
            DrawCommand::Text { pos, text, size, paint, anchor } => {
                let align = match anchor {
                    TextAnchor::LeftBaseline => egui::Align2::LEFT_BOTTOM,
                    TextAnchor::Center => egui::Align2::CENTER_CENTER,
                };
                painter.text(
                    to_screen(view, rect.min, pos),
                    align,
                    text,
                    egui::FontId::proportional((size * scale) as f32),
                    paint_color(paint),
                );
            }
            DrawCommand::Icon { name, rect: world } => {
                if let Some(texture) = icons.textures.get(&name) {
                    painter.image(
                        texture.id(),
                        to_screen_rect(view, rect.min, world),
                        full_uv,
                        egui::Color32::WHITE,
                    );
                }
            }
        }
    }

    if let Some(pending) = session.pending() {
        painter.text(
            rect.center_bottom() - egui::vec2(0.0, 16.0),
            egui::Align2::CENTER_BOTTOM,
            format!("Loading {}...", pending),
            egui::FontId::proportional(16.0),
            egui::Color32::DARK_GRAY,
        );
    }

    let to_local = |p: egui::Pos2| Point::new((p.x - rect.min.x) as f64, (p.y - rect.min.y) as f64);
    let mut events = Vec::new();
    ui.input(|i| {
        for event in &i.events {
            match event {
                egui::Event::PointerButton { pos, button, pressed, .. } => {
                    let Some(button) = map_button(*button) else {
                        continue;
                    };
                    if *pressed {
                        // Presses only count on the canvas; releases always
                        // end a gesture, wherever the pointer is.
                        if response.hovered() && rect.contains(*pos) {
                            events.push(InputEvent::Press { button, pos: to_local(*pos) });
                        }
                    } else {
                        events.push(InputEvent::Release { button, pos: to_local(*pos) });
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    events.push(InputEvent::Move { pos: to_local(*pos) });
                }
                _ => {}
            }
        }

        let scroll = i.raw_scroll_delta.y;
        if scroll != 0.0 && response.hovered() {
            if let Some(pos) = i.pointer.hover_pos() {
                // egui reports scrolling up as positive.
                events.push(InputEvent::Wheel { pos: to_local(pos), delta_y: -(scroll as f64) });
            }
        }
    });

    CanvasOutput {
        events,
        size: rect.size(),
    }
}
