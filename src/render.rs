// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene rendering.
//!
//! [`render`] turns the session state into an ordered list of
//! [`DrawCommand`]s in world coordinates. Sizes that should look the same
//! at every zoom level (stroke widths, fonts, icons) are divided by the
//! view scale here; the UI layer only applies the view transform.

use crate::editor::view::ViewTransform;
use crate::models::roi::Roi;
use crate::util::geometry::{Point, Rect};

/// Screen-space sizes, in pixels.
const STROKE_PX: f64 = 2.0;
const LABEL_FONT_PX: f64 = 16.0;
const HINT_FONT_PX: f64 = 20.0;
const ICON_PX: f64 = 24.0;
/// Labels go above the ROI when at least this much room is left.
const LABEL_ROOM_PX: f64 = 10.0;
const LABEL_GAP_ABOVE_PX: f64 = 5.0;
const LABEL_GAP_BELOW_PX: f64 = 15.0;

pub const EMPTY_HINT: &str = "Select an image to begin";

/// Named colours; the UI picks the actual values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Background,
    Roi,
    InProgress,
    Hint,
}

/// Image sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Where a text position sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Position is the left end of the baseline.
    LeftBaseline,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole viewport.
    Fill(Paint),
    Image { rect: Rect, filter: Filter },
    StrokeRect { rect: Rect, width: f64, paint: Paint },
    Text {
        pos: Point,
        text: String,
        size: f64,
        paint: Paint,
        anchor: TextAnchor,
    },
    Icon { name: String, rect: Rect },
}

/// Icons that are ready to draw.
pub trait IconSource {
    fn is_ready(&self, name: &str) -> bool;
}

impl IconSource for std::collections::HashSet<String> {
    fn is_ready(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Everything the renderer reads.
pub struct Scene<'a> {
    pub view: &'a ViewTransform,
    /// Image size in pixels, if an image is open.
    pub image: Option<(u32, u32)>,
    pub rois: &'a [Roi],
    pub in_progress: Option<Rect>,
    /// Viewport size in screen pixels.
    pub viewport: (f64, f64),
}

/// Build the draw list for one frame.
pub fn render(scene: &Scene, icons: &dyn IconSource) -> Vec<DrawCommand> {
    let scale = scene.view.scale();
    let mut commands = vec![DrawCommand::Fill(Paint::Background)];

    match scene.image {
        Some((w, h)) => commands.push(DrawCommand::Image {
            rect: Rect::new(0.0, 0.0, w as f64, h as f64),
            filter: if scale < 1.0 { Filter::Nearest } else { Filter::Linear },
        }),
        None => commands.push(DrawCommand::Text {
            pos: scene
                .view
                .to_world(Point::new(scene.viewport.0 / 2.0, scene.viewport.1 / 2.0)),
            text: EMPTY_HINT.to_string(),
            size: HINT_FONT_PX / scale,
            paint: Paint::Hint,
            anchor: TextAnchor::Center,
        }),
    }

    for roi in scene.rois {
        draw_roi(&mut commands, roi, scale, icons);
    }

    if let Some(rect) = scene.in_progress {
        if rect.w > 0.0 && rect.h > 0.0 {
            commands.push(DrawCommand::StrokeRect {
                rect,
                width: STROKE_PX / scale,
                paint: Paint::InProgress,
            });
        }
    }

    commands
}

fn draw_roi(commands: &mut Vec<DrawCommand>, roi: &Roi, scale: f64, icons: &dyn IconSource) {
    let rect = roi.rect;
    commands.push(DrawCommand::StrokeRect {
        rect,
        width: STROKE_PX / scale,
        paint: Paint::Roi,
    });

    let label_y = if rect.y > LABEL_ROOM_PX / scale {
        rect.y - LABEL_GAP_ABOVE_PX / scale
    } else {
        rect.bottom() + LABEL_GAP_BELOW_PX / scale
    };
    commands.push(DrawCommand::Text {
        pos: Point::new(rect.x, label_y),
        text: roi.label().to_string(),
        size: LABEL_FONT_PX / scale,
        paint: Paint::Roi,
        anchor: TextAnchor::LeftBaseline,
    });

    // Icons stack downwards along the right edge while they fit.
    let size = ICON_PX / scale;
    let mut offset = 0.0;
    for option in roi.properties.values() {
        let Some(icon) = option.icon.as_deref() else {
            continue;
        };
        if !icons.is_ready(icon) {
            continue;
        }
        let y = rect.y + offset;
        if y + size > rect.bottom() {
            break;
        }
        commands.push(DrawCommand::Icon {
            name: icon.to_string(),
            rect: Rect::new(rect.right() - size, y, size, size),
        });
        offset += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::properties::{PropertyAssignment, PropertyOption};
    use std::collections::HashSet;

    fn roi(rect: Rect, icons: &[&str]) -> Roi {
        let mut props = PropertyAssignment::new();
        props.insert("Class".to_string(), PropertyOption::new("Cell"));
        for (i, icon) in icons.iter().enumerate() {
            props.insert(format!("P{}", i), PropertyOption::new("x").with_icon(*icon));
        }
        Roi::new(rect, props)
    }

    fn scene_of<'a>(
        view: &'a ViewTransform,
        image: Option<(u32, u32)>,
        rois: &'a [Roi],
        viewport: (f64, f64),
    ) -> Scene<'a> {
        Scene {
            view,
            image,
            rois,
            in_progress: None,
            viewport,
        }
    }

    fn ready(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_scene_shows_hint() {
        let view = ViewTransform::new(2.0, Point::new(10.0, 10.0));
        let scene = scene_of(&view, None, &[], (400.0, 200.0));

        let commands = render(&scene, &ready(&[]));
        assert_eq!(commands[0], DrawCommand::Fill(Paint::Background));
        match &commands[1] {
            DrawCommand::Text { pos, text, size, .. } => {
                assert_eq!(*pos, Point::new(110.0, 60.0));
                assert_eq!(text, EMPTY_HINT);
                assert_eq!(*size, 10.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_draw_order() {
        let view = ViewTransform::default();
        let rois = vec![roi(Rect::new(20.0, 20.0, 50.0, 50.0), &[])];
        let scene = Scene {
            view: &view,
            image: Some((100, 80)),
            rois: &rois,
            in_progress: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            viewport: (400.0, 200.0),
        };

        let commands = render(&scene, &ready(&[]));
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], DrawCommand::Fill(_)));
        assert!(matches!(commands[1], DrawCommand::Image { .. }));
        assert!(matches!(commands[2], DrawCommand::StrokeRect { paint: Paint::Roi, .. }));
        assert!(matches!(commands[3], DrawCommand::Text { .. }));
        assert!(matches!(commands[4], DrawCommand::StrokeRect { paint: Paint::InProgress, .. }));
    }

    #[test]
    fn test_filter_depends_on_scale() {
        let zoomed_out = ViewTransform::new(0.5, Point::default());
        let zoomed_in = ViewTransform::new(3.0, Point::default());
        for (view, expected) in [(zoomed_out, Filter::Nearest), (zoomed_in, Filter::Linear)] {
            let scene = scene_of(&view, Some((10, 10)), &[], (1.0, 1.0));
            let commands = render(&scene, &ready(&[]));
            let image = DrawCommand::Image {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                filter: expected,
            };
            assert_eq!(commands[1], image);
        }
    }

    #[test]
    fn test_sizes_are_constant_on_screen() {
        let view = ViewTransform::new(4.0, Point::default());
        let rois = vec![roi(Rect::new(20.0, 20.0, 50.0, 50.0), &[])];
        let scene = scene_of(&view, Some((100, 100)), &rois, (1.0, 1.0));

        for command in render(&scene, &ready(&[])) {
            match command {
                DrawCommand::StrokeRect { width, .. } => {
                    assert_eq!(width * view.scale(), STROKE_PX)
                }
                DrawCommand::Text { size, .. } => assert_eq!(size * view.scale(), LABEL_FONT_PX),
                _ => {}
            }
        }
    }

    #[test]
    fn test_label_position() {
        let view = ViewTransform::default();
        let rois = vec![
            roi(Rect::new(5.0, 50.0, 20.0, 20.0), &[]),
            roi(Rect::new(5.0, 4.0, 20.0, 20.0), &[]),
        ];
        let scene = scene_of(&view, Some((100, 100)), &rois, (1.0, 1.0));

        let labels: Vec<Point> = render(&scene, &ready(&[]))
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Text { pos, .. } => Some(pos),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec![Point::new(5.0, 45.0), Point::new(5.0, 39.0)]);
    }

    #[test]
    fn test_icons_stack_until_full() {
        let view = ViewTransform::default();
        // 60 units tall: room for two 24-unit icons.
        let rois = vec![roi(
            Rect::new(0.0, 0.0, 100.0, 60.0),
            &["a.png", "missing.png", "b.png", "c.png"],
        )];
        let scene = scene_of(&view, Some((200, 200)), &rois, (1.0, 1.0));

        let icons: Vec<(String, Rect)> = render(&scene, &ready(&["a.png", "b.png", "c.png"]))
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Icon { name, rect } => Some((name, rect)),
                _ => None,
            })
            .collect();

        assert_eq!(
            icons,
            vec![
                ("a.png".to_string(), Rect::new(76.0, 0.0, 24.0, 24.0)),
                ("b.png".to_string(), Rect::new(76.0, 24.0, 24.0, 24.0)),
            ]
        );
    }

    #[test]
    fn test_degenerate_in_progress_is_hidden() {
        let view = ViewTransform::default();
        let scene = Scene {
            view: &view,
            image: Some((10, 10)),
            rois: &[],
            in_progress: Some(Rect::new(3.0, 3.0, 0.0, 4.0)),
            viewport: (1.0, 1.0),
        };
        assert_eq!(render(&scene, &ready(&[])).len(), 2);
    }
}
