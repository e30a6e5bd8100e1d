// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pan/zoom transform between screen space and image (world) space.
//!
//! `world = screen / scale + origin`, so `origin` is the world point shown
//! at the top-left corner of the canvas and `scale` is the number of screen
//! pixels per image pixel.

use crate::util::geometry::Point;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

/// Zoom factor applied per wheel notch.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Current pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    origin: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            origin: Point::default(),
        }
    }
}

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl ViewTransform {
    /// Build a transform, clamping `scale` into range. Non-finite input
    /// falls back to the identity scale.
    pub fn new(scale: f64, origin: Point) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            clamp_scale(scale)
        } else {
            1.0
        };
        let origin = if origin.is_finite() { origin } else { Point::default() };
        Self { scale, origin }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::new(
            screen.x / self.scale + self.origin.x,
            screen.y / self.scale + self.origin.y,
        )
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.origin.x) * self.scale,
            (world.y - self.origin.y) * self.scale,
        )
    }

    /// Fit the whole image into the viewport and centre it.
    pub fn zoom_to_fit(&mut self, image_w: f64, image_h: f64, viewport_w: f64, viewport_h: f64) {
        let sizes = [image_w, image_h, viewport_w, viewport_h];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            log::debug!("zoom_to_fit ignored for degenerate sizes {:?}", sizes);
            return;
        }

        self.scale = clamp_scale((viewport_w / image_w).min(viewport_h / image_h));
        self.origin = Point::new(
            (image_w - viewport_w / self.scale) / 2.0,
            (image_h - viewport_h / self.scale) / 2.0,
        );
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// `screen` fixed on screen.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 || !screen.is_finite() {
            return;
        }

        let anchor = self.to_world(screen);
        self.scale = clamp_scale(self.scale * factor);
        self.origin = Point::new(
            anchor.x - screen.x / self.scale,
            anchor.y - screen.y / self.scale,
        );
    }

    /// Shift the view by a screen-space drag delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.origin.x -= dx / self.scale;
        self.origin.y -= dy / self.scale;
    }

    /// Zoom factor for one wheel event; scrolling up (negative delta) zooms in.
    pub fn wheel_factor(delta_y: f64) -> f64 {
        if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        }
    }
}
