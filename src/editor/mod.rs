// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation canvas core: view transform, ROI store and the pointer
//! interaction state machine. Nothing in here depends on egui.

pub mod interaction;
pub mod store;
pub mod view;

pub use interaction::{Editor, Effect, InputEvent, PointerButton};
