// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROIDS - Region Of Interest Designation System
//!
//! A desktop editor for drawing labelled rectangular regions of interest
//! on a folder of images, persisted per image by an annotation backend.

mod app;
mod config;
mod editor;
mod io;
mod models;
mod render;
mod session;
mod ui;
mod util;
mod worker;

use anyhow::Result;
use app::AnnotatorApp;
use config::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG still takes precedence
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let backend = config.backend.build();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 600.0])
            .with_title("ROIDS - Region Of Interest Designation System"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROIDS",
        options,
        Box::new(move |cc| Ok(Box::new(AnnotatorApp::new(cc, backend)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
