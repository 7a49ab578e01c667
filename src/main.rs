// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! mathdown demo - Main Entry Point
//!
//! Opens a window with a single markdown editor configured from
//! `~/.config/mathdown/config.json`.

mod app;

use app::DemoApp;
use log::info;
use mathdown::load_config;

/// Application name constant.
const APP_NAME: &str = "mathdown";

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let settings = load_config();
    info!(
        "Editor configuration: read_only: {}, conversion timeout: {} ms",
        settings.read_only, settings.conversion_timeout_ms
    );

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size([900.0, 700.0])
        .with_min_inner_size([400.0, 300.0]);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(DemoApp::new(cc, settings)))),
    )
}
