// Disable console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use app::GeocolumnApp;
use eframe::egui;
use geocolumn_core::{GeocodeConfig, GeocodeContext};

fn main() -> eframe::Result<()> {
    env_logger::init(); // Initialize logging

    // A missing or empty API key aborts before any window is shown
    let context = match GeocodeContext::from_config(GeocodeConfig::default()) {
        Ok(context) => context,
        Err(e) => {
            log::error!("{:#}", e);
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("API key error")
                .set_description(format!("{:#}", e))
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 560.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("geocolumn - Geocoding / Reverse Geocoding"),
        ..Default::default()
    };

    eframe::run_native(
        "geocolumn",
        native_options,
        Box::new(|cc| Ok(Box::new(GeocolumnApp::new(cc, context)))),
    )
}
