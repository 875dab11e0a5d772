//! Native window running the particle field
//!
//! Run with: cargo run --features gui --bin neon-viewer

use eframe::egui;
use neon_field::app::NeonViewer;
use neon_field::config::HeadlessConfig;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,neon_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    // Window size and seed come from the same variables as the headless run
    let config = HeadlessConfig::from_env().unwrap_or_else(|e| {
        error!(error = %e, "Ignoring invalid configuration");
        HeadlessConfig::default()
    });
    let seed = config.seed;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.size.x as f32, config.size.y as f32])
            .with_title("Neon Field"),
        ..Default::default()
    };

    eframe::run_native(
        "Neon Field",
        options,
        Box::new(move |cc| Ok(Box::new(NeonViewer::new(cc, seed)))),
    )
}
