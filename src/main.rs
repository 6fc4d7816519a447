//! Desktop front end for yt-dlp: paste a URL, inspect the video, download it.

// The main window
mod app;
// Defaults and environment overrides
mod config;
// Event wiring between the window and the model
mod controller;
// Application model: download folder, info and download operations
mod downloader;
// yt-dlp adapter
mod engine;
// Error types
mod error;
// Duration, view count, date and size formatting
mod format;
// Data models shared across layers
mod model;
// yt-dlp progress line parsing
mod progress;
// Thumbnail fetching for the info window
mod thumbnail;
// Presentation contract and UI-thread dispatcher
mod ui;
// URL validation
mod validator;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use eframe::egui;
use egui::Visuals;
use tokio::runtime::Runtime;
use tracing::info;

use app::VidfetchApp;
use config::AppConfig;
use downloader::Downloader;
use engine::YtDlp;

/// Program entry point: sets up logging and the runtime, then opens the window
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env();
    info!(download_dir = %config.download_dir.display(), "starting");

    // The runtime outlives the window; workers are spawned on its handle
    let runtime = Runtime::new()?;
    let engine = Arc::new(YtDlp::new(config.ytdlp_path.clone()));
    let model = Arc::new(Downloader::new(engine, config.download_dir.clone())?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window_title.clone())
            .with_inner_size(config.window_size),
        ..Default::default()
    };
    let handle = runtime.handle().clone();
    eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(VidfetchApp::new(cc, handle, model))
        }),
    )?;
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vidfetch=info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
