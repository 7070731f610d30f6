mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::ComplaintsApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading configuration")?;

    // The startup dataset is required; a bad file stops here.
    let dataset = data::loader::load_file(&config.data_path).inspect_err(|e| {
        log::error!("Failed to load dataset: {e:#}");
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let mut state = AppState::new(config);
    state.set_dataset(dataset);

    eframe::run_native(
        "Complaints Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(ComplaintsApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard: {e}"))
}
