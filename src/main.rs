mod app;
mod ui;

use anyhow::{anyhow, Context};
use carbon_dashboard::config::Cli;
use carbon_dashboard::data::loader::load_projects;
use carbon_dashboard::state::AppState;
use clap::Parser;
use eframe::egui;

use app::CarbonDashboardApp;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::init();

    let mut state = AppState::default();
    if let Some(source) = cli.data_source() {
        let table = load_projects(&source)
            .with_context(|| format!("failed to load {}", source.path.display()))?;
        state.set_dataset(table, source);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Carbon Dashboard – Voluntary Registry Offsets",
        options,
        Box::new(|_cc| Ok(Box::new(CarbonDashboardApp::new(state, cli)))),
    )
    .map_err(|e| anyhow!("failed to start the window: {e}"))
}
