mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::SalesDashboardApp;
use clap::Parser;
use config::Cli;
use data::aggregate::Aggregates;
use data::filter::FilteredView;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let filters = cli.filter_state()?;
    let raw = data::loader::load_file(&cli.data)
        .with_context(|| format!("loading sales data from {}", cli.data.display()))?;
    let dataset = data::normalize::normalize_dataset(raw);
    if dataset.is_empty() {
        log::warn!("{} has no rows", cli.data.display());
    }

    if let Some(dir) = &cli.export_dir {
        let view = FilteredView::new(&dataset, &filters);
        if view.is_empty() {
            log::warn!("no transactions match the selected filters");
        }
        let aggregates = Aggregates::compute(&view);
        log::info!("{filters}: {}", aggregates.kpis);
        let written = data::export::export_all(dir, &view, &aggregates)?;
        log::info!("Wrote {} exports to {}", written.len(), dir.display());
        return Ok(());
    }

    let mut state = AppState {
        logo: cli.logo.clone(),
        ..Default::default()
    };
    state.set_dataset(dataset, filters);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the sidebar logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(SalesDashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("running dashboard window: {e}"))
}
