mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::Context;
use app::CampusPanelApp;
use clap::Parser;
use config::{Cli, Commands};
use data::dashboard::Dashboard;
use data::filter;
use data::source::DatasetCache;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cache = DatasetCache::new(cli.source_location());

    match cli.command {
        None | Some(Commands::Dashboard) => run_dashboard(&cache, cli.top),
        Some(Commands::Report {
            student,
            terms,
            shifts,
            format,
        }) => {
            let table = cache.get().context("loading enrollment dataset")?;
            if table.is_empty() {
                log::warn!("{} has no enrollment rows", cache.source_label());
            }
            let selection = config::selection_from_args(&student, terms, shifts);
            let subset = filter::apply_table(&table, &selection);
            let result = Dashboard::compute(&subset, cli.top);
            if let Err(e) = &result {
                log::warn!("{e}");
            }
            println!("{}", report::render(format, &selection, &result)?);
            Ok(())
        }
    }
}

fn run_dashboard(cache: &DatasetCache, top_n: usize) -> anyhow::Result<()> {
    let state = AppState::new(cache, top_n);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard Acadêmico",
        options,
        Box::new(|_cc| Ok(Box::new(CampusPanelApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
