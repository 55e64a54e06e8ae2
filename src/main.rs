mod app;
mod config;
mod domain;
mod engine;
mod models;
mod ui;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use gpui::{App, Application};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Args};
use crate::domain::Session;
use crate::engine::{RandomMover, Searcher, ShakmatyFactory, UciSearcher};
use crate::ui::FileAssets;

/// The configured engine, or random moves when it is missing or fails to start
fn build_searcher(config: &AppConfig) -> Arc<dyn Searcher> {
    let Some(path) = &config.engine.path else {
        tracing::info!("no engine configured, playing random moves");
        return Arc::new(RandomMover::new());
    };
    match UciSearcher::spawn(path, &config.engine.args) {
        Ok(searcher) => Arc::new(searcher),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to random moves");
            Arc::new(RandomMover::new())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_config_schema {
        println!("{}", AppConfig::schema_json());
        return Ok(());
    }

    let config = AppConfig::load(&args).context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let start = config.start_snapshot()?;
    let factory = ShakmatyFactory::new(build_searcher(&config));
    let session =
        Session::new(factory, start, config.ai).context("failed to start the game session")?;

    Application::new()
        .with_assets(FileAssets::new())
        .run(move |cx: &mut App| {
            if let Err(e) = app::run(session, cx) {
                tracing::error!(error = %e, "failed to open window");
                cx.quit();
            }
        });
    Ok(())
}
