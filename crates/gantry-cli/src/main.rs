//! Gantry CLI Application
//!
//! Command-line host for the gantry planning engine.

mod args;
mod cli;
mod renderer;
mod store;

use anyhow::{Context, Result};
use args::{Args, Commands, ShowArgs};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use store::PlanStore;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        plan_file,
        iteration_cap,
        no_color,
        command,
    } = Args::parse();

    let store = PlanStore::new(plan_file).context("Failed to locate plan file")?;
    let cli = Cli::new(store, TerminalRenderer::new(!no_color), iteration_cap);

    info!("Gantry started");

    match command {
        Some(Parse(args)) => cli.parse(&args).await,
        Some(Show(args)) => cli.show(&args).await,
        Some(Move(args)) => cli.move_task(args).await,
        Some(Resize(args)) => cli.resize_section(args).await,
        None => cli.show(&ShowArgs::default()).await,
    }
}
