//! Command handlers.
//!
//! Each handler loads or builds a plan, runs it through the core engine and
//! saves the result:
//!
//! ```text
//! CLI Args (clap) → Core Params → Engine / Propagator → PlanStore
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use gantry_core::{
    models, params::*, DateUpdate, Engine, EngineBuilder, GanttSource, Plan, StreamSession,
    Updates,
};
use log::{debug, info, warn};
use tokio::io::AsyncReadExt;

use crate::{
    args::{MoveArgs, ParseArgs, ResizeArgs, ShowArgs},
    renderer::TerminalRenderer,
    store::PlanStore,
};

pub struct Cli {
    store: PlanStore,
    renderer: TerminalRenderer,
    iteration_cap: usize,
}

impl Cli {
    pub fn new(store: PlanStore, renderer: TerminalRenderer, iteration_cap: usize) -> Self {
        Self {
            store,
            renderer,
            iteration_cap,
        }
    }

    /// Streams the input through a session and engine, then saves the plan.
    pub async fn parse(&self, args: &ParseArgs) -> Result<()> {
        let text = read_input(args.input.as_deref()).await?;
        let engine = self.engine(None)?;
        let mut session = StreamSession::new();
        let chunk_size = usize::try_from(args.chunk_size).unwrap_or(usize::MAX);

        let mut dropped = Vec::new();
        for fragment in fragments(&text, chunk_size) {
            let output = session.consume(&fragment);
            if let Some(summary) = output.summary {
                debug!("summary updated:\n{summary}");
            }
            engine.enqueue(output.actions);
            dropped.extend(engine.drain().await?.dropped);
        }
        engine.enqueue(session.finish().actions);
        let report = engine.drain().await?;
        dropped.extend(report.dropped);
        if !dropped.is_empty() {
            warn!("gave up resolving: {}", dropped.join(", "));
        }

        let plan = engine.plan();
        self.save(&plan).await?;

        if args.json {
            print_json(&plan)
        } else {
            self.renderer.render(&session.summary().to_string());
            println!();
            self.renderer.render(&plan.to_string());
            Ok(())
        }
    }

    pub async fn show(&self, args: &ShowArgs) -> Result<()> {
        let plan = self.load().await?;
        if args.json {
            print_json(&plan)
        } else if args.source {
            print!("{}", GanttSource(&plan));
            Ok(())
        } else {
            self.renderer.render(&plan.to_string());
            Ok(())
        }
    }

    pub async fn move_task(&self, args: MoveArgs) -> Result<()> {
        let params: MoveTask = args.into();
        let plan = self.load().await?;
        let updates = params
            .updates(&plan)
            .with_context(|| format!("Failed to move '{}'", params.task_id))?;
        self.apply(plan, updates).await
    }

    pub async fn resize_section(&self, args: ResizeArgs) -> Result<()> {
        let params: ResizeSection = args.into();
        let plan = self.load().await?;
        let updates = params
            .updates(&plan)
            .with_context(|| format!("Failed to resize section '{}'", params.section))?;
        self.apply(plan, updates).await
    }

    /// Runs structural updates through the engine queue and saves.
    async fn apply(&self, plan: Plan, updates: Vec<DateUpdate>) -> Result<()> {
        let engine = self.engine(Some(plan))?;
        engine.enqueue_updates(&updates);
        engine.apply_all()?;
        self.save(&engine.plan()).await?;
        self.renderer.render(&Updates(updates).to_string());
        Ok(())
    }

    fn engine(&self, plan: Option<Plan>) -> Result<Engine> {
        EngineBuilder::new()
            .with_iteration_cap(self.iteration_cap)
            .with_plan(plan)
            .build()
            .context("Failed to initialize engine")
    }

    async fn load(&self) -> Result<Plan> {
        self.store.load().await.with_context(|| {
            format!("Failed to load plan from {}", self.store.path().display())
        })
    }

    async fn save(&self, plan: &Plan) -> Result<()> {
        self.store.save(plan).await.context("Failed to save plan")?;
        info!("plan saved to {}", self.store.path().display());
        Ok(())
    }
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read standard input")?;
            Ok(text)
        }
    }
}

/// Splits `text` into fragments of at most `size` characters.
fn fragments(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

fn print_json(plan: &Plan) -> Result<()> {
    let value = models::serialize(plan)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_split_on_characters() {
        assert_eq!(fragments("abcde", 2), vec!["ab", "cd", "e"]);
        assert_eq!(fragments("◆◆◆", 2), vec!["◆◆", "◆"]);
        assert!(fragments("", 4).is_empty());
    }
}
