//! CLI command handlers and the shared snapshot/session loading.

pub mod batch;
pub mod critical;
pub mod explain;
pub mod plan;
pub mod rank;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use taskrank::engine::repo::{read_json, Backlog, JsonTaskSource, TaskSource};
use taskrank::{OptimizerConfig, RankedTask, SessionContext, Stakeholder, TaskOptimizer};
use tracing::debug;

/// Options describing the moment being planned for.
#[derive(Args, Clone, Debug)]
pub struct SessionArgs {
    /// Backlog snapshot (JSON)
    #[arg(long, short = 'f', global = true, default_value = "tasks.json")]
    pub file: PathBuf,
    /// Optimizer tuning overrides (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Plan for this local time instead of now (YYYY-MM-DDTHH:MM[:SS])
    #[arg(long, global = true, value_parser = parse_time)]
    pub at: Option<NaiveDateTime>,
    /// Current energy, 1 (drained) to 5 (sharp)
    #[arg(long, global = true)]
    pub energy: Option<f64>,
    /// Minutes available in the next block
    #[arg(long, global = true, default_value_t = 60.0)]
    pub block: f64,
    /// Context you can act in right now (repeatable, e.g. --context @home)
    #[arg(long = "context", global = true)]
    pub contexts: Vec<String>,
    /// Deadlines are tight today
    #[arg(long, global = true)]
    pub pressure: bool,
    /// Who you are currently working for
    #[arg(long, global = true)]
    pub stakeholder: Option<String>,
}

fn parse_time(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got '{raw}'"))
}

/// A loaded snapshot plus the optimizer and session built from CLI options.
pub struct Workspace {
    pub backlog: Backlog,
    pub optimizer: TaskOptimizer,
    pub session: SessionContext,
}

impl Workspace {
    /// Loads the snapshot and config named by `args`.
    ///
    /// # Errors
    /// Returns error if a file cannot be read or an option is out of range.
    pub fn load(args: &SessionArgs) -> Result<Self> {
        if let Some(energy) = args.energy {
            if !(1.0..=5.0).contains(&energy) {
                bail!("--energy must be between 1 and 5 (got {energy})");
            }
        }
        if args.block < 0.0 {
            bail!("--block cannot be negative");
        }

        let backlog = JsonTaskSource::new(&args.file)
            .load()
            .with_context(|| format!("Failed to load backlog from {}", args.file.display()))?;

        let config = match &args.config {
            Some(path) => read_json::<OptimizerConfig>(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => OptimizerConfig::default(),
        };

        let now = args.at.unwrap_or_else(|| Local::now().naive_local());
        let mut session = SessionContext::new(now, backlog.preferences.clone());
        session.recent = taskrank::RecentActivity::new(&config.recency);
        session.current_energy = args.energy;
        session.available_block_minutes = args.block;
        session.high_time_pressure = args.pressure;
        session.available_contexts = args.contexts.iter().cloned().collect();

        // Replay oldest first so the windows end up most-recent-first.
        for id in backlog.recent_completed.iter().rev() {
            if let Some(task) = backlog.tasks.iter().find(|t| t.id == *id) {
                session.record_pick(task);
            }
        }
        if let Some(name) = &args.stakeholder {
            session.current_stakeholder = Some(Stakeholder::from(name.clone()));
        }

        debug!(tasks = backlog.tasks.len(), %now, "workspace loaded");
        Ok(Self {
            backlog,
            optimizer: TaskOptimizer::new(config),
            session,
        })
    }
}

#[derive(Serialize)]
pub struct RankedView {
    pub id: i64,
    pub title: String,
    pub score: f64,
    pub on_frontier: bool,
    pub scores: BTreeMap<&'static str, f64>,
}

impl From<&RankedTask> for RankedView {
    fn from(r: &RankedTask) -> Self {
        Self {
            id: r.task.id.0,
            title: r.task.title.clone(),
            score: r.score,
            on_frontier: r.on_frontier,
            scores: r.vector.iter().map(|(d, s)| (d.name(), s)).collect(),
        }
    }
}

pub fn print_json_ranking(ranked: &[RankedTask], limit: usize) -> Result<()> {
    let views: Vec<RankedView> = ranked.iter().take(limit).map(RankedView::from).collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

pub fn print_human_ranking(heading: &str, ranked: &[RankedTask], limit: usize) {
    println!("{} {heading}", "🚀".cyan());

    if ranked.is_empty() {
        println!("   (Nothing actionable right now)");
        return;
    }

    for (i, r) in ranked.iter().take(limit).enumerate() {
        let marker = if r.on_frontier { "★".yellow() } else { " ".normal() };
        println!(
            "   {:>2}. {} [{}] {} {}",
            i + 1,
            marker,
            r.task.id.to_string().yellow(),
            r.task.title,
            format!("{:.1}", r.score).dimmed()
        );
        if let Some(due) = r.task.due_date {
            println!("          due {}", due.format("%Y-%m-%d %H:%M").to_string().dimmed());
        }
    }
    if ranked.len() > limit {
        println!("   … {} more", ranked.len() - limit);
    }
}
