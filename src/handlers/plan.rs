use super::{print_human_ranking, print_json_ranking, SessionArgs, Workspace};
use anyhow::Result;
use colored::Colorize;

/// Builds a working order, re-scoring after every pick so batching and
/// momentum follow the plan.
///
/// # Errors
/// Returns error if the snapshot cannot be loaded or contains duplicate ids.
pub fn handle(args: &SessionArgs, json: bool, limit: usize) -> Result<()> {
    let ws = Workspace::load(args)?;
    let plan = ws
        .optimizer
        .optimize_tasks_sequentially(&ws.backlog.tasks, &ws.session)?;

    if json {
        return print_json_ranking(&plan, limit);
    }

    print_human_ranking("Suggested order:", &plan, limit);
    let default_minutes = ws
        .session
        .preferences
        .default_task_minutes
        .unwrap_or(ws.optimizer.config().durations.default_task_minutes);
    let minutes: f64 = plan
        .iter()
        .map(|r| r.task.duration_minutes(default_minutes))
        .sum();
    println!("\n   {} ~{minutes:.0} min of work", "⏱".dimmed());
    Ok(())
}
