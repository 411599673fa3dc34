use super::{SessionArgs, Workspace};
use anyhow::Result;
use colored::Colorize;
use std::collections::HashMap;
use taskrank::{CriticalPathAnalysis, Task, TaskId};

/// Prints the longest weighted blocking chain and the tasks holding up the most work.
///
/// # Errors
/// Returns error if the snapshot cannot be loaded or contains duplicate ids.
pub fn handle(args: &SessionArgs, json: bool) -> Result<()> {
    let ws = Workspace::load(args)?;
    let analysis = ws.optimizer.critical_path(&ws.backlog.tasks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let by_id: HashMap<TaskId, &Task> = ws.backlog.tasks.iter().map(|t| (t.id, t)).collect();
    let title = |id: &TaskId| by_id.get(id).map_or("?", |t| t.title.as_str());

    if let Some(message) = empty_chain_message(&analysis) {
        println!("{message}");
        return Ok(());
    }

    println!(
        "{} Critical path ({:.0} weighted minutes):",
        "⚡".yellow(),
        analysis.total_weight
    );
    for (i, id) in analysis.chain.iter().enumerate() {
        let arrow = if i == 0 { " " } else { "→" };
        println!("   {arrow} [{}] {}", id.to_string().yellow(), title(id));
    }

    let mut blockers: Vec<(&TaskId, &usize)> = analysis.blocked_by_counts.iter().collect();
    blockers.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    if !blockers.is_empty() {
        println!("\n{} Biggest blockers:", "⛔".red());
        for (id, count) in blockers.iter().take(5) {
            println!("   [{}] {} blocks {count}", id.to_string().yellow(), title(id));
        }
    }

    if analysis.unreached > 0 {
        println!(
            "\n{} {} task(s) sit in a dependency cycle and were skipped",
            "⚠".yellow(),
            analysis.unreached
        );
    }
    Ok(())
}

/// What to print when there is no chain. `None` when a chain exists.
fn empty_chain_message(analysis: &CriticalPathAnalysis) -> Option<String> {
    if !analysis.chain.is_empty() {
        return None;
    }
    if analysis.unreached > 0 {
        return Some(format!(
            "{} All {} open task(s) sit in a dependency cycle; no chain to show",
            "⚠".yellow(),
            analysis.unreached
        ));
    }
    Some(format!("{} No open tasks.", "✓".green()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_cyclic_is_not_reported_as_empty() {
        let analysis = CriticalPathAnalysis {
            unreached: 2,
            ..CriticalPathAnalysis::default()
        };
        let message = empty_chain_message(&analysis).unwrap();
        assert!(message.contains("cycle"));
        assert!(!message.contains("No open tasks"));
    }

    #[test]
    fn test_empty_and_non_empty_chains() {
        let empty = CriticalPathAnalysis::default();
        assert!(empty_chain_message(&empty).unwrap().contains("No open tasks"));

        let chained = CriticalPathAnalysis {
            chain: vec![TaskId(1)],
            ..CriticalPathAnalysis::default()
        };
        assert!(empty_chain_message(&chained).is_none());
    }
}
