use super::{SessionArgs, Workspace};
use anyhow::Result;
use colored::Colorize;
use taskrank::engine::resolver::TaskResolver;

/// Prints the per-dimension breakdown behind one task's score.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(args: &SessionArgs, query: &str, strict: bool, json: bool) -> Result<()> {
    let ws = Workspace::load(args)?;
    let tasks = &ws.backlog.tasks;

    let resolver = if strict {
        TaskResolver::strict(tasks)
    } else {
        TaskResolver::new(tasks)
    };
    let resolved = resolver.resolve(query)?;
    let explanation = ws.optimizer.explain(resolved.task.id, tasks, &ws.session)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    if resolved.confidence < 1.0 {
        println!(
            "{} Matched '{}' ({:.0}% confidence)",
            "~".yellow(),
            explanation.task.title,
            resolved.confidence * 100.0
        );
    }

    println!(
        "{} [{}] {}",
        "🔍".cyan(),
        explanation.task.id.to_string().yellow(),
        explanation.task.title.bold()
    );

    match explanation.rank {
        Some(rank) => println!("   Rank: #{} with score {:.1}", rank + 1, explanation.final_score),
        None => println!(
            "   Not ranked (score {:.1} if it were)",
            explanation.final_score
        ),
    }
    if explanation.on_frontier {
        println!("   {} On the Pareto frontier", "★".yellow());
    }
    if explanation.blocked {
        println!("   {} Blocked by open tasks", "⛔".red());
    }
    if explanation.critical {
        println!("   {} On the critical path", "⚡".yellow());
    }

    println!("\n   {:<18} {:>6} {:>7} {:>9}", "dimension", "score", "weight", "log part");
    for c in &explanation.contributions {
        let line = format!(
            "   {:<18} {:>6.3} {:>7.3} {:>9.3}",
            c.dimension.name(),
            c.score,
            c.weight,
            c.log_contribution
        );
        if c.weight <= 0.0 {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}
