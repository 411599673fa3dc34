use super::{print_human_ranking, print_json_ranking, SessionArgs, Workspace};
use anyhow::Result;

/// Ranks every open task in a single pass.
///
/// # Errors
/// Returns error if the snapshot cannot be loaded or contains duplicate ids.
pub fn handle(args: &SessionArgs, json: bool, limit: usize) -> Result<()> {
    let ws = Workspace::load(args)?;
    let ranked = ws.optimizer.optimize_tasks(&ws.backlog.tasks, &ws.session)?;

    if json {
        return print_json_ranking(&ranked, limit);
    }

    let heading = format!("Top tasks for {}:", ws.session.now.format("%a %H:%M"));
    print_human_ranking(&heading, &ranked, limit);
    Ok(())
}
