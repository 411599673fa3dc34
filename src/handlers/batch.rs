use super::{SessionArgs, Workspace};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use taskrank::TaskCluster;

#[derive(Serialize)]
struct ClusterView<'a> {
    name: &'a str,
    medoid: i64,
    cohesion: f64,
    members: Vec<i64>,
}

impl<'a> From<&'a TaskCluster> for ClusterView<'a> {
    fn from(c: &'a TaskCluster) -> Self {
        Self {
            name: &c.name,
            medoid: c.medoid.id.0,
            cohesion: c.cohesion,
            members: c.members.iter().map(|t| t.id.0).collect(),
        }
    }
}

/// Groups open tasks into batches of similar work.
///
/// # Errors
/// Returns error if `max_clusters` is zero or the snapshot cannot be loaded.
pub fn handle(args: &SessionArgs, max_clusters: usize, json: bool) -> Result<()> {
    let ws = Workspace::load(args)?;
    let clusters = ws.optimizer.cluster(&ws.backlog.tasks, max_clusters)?;

    if json {
        let views: Vec<ClusterView> = clusters.iter().map(ClusterView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if clusters.is_empty() {
        println!("{} Nothing open to batch.", "✓".green());
        return Ok(());
    }

    println!("{} {} batches:", "📦".cyan(), clusters.len());
    for cluster in &clusters {
        println!(
            "\n   {} {}",
            cluster.name.bold(),
            format!("(cohesion {:.2})", cluster.cohesion).dimmed()
        );
        for task in &cluster.members {
            let marker = if task.id == cluster.medoid.id { "●" } else { "·" };
            println!("     {marker} [{}] {}", task.id.to_string().yellow(), task.title);
        }
    }
    Ok(())
}
