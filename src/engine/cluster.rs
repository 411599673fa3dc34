//! Batching clusters: greedy k-medoids over task dissimilarity.
//!
//! Initialization picks the most central task first, then repeatedly the
//! task farthest from every chosen medoid. There is no swap phase; every
//! task is simply assigned to its nearest medoid.

use super::config::SimilarityConfig;
use super::context::index_tasks;
use super::error::{OptimizerError, Result};
use super::similarity::task_similarity;
use super::types::Task;
use serde::Serialize;
use tracing::debug;

/// A group of tasks worth doing back to back.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCluster {
    pub name: String,
    pub medoid: Task,
    /// Members including the medoid, in input order.
    pub members: Vec<Task>,
    /// Mean pairwise similarity of the members.
    pub cohesion: f64,
}

/// Display label derived from the medoid's most distinguishing field.
#[must_use]
pub fn cluster_name(medoid: &Task) -> String {
    medoid
        .project_id
        .clone()
        .or_else(|| medoid.category.clone())
        .or_else(|| medoid.contexts.iter().next().cloned())
        .or_else(|| medoid.stakeholder.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "General".to_string())
}

/// Groups `tasks` into at most `max_clusters` batches, best batches first.
///
/// # Errors
/// Returns `InvalidClusterCount` when `max_clusters` is 0 and
/// `DuplicateTaskId` when two tasks share an id.
pub fn cluster_tasks(
    tasks: &[Task],
    max_clusters: usize,
    cfg: &SimilarityConfig,
) -> Result<Vec<TaskCluster>> {
    if max_clusters == 0 {
        return Err(OptimizerError::InvalidClusterCount(max_clusters));
    }
    index_tasks(tasks)?;

    if tasks.len() <= max_clusters {
        return Ok(tasks
            .iter()
            .map(|t| TaskCluster {
                name: cluster_name(t),
                medoid: t.clone(),
                members: vec![t.clone()],
                cohesion: 1.0,
            })
            .collect());
    }

    let similarity = similarity_matrix(tasks, cfg);
    let medoids = select_medoids(&similarity, max_clusters);
    let assignment = assign(&similarity, &medoids);

    let mut clusters: Vec<TaskCluster> = medoids
        .iter()
        .enumerate()
        .map(|(slot, &medoid)| {
            let members: Vec<usize> = (0..tasks.len()).filter(|&i| assignment[i] == slot).collect();
            TaskCluster {
                name: cluster_name(&tasks[medoid]),
                medoid: tasks[medoid].clone(),
                cohesion: cohesion(&similarity, &members),
                members: members.iter().map(|&i| tasks[i].clone()).collect(),
            }
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    clusters.sort_by(|a, b| {
        let sa = a.cohesion * a.members.len() as f64;
        let sb = b.cohesion * b.members.len() as f64;
        sb.total_cmp(&sa)
    });

    debug!(
        tasks = tasks.len(),
        clusters = clusters.len(),
        "clustered tasks for batching"
    );
    Ok(clusters)
}

fn similarity_matrix(tasks: &[Task], cfg: &SimilarityConfig) -> Vec<Vec<f64>> {
    let n = tasks.len();
    let mut m = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let s = task_similarity(&tasks[i], &tasks[j], cfg);
            m[i][j] = s;
            m[j][i] = s;
        }
    }
    m
}

/// Most central point first, then greedy farthest-point spread.
fn select_medoids(similarity: &[Vec<f64>], k: usize) -> Vec<usize> {
    let n = similarity.len();
    let dissimilarity = |i: usize, j: usize| 1.0 - similarity[i][j];

    let mut first = 0;
    let mut best_total = f64::INFINITY;
    for i in 0..n {
        let total: f64 = (0..n).map(|j| dissimilarity(i, j)).sum();
        if total < best_total {
            best_total = total;
            first = i;
        }
    }

    let mut medoids = vec![first];
    while medoids.len() < k.min(n) {
        let mut pick = None;
        let mut best_spread = f64::NEG_INFINITY;
        for i in (0..n).filter(|i| !medoids.contains(i)) {
            let spread = medoids
                .iter()
                .map(|&m| dissimilarity(i, m))
                .fold(f64::INFINITY, f64::min);
            if spread > best_spread {
                best_spread = spread;
                pick = Some(i);
            }
        }
        match pick {
            Some(i) => medoids.push(i),
            None => break,
        }
    }
    medoids
}

/// Slot of the nearest medoid for every task; medoids keep their own slot.
fn assign(similarity: &[Vec<f64>], medoids: &[usize]) -> Vec<usize> {
    (0..similarity.len())
        .map(|i| {
            if let Some(slot) = medoids.iter().position(|&m| m == i) {
                return slot;
            }
            let mut best_slot = 0;
            let mut best = f64::INFINITY;
            for (slot, &m) in medoids.iter().enumerate() {
                let d = 1.0 - similarity[i][m];
                if d < best {
                    best = d;
                    best_slot = slot;
                }
            }
            best_slot
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn cohesion(similarity: &[Vec<f64>], members: &[usize]) -> f64 {
    if members.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (a, &i) in members.iter().enumerate() {
        for &j in &members[a + 1..] {
            total += similarity[i][j];
            pairs += 1;
        }
    }
    total / pairs as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Stakeholder, TaskId};
    use chrono::NaiveDate;

    fn make_task(id: i64, title: &str, project: Option<&str>) -> Task {
        let created = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut t = Task::new(id, title, created);
        t.project_id = project.map(str::to_string);
        t
    }

    #[test]
    fn test_trivial_input_gives_singletons() {
        let tasks = vec![make_task(1, "a", None), make_task(2, "b", None)];
        let clusters = cluster_tasks(&tasks, 3, &SimilarityConfig::default()).unwrap();
        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            assert_eq!(c.members.len(), 1);
            assert!((c.cohesion - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let err = cluster_tasks(&[], 0, &SimilarityConfig::default()).err();
        assert!(matches!(err, Some(OptimizerError::InvalidClusterCount(0))));
    }

    #[test]
    fn test_projects_cluster_together() {
        let tasks = vec![
            make_task(1, "Draft launch plan", Some("launch")),
            make_task(2, "Book garden service", Some("house")),
            make_task(3, "Review launch copy", Some("launch")),
            make_task(4, "Fix garden fence", Some("house")),
            make_task(5, "Launch checklist", Some("launch")),
        ];
        let clusters = cluster_tasks(&tasks, 2, &SimilarityConfig::default()).unwrap();
        assert_eq!(clusters.len(), 2);

        let launch = &clusters[0];
        assert_eq!(launch.name, "launch");
        let ids: Vec<TaskId> = launch.members.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(1), TaskId(3), TaskId(5)]);
        assert_eq!(clusters[1].name, "house");
        assert_eq!(clusters[1].members.len(), 2);
        assert!(launch.cohesion > 0.5);
    }

    #[test]
    fn test_every_task_assigned_once() {
        let tasks: Vec<Task> = (0..12)
            .map(|i| make_task(i, &format!("item {i}"), Some(["a", "b", "c"][(i % 3) as usize])))
            .collect();
        let clusters = cluster_tasks(&tasks, 4, &SimilarityConfig::default()).unwrap();
        let total: usize = clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(total, 12);
        assert!(clusters.len() <= 4);
    }

    #[test]
    fn test_cluster_name_fallbacks() {
        let mut t = make_task(1, "x", None);
        assert_eq!(cluster_name(&t), "General");
        t.stakeholder = Some(Stakeholder::Named("Ana".to_string()));
        assert_eq!(cluster_name(&t), "Ana");
        t.contexts = ["@phone".to_string()].into_iter().collect();
        assert_eq!(cluster_name(&t), "@phone");
        t.category = Some("errands".to_string());
        assert_eq!(cluster_name(&t), "errands");
    }
}
