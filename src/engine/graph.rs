//! Dependency graph: blocking edges, unblock counts and the critical path.
//!
//! Edges run from blocker to blocked task. Only blockers present in the
//! analyzed set become edges, so resolved or unknown blockers drop out.

use super::config::DurationConfig;
use super::context::index_tasks;
use super::error::Result;
use super::types::{Task, TaskId};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::warn;

/// Result of the longest-path analysis over the blocking graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CriticalPathAnalysis {
    /// Critical chain ordered from the first blocker to the last blocked task.
    pub chain: Vec<TaskId>,
    pub critical_path: BTreeSet<TaskId>,
    /// Cumulative weight of the chain.
    pub total_weight: f64,
    /// For each task, how many tasks in the set it blocks.
    pub blocked_by_counts: HashMap<TaskId, usize>,
    /// Tasks never released by the topological pass (members of, or behind, a cycle).
    pub unreached: usize,
}

impl CriticalPathAnalysis {
    #[must_use]
    pub fn is_critical(&self, id: TaskId) -> bool {
        self.critical_path.contains(&id)
    }

    /// Number of tasks that list `id` as a blocker.
    #[must_use]
    pub fn unblocks(&self, id: TaskId) -> usize {
        self.blocked_by_counts.get(&id).copied().unwrap_or(0)
    }
}

pub struct TaskGraph {
    graph: DiGraphMap<TaskId, ()>,
    /// Node ids in input order; keeps traversal deterministic.
    order: Vec<TaskId>,
    weights: HashMap<TaskId, f64>,
}

impl TaskGraph {
    /// Builds the blocking graph over `tasks`.
    ///
    /// A repeated id keeps its first occurrence. Callers that must reject
    /// duplicates check with `index_tasks` first.
    pub fn build<'t>(tasks: impl IntoIterator<Item = &'t Task>, durations: &DurationConfig) -> Self {
        let tasks: Vec<&Task> = tasks.into_iter().collect();
        let mut graph = DiGraphMap::new();
        let mut order = Vec::with_capacity(tasks.len());
        let mut weights = HashMap::with_capacity(tasks.len());

        for t in &tasks {
            if graph.contains_node(t.id) {
                warn!(task = %t.id, "duplicate task id; keeping the first");
                continue;
            }
            graph.add_node(t.id);
            order.push(t.id);
            weights.insert(t.id, path_weight(t, durations));
        }

        for t in &tasks {
            for blocker in &t.blocked_by {
                if *blocker == t.id {
                    warn!(task = %t.id, "task lists itself as a blocker; ignoring");
                    continue;
                }
                if graph.contains_node(*blocker) {
                    graph.add_edge(*blocker, t.id, ());
                }
            }
        }

        Self {
            graph,
            order,
            weights,
        }
    }

    /// How many tasks each task blocks. Tasks blocking nothing are omitted.
    #[must_use]
    pub fn blocked_by_counts(&self) -> HashMap<TaskId, usize> {
        self.order
            .iter()
            .map(|id| (*id, self.graph.neighbors_directed(*id, Direction::Outgoing).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Longest weighted chain via Kahn's topological order.
    ///
    /// Tasks on a cycle never reach zero in-degree; they are left out of the
    /// result and counted in `unreached`.
    #[must_use]
    pub fn analyze(&self) -> CriticalPathAnalysis {
        let mut in_degree: HashMap<TaskId, usize> = self
            .order
            .iter()
            .map(|id| (*id, self.graph.neighbors_directed(*id, Direction::Incoming).count()))
            .collect();

        let mut longest: HashMap<TaskId, f64> = HashMap::new();
        let mut predecessor: HashMap<TaskId, TaskId> = HashMap::new();
        let mut queue: VecDeque<TaskId> = VecDeque::new();

        for id in &self.order {
            if in_degree.get(id) == Some(&0) {
                longest.insert(*id, self.weight(*id));
                queue.push_back(*id);
            }
        }

        let mut processed = Vec::with_capacity(self.order.len());
        while let Some(current) = queue.pop_front() {
            processed.push(current);
            let current_len = longest.get(&current).copied().unwrap_or(0.0);

            for dependent in self.graph.neighbors_directed(current, Direction::Outgoing) {
                let candidate = current_len + self.weight(dependent);
                if longest.get(&dependent).map_or(true, |existing| candidate > *existing) {
                    longest.insert(dependent, candidate);
                    predecessor.insert(dependent, current);
                }
                if let Some(d) = in_degree.get_mut(&dependent) {
                    if *d == 1 {
                        queue.push_back(dependent);
                    }
                    *d = d.saturating_sub(1);
                }
            }
        }

        let seen: HashSet<TaskId> = processed.iter().copied().collect();
        let unreached = self.order.iter().filter(|id| !seen.contains(id)).count();
        if unreached > 0 {
            warn!(unreached, "dependency cycle detected; cyclic tasks excluded from critical path");
        }

        let mut best: Option<(TaskId, f64)> = None;
        for id in &processed {
            let len = longest.get(id).copied().unwrap_or(0.0);
            if best.map_or(true, |(_, b)| len > b) {
                best = Some((*id, len));
            }
        }

        let mut chain = Vec::new();
        let mut total_weight = 0.0;
        if let Some((end, len)) = best {
            total_weight = len;
            let mut cursor = Some(end);
            while let Some(id) = cursor {
                chain.push(id);
                cursor = predecessor.get(&id).copied();
            }
            chain.reverse();
        }

        CriticalPathAnalysis {
            critical_path: chain.iter().copied().collect(),
            chain,
            total_weight,
            blocked_by_counts: self.blocked_by_counts(),
            unreached,
        }
    }

    fn weight(&self, id: TaskId) -> f64 {
        self.weights.get(&id).copied().unwrap_or(0.0)
    }
}

/// Critical-path weight of one task: its duration plus a priority bias.
#[must_use]
pub fn path_weight(task: &Task, durations: &DurationConfig) -> f64 {
    let priority = f64::from(task.priority.unwrap_or(durations.default_priority));
    task.duration_minutes(durations.default_task_minutes)
        + (durations.priority_pivot - priority) * durations.priority_step_minutes
}

/// Ids of the tasks on the longest blocking chain.
///
/// # Errors
/// Returns `DuplicateTaskId` if two tasks share an id.
pub fn compute_critical_path(tasks: &[Task], durations: &DurationConfig) -> Result<BTreeSet<TaskId>> {
    index_tasks(tasks)?;
    Ok(TaskGraph::build(tasks, durations).analyze().critical_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_task(id: i64, blocked_by: &[i64]) -> Task {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut t = Task::new(id, &format!("task {id}"), created);
        t.blocked_by = blocked_by.iter().map(|b| TaskId(*b)).collect();
        t
    }

    fn ids(v: &[i64]) -> BTreeSet<TaskId> {
        v.iter().map(|i| TaskId(*i)).collect()
    }

    #[test]
    fn test_simple_chain_is_critical() {
        let tasks = vec![make_task(1, &[]), make_task(2, &[1]), make_task(3, &[2])];
        let analysis = TaskGraph::build(&tasks, &DurationConfig::default()).analyze();
        assert_eq!(analysis.critical_path, ids(&[1, 2, 3]));
        assert_eq!(analysis.chain, vec![TaskId(1), TaskId(2), TaskId(3)]);
        assert_eq!(analysis.unreached, 0);
        // default 30 minutes + (4 - 3) * 10 each
        assert!((analysis.total_weight - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_longest_branch_wins() {
        let mut long = make_task(3, &[1]);
        long.estimated_minutes = 240;
        let tasks = vec![make_task(1, &[]), make_task(2, &[1]), long, make_task(4, &[])];
        let path = compute_critical_path(&tasks, &DurationConfig::default()).unwrap();
        assert_eq!(path, ids(&[1, 3]));
    }

    #[test]
    fn test_blocked_by_counts() {
        let tasks = vec![make_task(1, &[]), make_task(2, &[1]), make_task(3, &[1, 2])];
        let graph = TaskGraph::build(&tasks, &DurationConfig::default());
        let counts = graph.blocked_by_counts();
        assert_eq!(counts.get(&TaskId(1)), Some(&2));
        assert_eq!(counts.get(&TaskId(2)), Some(&1));
        assert_eq!(counts.get(&TaskId(3)), None);
    }

    #[test]
    fn test_cycle_is_tolerated() {
        let tasks = vec![make_task(1, &[]), make_task(2, &[3]), make_task(3, &[2])];
        let analysis = TaskGraph::build(&tasks, &DurationConfig::default()).analyze();
        assert_eq!(analysis.unreached, 2);
        assert_eq!(analysis.critical_path, ids(&[1]));
    }

    #[test]
    fn test_self_block_and_missing_blockers_ignored() {
        let tasks = vec![make_task(1, &[1, 99]), make_task(2, &[])];
        let analysis = TaskGraph::build(&tasks, &DurationConfig::default()).analyze();
        assert_eq!(analysis.unreached, 0);
        assert!(analysis.blocked_by_counts.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tasks = vec![make_task(1, &[]), make_task(1, &[]), make_task(2, &[1])];
        let err = compute_critical_path(&tasks, &DurationConfig::default()).unwrap_err();
        assert!(matches!(err, crate::engine::error::OptimizerError::DuplicateTaskId(TaskId(1))));
    }

    #[test]
    fn test_duplicate_ids_in_graph_counted_once() {
        let tasks = vec![make_task(1, &[]), make_task(1, &[]), make_task(2, &[1])];
        let analysis = TaskGraph::build(&tasks, &DurationConfig::default()).analyze();
        assert_eq!(analysis.unreached, 0);
        assert_eq!(analysis.chain, vec![TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_empty_graph() {
        let tasks: Vec<Task> = Vec::new();
        let analysis = TaskGraph::build(&tasks, &DurationConfig::default()).analyze();
        assert!(analysis.chain.is_empty());
        assert_eq!(analysis.unreached, 0);
    }
}
