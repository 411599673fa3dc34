//! Ranking orchestrator: single-pass and sequential optimization.

use super::cluster::{cluster_tasks, TaskCluster};
use super::config::OptimizerConfig;
use super::context::{index_tasks, OptimizationContext, SessionContext};
use super::error::{OptimizerError, Result};
use super::graph::{CriticalPathAnalysis, TaskGraph};
use super::pareto::frontier_indices;
use super::scoring::compute_score_vector;
use super::types::{RankedTask, Task, TaskId, TaskScoreVector};
use super::weights::{aggregate, contributions, synthesize_weights, AdaptiveWeights, DimensionContribution};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Why a task scored what it did.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreExplanation {
    pub task: Task,
    /// Zero-based position in the single-pass ranking, if the task was ranked.
    pub rank: Option<usize>,
    pub vector: TaskScoreVector,
    pub weights: AdaptiveWeights,
    pub contributions: Vec<DimensionContribution>,
    pub on_frontier: bool,
    pub blocked: bool,
    pub critical: bool,
    pub final_score: f64,
}

/// Stateless ranking engine; holds only its tuning parameters.
#[derive(Debug, Clone, Default)]
pub struct TaskOptimizer {
    config: OptimizerConfig,
}

impl TaskOptimizer {
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Ranks open tasks by final score, best first.
    ///
    /// Blocked tasks are hidden only when the blocked-task penalty is 100.
    ///
    /// # Errors
    /// Returns `DuplicateTaskId` if two tasks share an id.
    pub fn optimize_tasks(&self, tasks: &[Task], session: &SessionContext) -> Result<Vec<RankedTask>> {
        let ctx = OptimizationContext::build(session, &self.config, tasks)?;
        Ok(self.rank(&ctx, tasks))
    }

    /// Plans an order by repeatedly taking the top task and replaying the
    /// pick into a private copy of the session.
    ///
    /// Each picked task is treated as done for later passes: its labels join
    /// the recent-activity windows and tasks it blocked are released. The
    /// caller's session is left untouched.
    ///
    /// # Errors
    /// Returns `DuplicateTaskId` if two tasks share an id.
    pub fn optimize_tasks_sequentially(
        &self,
        tasks: &[Task],
        session: &SessionContext,
    ) -> Result<Vec<RankedTask>> {
        index_tasks(tasks)?;
        let mut working = tasks.to_vec();
        let mut session = session.clone();
        let mut plan = Vec::new();

        loop {
            let top = {
                let ctx = OptimizationContext::build(&session, &self.config, &working)?;
                self.rank(&ctx, &working).into_iter().next()
            };
            let Some(best) = top else {
                break;
            };

            debug!(task = %best.task.id, score = best.score, step = plan.len(), "sequential pick");
            session.record_pick(&best.task);
            if let Some(picked) = working.iter_mut().find(|t| t.id == best.task.id) {
                picked.completed = true;
            }
            plan.push(best);
        }
        Ok(plan)
    }

    /// Breaks down one task's score under the current session.
    ///
    /// # Errors
    /// Returns `TaskNotFound` if `id` is not in `tasks`, or `DuplicateTaskId`.
    pub fn explain(&self, id: TaskId, tasks: &[Task], session: &SessionContext) -> Result<ScoreExplanation> {
        let ctx = OptimizationContext::build(session, &self.config, tasks)?;
        let task = ctx
            .task(id)
            .ok_or_else(|| OptimizerError::TaskNotFound(id.to_string()))?;
        let weights = synthesize_weights(&ctx);
        let ranked = self.rank(&ctx, tasks);
        let rank = ranked.iter().position(|r| r.task.id == id);

        let (vector, final_score, on_frontier) = match rank.map(|i| &ranked[i]) {
            Some(r) => (r.vector.clone(), r.score, r.on_frontier),
            None => {
                let open: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
                let vector = compute_score_vector(task, &ctx, &open);
                let agg = &self.config.aggregation;
                let score = aggregate(&vector, &weights, agg.log_floor, agg.scale);
                (vector, score, false)
            }
        };

        Ok(ScoreExplanation {
            task: task.clone(),
            rank,
            contributions: contributions(&vector, &weights, self.config.aggregation.log_floor),
            vector,
            weights,
            on_frontier,
            blocked: ctx.is_blocked(task),
            critical: ctx.analysis.is_critical(id),
            final_score,
        })
    }

    /// Groups open tasks into batches.
    ///
    /// # Errors
    /// Returns `InvalidClusterCount` or `DuplicateTaskId`.
    pub fn cluster(&self, tasks: &[Task], max_clusters: usize) -> Result<Vec<TaskCluster>> {
        index_tasks(tasks)?;
        let open: Vec<Task> = tasks.iter().filter(|t| !t.completed).cloned().collect();
        cluster_tasks(&open, max_clusters, &self.config.similarity)
    }

    /// Critical-path report over the open tasks.
    ///
    /// # Errors
    /// Returns `DuplicateTaskId` if two tasks share an id.
    pub fn critical_path(&self, tasks: &[Task]) -> Result<CriticalPathAnalysis> {
        index_tasks(tasks)?;
        let open = tasks.iter().filter(|t| !t.completed);
        Ok(TaskGraph::build(open, &self.config.durations).analyze())
    }

    fn rank(&self, ctx: &OptimizationContext<'_>, tasks: &[Task]) -> Vec<RankedTask> {
        let show_blocked = ctx.preferences().blocked_task_penalty < 100.0;
        let candidates: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.completed)
            .filter(|t| show_blocked || !ctx.is_blocked(t))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let weights = synthesize_weights(ctx);
        let vectors: Vec<TaskScoreVector> = candidates
            .iter()
            .map(|t| compute_score_vector(t, ctx, &candidates))
            .collect();
        let frontier: HashSet<usize> = frontier_indices(&vectors).into_iter().collect();

        let agg = &self.config.aggregation;
        let mut ranked: Vec<RankedTask> = candidates
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (task, vector))| {
                let on_frontier = frontier.contains(&i);
                let mut score = aggregate(&vector, &weights, agg.log_floor, agg.scale);
                if on_frontier {
                    score *= agg.pareto_boost;
                }
                RankedTask {
                    task: (*task).clone(),
                    score,
                    vector,
                    on_frontier,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            candidates = ranked.len(),
            frontier = frontier.len(),
            critical_path = ctx.analysis.chain.len(),
            backlog = ctx.backlog_size,
            "ranked tasks"
        );
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::UserPreferences;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn make_task(id: i64) -> Task {
        Task::new(id, &format!("task {id}"), now())
    }

    #[test]
    fn test_empty_list() {
        let session = SessionContext::new(now(), UserPreferences::default());
        let optimizer = TaskOptimizer::default();
        assert!(optimizer.optimize_tasks(&[], &session).unwrap().is_empty());
        assert!(optimizer
            .optimize_tasks_sequentially(&[], &session)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_blocked_tasks_hidden_at_full_penalty() {
        let blocker = make_task(1);
        let mut blocked = make_task(2);
        blocked.blocked_by = [TaskId(1)].into_iter().collect();
        let tasks = vec![blocker, blocked];
        let optimizer = TaskOptimizer::default();

        let mut session = SessionContext::new(now(), UserPreferences::default());
        assert_eq!(optimizer.optimize_tasks(&tasks, &session).unwrap().len(), 2);

        session.preferences.blocked_task_penalty = 100.0;
        let ranked = optimizer.optimize_tasks(&tasks, &session).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].task.id, TaskId(1));
    }

    #[test]
    fn test_sequential_releases_blocked_tasks() {
        let blocker = make_task(1);
        let mut blocked = make_task(2);
        blocked.blocked_by = [TaskId(1)].into_iter().collect();
        let tasks = vec![blocked, blocker];
        let optimizer = TaskOptimizer::default();
        let mut session = SessionContext::new(now(), UserPreferences::default());
        session.preferences.blocked_task_penalty = 100.0;

        let plan = optimizer.optimize_tasks_sequentially(&tasks, &session).unwrap();
        let order: Vec<TaskId> = plan.iter().map(|r| r.task.id).collect();
        assert_eq!(order, vec![TaskId(1), TaskId(2)]);
        assert!(session.recent.completed.is_empty());
    }

    #[test]
    fn test_completed_tasks_not_ranked() {
        let mut done = make_task(1);
        done.completed = true;
        let tasks = vec![done, make_task(2)];
        let session = SessionContext::new(now(), UserPreferences::default());
        let ranked = TaskOptimizer::default().optimize_tasks(&tasks, &session).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].task.id, TaskId(2));
    }

    #[test]
    fn test_explain_matches_ranking() {
        let mut urgent = make_task(1);
        urgent.priority = Some(1);
        let tasks = vec![urgent, make_task(2)];
        let session = SessionContext::new(now(), UserPreferences::default());
        let optimizer = TaskOptimizer::default();
        let ranked = optimizer.optimize_tasks(&tasks, &session).unwrap();
        let explanation = optimizer.explain(TaskId(1), &tasks, &session).unwrap();
        let entry = ranked.iter().find(|r| r.task.id == TaskId(1)).unwrap();
        assert!((explanation.final_score - entry.score).abs() < 1e-12);
        assert_eq!(explanation.contributions.len(), 10);

        let missing = optimizer.explain(TaskId(9), &tasks, &session).err();
        assert!(matches!(missing, Some(OptimizerError::TaskNotFound(_))));
    }

    #[test]
    fn test_frontier_tasks_get_the_pareto_boost() {
        // Identical except priority, so the unprioritized task is dominated on importance.
        let mut strong = make_task(1);
        strong.priority = Some(1);
        let weak = make_task(2);
        let tasks = vec![strong, weak];
        let session = SessionContext::new(now(), UserPreferences::default());
        let optimizer = TaskOptimizer::default();
        let ranked = optimizer.optimize_tasks(&tasks, &session).unwrap();

        let config = optimizer.config();
        let ctx = OptimizationContext::build(&session, config, &tasks).unwrap();
        let weights = synthesize_weights(&ctx);
        let agg = &config.aggregation;

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].task.id, TaskId(1));
        assert!(ranked[0].on_frontier);
        assert!(!ranked[1].on_frontier);
        for r in &ranked {
            let base = aggregate(&r.vector, &weights, agg.log_floor, agg.scale);
            let expected = if r.on_frontier { base * agg.pareto_boost } else { base };
            assert!((r.score - expected).abs() < 1e-9, "{}: {} vs {}", r.task.id, r.score, expected);
        }
        assert!((agg.pareto_boost - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_ids_rejected_everywhere() {
        let tasks = vec![make_task(1), make_task(1)];
        let session = SessionContext::new(now(), UserPreferences::default());
        let optimizer = TaskOptimizer::default();
        assert!(optimizer.optimize_tasks(&tasks, &session).is_err());
        assert!(optimizer.optimize_tasks_sequentially(&tasks, &session).is_err());
        assert!(optimizer.cluster(&tasks, 2).is_err());
        assert!(optimizer.critical_path(&tasks).is_err());
    }
}
