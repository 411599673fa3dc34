//! Optimization context: the snapshot every scorer reads during one pass.
//!
//! `SessionContext` is what the caller hands in (clock, energy, block length,
//! rolling activity). `OptimizationContext` wraps it together with the
//! dependency analysis and a task index for one ranking pass.

use super::config::{OptimizerConfig, RecencyCaps};
use super::energy::{fractional_hour, modeled_energy};
use super::error::{OptimizerError, Result};
use super::graph::{CriticalPathAnalysis, TaskGraph};
use super::recency::RecentWindow;
use super::types::{Stakeholder, Task, TaskId, UserPreferences};
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};

/// Rolling windows of what the user worked on most recently.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentActivity {
    pub categories: RecentWindow<String>,
    pub project_ids: RecentWindow<String>,
    pub tags: RecentWindow<String>,
    pub contexts: RecentWindow<String>,
    pub completed: RecentWindow<TaskId>,
}

impl RecentActivity {
    #[must_use]
    pub fn new(caps: &RecencyCaps) -> Self {
        Self {
            categories: RecentWindow::new(caps.categories),
            project_ids: RecentWindow::new(caps.projects),
            tags: RecentWindow::new(caps.tags),
            contexts: RecentWindow::new(caps.contexts),
            completed: RecentWindow::new(caps.completed),
        }
    }

    /// Pushes a just-finished task's labels to the front of every window.
    pub fn record(&mut self, task: &Task) {
        if let Some(category) = &task.category {
            self.categories.push(category.clone());
        }
        if let Some(project) = &task.project_id {
            self.project_ids.push(project.clone());
        }
        for tag in &task.tags {
            self.tags.push(tag.clone());
        }
        for ctx in &task.contexts {
            self.contexts.push(ctx.clone());
        }
        self.completed.push(task.id);
    }
}

impl Default for RecentActivity {
    fn default() -> Self {
        Self::new(&RecencyCaps::default())
    }
}

/// Caller-supplied state for a ranking call.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Target date and hour; the engine never reads the wall clock.
    pub now: NaiveDateTime,
    /// Self-reported energy (1-5). Falls back to the circadian model.
    pub current_energy: Option<f64>,
    pub available_block_minutes: f64,
    pub high_time_pressure: bool,
    /// Contexts the user can act in right now; empty means unconstrained.
    pub available_contexts: BTreeSet<String>,
    pub current_stakeholder: Option<Stakeholder>,
    pub recent: RecentActivity,
    pub preferences: UserPreferences,
}

impl SessionContext {
    #[must_use]
    pub fn new(now: NaiveDateTime, preferences: UserPreferences) -> Self {
        Self {
            now,
            current_energy: None,
            available_block_minutes: 60.0,
            high_time_pressure: false,
            available_contexts: BTreeSet::new(),
            current_stakeholder: None,
            recent: RecentActivity::default(),
            preferences,
        }
    }

    /// Records `task` as the one just worked on.
    pub fn record_pick(&mut self, task: &Task) {
        self.recent.record(task);
        if let Some(stakeholder) = &task.stakeholder {
            self.current_stakeholder = Some(stakeholder.clone());
        }
    }
}

/// Immutable per-pass view shared by all dimension scorers.
pub struct OptimizationContext<'a> {
    pub session: &'a SessionContext,
    pub config: &'a OptimizerConfig,
    /// Number of open (not completed) tasks.
    pub backlog_size: usize,
    pub analysis: CriticalPathAnalysis,
    pub modeled_energy: f64,
    lookup: HashMap<TaskId, &'a Task>,
}

impl<'a> OptimizationContext<'a> {
    /// Builds the context over every known task, completed ones included.
    ///
    /// # Errors
    /// Returns `DuplicateTaskId` if two tasks share an id.
    pub fn build(
        session: &'a SessionContext,
        config: &'a OptimizerConfig,
        tasks: &'a [Task],
    ) -> Result<Self> {
        let lookup = index_tasks(tasks)?;
        let prefs = &session.preferences;

        let mut durations = config.durations.clone();
        if let Some(minutes) = prefs.default_task_minutes {
            durations.default_task_minutes = minutes;
        }
        let open: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
        let analysis = TaskGraph::build(open.iter().copied(), &durations).analyze();

        Ok(Self {
            session,
            config,
            backlog_size: open.len(),
            analysis,
            modeled_energy: modeled_energy(
                session.now,
                prefs.morning_peak_hour,
                prefs.afternoon_peak_hour,
                &config.circadian,
            ),
            lookup,
        })
    }

    #[must_use]
    pub fn preferences(&self) -> &UserPreferences {
        &self.session.preferences
    }

    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.session.now
    }

    /// Fractional hour of the target time.
    #[must_use]
    pub fn target_hour(&self) -> f64 {
        fractional_hour(self.session.now)
    }

    /// Reported energy if the user gave one, else the modeled level.
    #[must_use]
    pub fn current_energy(&self) -> f64 {
        self.session.current_energy.unwrap_or(self.modeled_energy)
    }

    #[must_use]
    pub fn default_minutes(&self) -> u32 {
        self.preferences()
            .default_task_minutes
            .unwrap_or(self.config.durations.default_task_minutes)
    }

    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&'a Task> {
        self.lookup.get(&id).copied()
    }

    /// True if any known blocker of `task` is still open.
    ///
    /// Unknown blocker ids and self-references count as resolved.
    #[must_use]
    pub fn is_blocked(&self, task: &Task) -> bool {
        task.blocked_by
            .iter()
            .filter(|b| **b != task.id)
            .any(|b| self.task(*b).is_some_and(|blocker| !blocker.completed))
    }

    /// Recently completed tasks, most recent first, skipping unknown ids.
    pub fn recent_tasks(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.session
            .recent
            .completed
            .iter()
            .filter_map(|id| self.task(*id))
    }
}

/// Indexes tasks by id, rejecting duplicates.
///
/// # Errors
/// Returns `DuplicateTaskId` on the first repeated id.
pub fn index_tasks(tasks: &[Task]) -> Result<HashMap<TaskId, &Task>> {
    let mut lookup = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if lookup.insert(task.id, task).is_some() {
            return Err(OptimizerError::DuplicateTaskId(task.id));
        }
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_record_pick_updates_windows() {
        let mut session = SessionContext::new(now(), UserPreferences::default());
        let mut task = Task::new(7, "Ship release", now());
        task.category = Some("work".to_string());
        task.project_id = Some("apollo".to_string());
        task.tags = ["deploy".to_string()].into_iter().collect();
        task.stakeholder = Some(Stakeholder::Named("Dana".to_string()));
        session.record_pick(&task);

        assert!(session.recent.project_ids.contains(&"apollo".to_string()));
        assert!(session.recent.categories.contains(&"work".to_string()));
        assert!(session.recent.completed.contains(&TaskId(7)));
        assert_eq!(
            session.current_stakeholder,
            Some(Stakeholder::Named("Dana".to_string()))
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tasks = vec![Task::new(1, "a", now()), Task::new(1, "b", now())];
        let session = SessionContext::new(now(), UserPreferences::default());
        let config = OptimizerConfig::default();
        let err = OptimizationContext::build(&session, &config, &tasks).err();
        assert!(matches!(err, Some(OptimizerError::DuplicateTaskId(TaskId(1)))));
    }

    #[test]
    fn test_blocked_only_by_open_known_tasks() {
        let mut done = Task::new(1, "done", now());
        done.completed = true;
        let open = Task::new(2, "open", now());
        let mut a = Task::new(3, "a", now());
        a.blocked_by = [TaskId(1), TaskId(42)].into_iter().collect();
        let mut b = Task::new(4, "b", now());
        b.blocked_by = [TaskId(2)].into_iter().collect();
        let tasks = vec![done, open, a, b];

        let session = SessionContext::new(now(), UserPreferences::default());
        let config = OptimizerConfig::default();
        let ctx = OptimizationContext::build(&session, &config, &tasks).unwrap();
        assert!(!ctx.is_blocked(&tasks[2]));
        assert!(ctx.is_blocked(&tasks[3]));
        assert_eq!(ctx.backlog_size, 3);
        assert_eq!(ctx.analysis.unblocks(TaskId(2)), 1);
    }
}
