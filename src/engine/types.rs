//! Core types for the optimizer.
//!
//! Tasks and preferences are owned by the caller; the engine only reads them.
//! `TaskScoreVector` and `RankedTask` are produced fresh on every ranking pass.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who a task is done for.
///
/// Serialized as a plain string; the literal `"self"` maps to `Myself`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stakeholder {
    Myself,
    Named(String),
}

impl Stakeholder {
    /// Case-insensitive comparison of two stakeholders.
    #[must_use]
    pub fn matches(&self, other: &Stakeholder) -> bool {
        match (self, other) {
            (Self::Myself, Self::Myself) => true,
            (Self::Named(a), Self::Named(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl From<String> for Stakeholder {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("self") {
            Self::Myself
        } else {
            Self::Named(s)
        }
    }
}

impl From<Stakeholder> for String {
    fn from(s: Stakeholder) -> Self {
        match s {
            Stakeholder::Myself => "self".to_string(),
            Stakeholder::Named(name) => name,
        }
    }
}

impl fmt::Display for Stakeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Myself => write!(f, "self"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A task in the user's backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    /// 1 is the highest priority.
    #[serde(default)]
    pub priority: Option<u8>,
    /// 0 means "use the configured default duration".
    #[serde(default)]
    pub estimated_minutes: u32,
    /// 1 (trivial) to 5 (draining).
    #[serde(default)]
    pub energy_level: Option<u8>,
    #[serde(default)]
    pub contexts: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub stakeholder: Option<Stakeholder>,
    #[serde(default)]
    pub blocked_by: BTreeSet<TaskId>,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub deep_work: bool,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates a task with every optional field unset.
    #[must_use]
    pub fn new(id: i64, title: &str, created_at: NaiveDateTime) -> Self {
        Self {
            id: TaskId(id),
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            created_at,
            priority: None,
            estimated_minutes: 0,
            energy_level: None,
            contexts: BTreeSet::new(),
            tags: BTreeSet::new(),
            category: None,
            project_id: None,
            stakeholder: None,
            blocked_by: BTreeSet::new(),
            parent_id: None,
            deep_work: false,
            completed: false,
        }
    }

    /// Duration used for scoring, falling back to `default_minutes` when unset.
    #[must_use]
    pub fn duration_minutes(&self, default_minutes: u32) -> f64 {
        if self.estimated_minutes == 0 {
            f64::from(default_minutes)
        } else {
            f64::from(self.estimated_minutes)
        }
    }
}

/// User-tunable sliders and habits that feed weight synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// 0-100.
    pub urgency_weight: f64,
    /// 0-100.
    pub context_weight: f64,
    /// 0-100.
    pub energy_weight: f64,
    /// 0-100.
    pub batching_weight: f64,
    /// 0-100; 100 hides blocked tasks entirely.
    pub blocked_task_penalty: f64,
    pub morning_peak_hour: u32,
    pub afternoon_peak_hour: u32,
    /// Overrides `OptimizerConfig::default_task_minutes` when set.
    pub default_task_minutes: Option<u32>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            urgency_weight: 70.0,
            context_weight: 50.0,
            energy_weight: 50.0,
            batching_weight: 40.0,
            blocked_task_penalty: 80.0,
            morning_peak_hour: 10,
            afternoon_peak_hour: 15,
            default_task_minutes: None,
        }
    }
}

/// The ten fitness dimensions scored for every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Urgency,
    Importance,
    Effort,
    ContextFit,
    EnergyAlignment,
    Momentum,
    Dependency,
    Staleness,
    OpportunityCost,
    BatchingAffinity,
}

impl Dimension {
    pub const COUNT: usize = 10;

    pub const ALL: [Dimension; Self::COUNT] = [
        Self::Urgency,
        Self::Importance,
        Self::Effort,
        Self::ContextFit,
        Self::EnergyAlignment,
        Self::Momentum,
        Self::Dependency,
        Self::Staleness,
        Self::OpportunityCost,
        Self::BatchingAffinity,
    ];

    /// Dimensions compared by the Pareto dominance relation.
    pub const PARETO: [Dimension; 5] = [
        Self::Urgency,
        Self::Importance,
        Self::Effort,
        Self::ContextFit,
        Self::EnergyAlignment,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Urgency => "urgency",
            Self::Importance => "importance",
            Self::Effort => "effort",
            Self::ContextFit => "context_fit",
            Self::EnergyAlignment => "energy_alignment",
            Self::Momentum => "momentum",
            Self::Dependency => "dependency",
            Self::Staleness => "staleness",
            Self::OpportunityCost => "opportunity_cost",
            Self::BatchingAffinity => "batching_affinity",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-task dimension scores for one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskScoreVector {
    pub task_id: TaskId,
    pub scores: [f64; Dimension::COUNT],
}

impl TaskScoreVector {
    #[must_use]
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            scores: [0.0; Dimension::COUNT],
        }
    }

    #[must_use]
    pub fn get(&self, dim: Dimension) -> f64 {
        self.scores[dim.index()]
    }

    pub fn set(&mut self, dim: Dimension, value: f64) {
        self.scores[dim.index()] = value;
    }

    /// Iterates `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(|d| (*d, self.get(*d)))
    }
}

/// A task with its final rank score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTask {
    pub task: Task,
    pub score: f64,
    pub vector: TaskScoreVector,
    pub on_frontier: bool,
}
