//! Multi-objective task ranking engine.
//!
//! Scores every open task on ten dimensions, weights them for the current
//! situation, boosts the Pareto frontier and sorts. See
//! [`engine::optimizer::TaskOptimizer`] for the entry points.

pub mod engine;

pub use engine::cluster::{cluster_tasks, TaskCluster};
pub use engine::config::OptimizerConfig;
pub use engine::context::{OptimizationContext, RecentActivity, SessionContext};
pub use engine::error::{OptimizerError, Result};
pub use engine::graph::{compute_critical_path, CriticalPathAnalysis};
pub use engine::optimizer::{ScoreExplanation, TaskOptimizer};
pub use engine::pareto::find_pareto_frontier;
pub use engine::scoring::compute_score_vector;
pub use engine::similarity::task_similarity;
pub use engine::types::{Dimension, RankedTask, Stakeholder, Task, TaskId, TaskScoreVector, UserPreferences};
pub use engine::weights::{compute_final_score, AdaptiveWeights};
