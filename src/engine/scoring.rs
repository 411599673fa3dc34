//! Score vector computation: the ten per-task fitness dimensions.
//!
//! Every scorer is a pure function of the task, the pass context and (for
//! opportunity cost) the rest of the candidate list. Missing optional fields
//! degrade to a neutral score instead of failing.

use super::context::OptimizationContext;
use super::math::{
    exponential_decay, gaussian_score, hyperbolic_growth, jaccard, sigmoid_decay,
};
use super::similarity::task_similarity;
use super::types::{Dimension, Stakeholder, Task, TaskScoreVector};
use chrono::NaiveDateTime;
use tracing::trace;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days from `from` to `to` (negative when `to` is earlier).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}

fn age_days(task: &Task, now: NaiveDateTime) -> f64 {
    days_between(task.created_at, now).max(0.0)
}

/// Computes all ten dimension scores for `task`.
///
/// `all_tasks` is the candidate list the task competes against.
#[must_use]
pub fn compute_score_vector(
    task: &Task,
    ctx: &OptimizationContext<'_>,
    all_tasks: &[&Task],
) -> TaskScoreVector {
    let mut v = TaskScoreVector::new(task.id);
    v.set(Dimension::Urgency, urgency(task, ctx));
    v.set(Dimension::Importance, importance(task, ctx));
    v.set(Dimension::Effort, effort(task, ctx));
    v.set(Dimension::ContextFit, context_fit(task, ctx));
    v.set(Dimension::EnergyAlignment, energy_alignment(task, ctx));
    v.set(Dimension::Momentum, momentum(task, ctx));
    v.set(Dimension::Dependency, dependency(task, ctx));
    v.set(Dimension::Staleness, staleness(task, ctx));
    v.set(Dimension::OpportunityCost, opportunity_cost(task, ctx, all_tasks));
    v.set(Dimension::BatchingAffinity, batching_affinity(task, ctx));
    trace!(task = %task.id, scores = ?v.scores, "score vector");
    v
}

/// Deadline pressure. Exceeds 1.0 only for overdue tasks.
#[must_use]
pub fn urgency(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.urgency;
    let Some(due) = task.due_date else {
        let age = age_days(task, ctx.now());
        return cfg.undated_scale
            * sigmoid_decay(age, cfg.undated_midpoint_days, cfg.undated_steepness, true);
    };

    let days = days_between(ctx.now(), due);
    if days < 0.0 {
        return cfg.overdue_base + hyperbolic_growth(-days, cfg.overdue_scale, cfg.overdue_max);
    }

    let long_range = exponential_decay(days, cfg.half_life_days);
    // Floored at the long-range term so the blend never rises with distance.
    let near = sigmoid_decay(days, cfg.near_midpoint_days, cfg.near_steepness, false).max(long_range);
    let w = sigmoid_decay(days, cfg.blend_midpoint_days, cfg.blend_steepness, false);
    w * near + (1.0 - w) * long_range
}

/// Normalized importance from priority, stakeholder, project, deep work and blocking.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn importance(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.importance;
    let mut score = 0.0;
    let mut max = 0.0;

    if let Some(priority) = task.priority {
        let rank = i32::from(priority.max(1)) - 1;
        score += 0.5_f64.powi(rank) * cfg.priority_scale;
        max += cfg.priority_scale;
    }

    if let Some(stakeholder) = &task.stakeholder {
        score += match stakeholder {
            Stakeholder::Myself => cfg.stakeholder_bonus * cfg.self_stakeholder_factor,
            Stakeholder::Named(_) => cfg.stakeholder_bonus,
        };
        max += cfg.stakeholder_bonus;
    }

    if task.project_id.is_some() {
        score += cfg.project_bonus;
        max += cfg.project_bonus;
        if ctx.analysis.is_critical(task.id) {
            score += cfg.critical_path_bonus;
            max += cfg.critical_path_bonus;
        }
    }

    if task.deep_work {
        score += cfg.deep_work_bonus;
        max += cfg.deep_work_bonus;
    }

    let blocking = ctx.analysis.unblocks(task.id);
    if blocking > 0 {
        score += (blocking as f64 * cfg.blocking_step).min(1.0);
        max += 1.0;
    }

    if max <= 0.0 {
        return cfg.neutral;
    }
    (score / max).clamp(0.0, 1.0)
}

/// Inverted effort: quick tasks score high, tasks overflowing the block score low.
#[must_use]
pub fn effort(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.effort;
    let minutes = task.duration_minutes(ctx.default_minutes());
    let available = ctx.session.available_block_minutes.max(0.0);

    if minutes > available {
        return cfg.overflow_factor * (available / minutes);
    }

    let base = 1.0 / (1.0 + (1.0 + minutes / cfg.log_divisor_minutes).ln() * cfg.log_factor);
    let fill = if available > 0.0 { minutes / available } else { 0.0 };
    if (cfg.tight_fit_min..=cfg.tight_fit_max).contains(&fill) {
        (base * cfg.tight_fit_bonus).min(1.0)
    } else {
        base
    }
}

/// How well the task's contexts match where the user can act right now.
#[must_use]
pub fn context_fit(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.context_fit;
    if task.contexts.is_empty() {
        return cfg.universal;
    }
    let available = &ctx.session.available_contexts;
    if available.is_empty() {
        return cfg.unconstrained;
    }

    let overlap = jaccard(&task.contexts, available);
    if overlap > 0.0 {
        (overlap + cfg.overlap_bonus).min(1.0)
    } else {
        0.0
    }
}

/// Fit between the task's energy demand and the modeled energy right now.
#[must_use]
pub fn energy_alignment(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.energy;
    let Some(level) = task.energy_level else {
        return cfg.unset;
    };

    let demand = f64::from(level);
    let current = ctx.modeled_energy;
    let mut score = gaussian_score(demand - current, cfg.sigma);

    if demand >= cfg.demanding_task_level && current <= cfg.low_energy_level {
        score *= cfg.strain_factor;
    }
    if demand <= cfg.low_energy_level && current <= cfg.low_energy_level {
        score *= cfg.low_window_boost;
    }
    score.min(1.0)
}

/// Recency-weighted similarity to recently completed work.
#[must_use]
pub fn momentum(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.momentum;
    let recent: Vec<&Task> = ctx.recent_tasks().filter(|r| r.id != task.id).collect();
    if recent.is_empty() {
        return cfg.neutral;
    }

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (position, other) in recent.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let weight = (-cfg.decay_rate * position as f64).exp();
        total += task_similarity(task, other, &ctx.config.similarity) * weight;
        weight_sum += weight;
    }
    let mut score = total / weight_sum;

    let shares_project = task
        .project_id
        .as_ref()
        .is_some_and(|p| recent.iter().any(|r| r.project_id.as_ref() == Some(p)));
    if shares_project {
        score = (score * cfg.shared_project_boost).min(1.0);
    }
    score
}

/// Penalizes blocked tasks and rewards tasks that unblock others.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn dependency(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.dependency;
    if ctx.is_blocked(task) {
        let penalty = ctx.preferences().blocked_task_penalty;
        return (1.0 - penalty / 100.0).clamp(cfg.blocked_floor, 1.0);
    }

    let unblocks = ctx.analysis.unblocks(task.id) as f64;
    let mut score = cfg.base + ((1.0 + unblocks).ln() * cfg.unblock_log_factor).min(cfg.unblock_cap);
    if ctx.analysis.is_critical(task.id) {
        score *= cfg.critical_path_boost;
    }
    let urgent_parent = task
        .parent_id
        .and_then(|id| ctx.task(id))
        .is_some_and(|parent| parent.priority == Some(1));
    if urgent_parent {
        score *= cfg.urgent_parent_boost;
    }
    score.min(1.0)
}

/// Freshness: new tasks score high, decaying with age until long-neglected
/// tasks are partially revived.
#[must_use]
pub fn staleness(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.staleness;
    let age = age_days(task, ctx.now());
    if age < cfg.fresh_days {
        return 1.0;
    }

    let mut score = 1.0 / (1.0 + (age / cfg.scale_days).powf(cfg.exponent));
    if age > cfg.revival_after_days {
        let revival = cfg.revival_scale
            * sigmoid_decay(
                age - cfg.revival_after_days,
                cfg.revival_midpoint_days,
                cfg.revival_steepness,
                true,
            );
        score = score.max(revival);
    }
    score
}

/// Cheap heuristic value used to compare a task against its competitors.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn task_value(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.opportunity;
    let priority = f64::from(task.priority.unwrap_or(ctx.config.durations.default_priority));
    let mut value = (cfg.priority_pivot - priority).max(1.0);

    if let Some(due) = task.due_date {
        let days = days_between(ctx.now(), due);
        value += if days < 0.0 {
            cfg.overdue_value
        } else if days <= 1.0 {
            cfg.due_within_day_value
        } else if days <= 3.0 {
            cfg.due_within_three_days_value
        } else if days <= 7.0 {
            cfg.due_within_week_value
        } else {
            0.0
        };
    }

    value += ctx.analysis.unblocks(task.id) as f64 * cfg.blocking_factor;
    if task.project_id.is_some() {
        value += cfg.project_value;
    }
    if task.stakeholder.is_some() {
        value += cfg.stakeholder_value;
    }
    value.max(cfg.min_value)
}

/// What is given up by not doing this task: its value relative to the rest.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn opportunity_cost(task: &Task, ctx: &OptimizationContext<'_>, all_tasks: &[&Task]) -> f64 {
    let cfg = &ctx.config.opportunity;
    let others: Vec<f64> = all_tasks
        .iter()
        .filter(|t| t.id != task.id)
        .map(|t| task_value(t, ctx))
        .collect();
    if others.is_empty() {
        return 1.0;
    }

    let this = task_value(task, ctx);
    let max_other = others.iter().copied().fold(f64::MIN, f64::max);
    let avg_other = others.iter().sum::<f64>() / others.len() as f64;
    if max_other <= 0.0 || avg_other <= 0.0 {
        return 1.0;
    }

    (cfg.max_share * (this / max_other) + cfg.average_share * (this / avg_other).min(1.0)).min(1.0)
}

/// Affinity with what the user has just been doing.
#[must_use]
pub fn batching_affinity(task: &Task, ctx: &OptimizationContext<'_>) -> f64 {
    let cfg = &ctx.config.batching;
    let recent = &ctx.session.recent;
    let mut score = cfg.baseline;

    if let Some(category) = &task.category {
        if recent.categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            score += cfg.category_bonus;
        }
    }
    if let Some(project) = &task.project_id {
        if recent.project_ids.contains(project) {
            score += cfg.project_bonus;
        }
    }
    if !task.tags.is_empty() && !recent.tags.is_empty() {
        score += cfg.tag_bonus * jaccard(&task.tags, recent.tags.iter());
    }
    if let (Some(mine), Some(current)) = (&task.stakeholder, &ctx.session.current_stakeholder) {
        if mine.matches(current) {
            score += cfg.stakeholder_bonus;
        }
    }
    let context_overlap = task.contexts.iter().any(|c| {
        recent
            .contexts
            .iter()
            .any(|r| r.eq_ignore_ascii_case(c))
    });
    if context_overlap {
        score += cfg.context_bonus;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::OptimizerConfig;
    use crate::engine::context::SessionContext;
    use crate::engine::types::{TaskId, UserPreferences};
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn make_task(id: i64) -> Task {
        Task::new(id, &format!("task {id}"), now())
    }

    fn session() -> SessionContext {
        SessionContext::new(now(), UserPreferences::default())
    }

    fn with_ctx<R>(
        session: &SessionContext,
        tasks: &[Task],
        f: impl FnOnce(&OptimizationContext<'_>) -> R,
    ) -> R {
        let config = OptimizerConfig::default();
        let ctx = OptimizationContext::build(session, &config, tasks).unwrap();
        f(&ctx)
    }

    #[test]
    fn test_effort_overflow() {
        let mut t = make_task(1);
        t.estimated_minutes = 120;
        let s = session();
        let tasks = vec![t];
        let e = with_ctx(&s, &tasks, |ctx| effort(&tasks[0], ctx));
        assert!((e - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_effort_tight_fit_bonus() {
        let mut fits = make_task(1);
        fits.estimated_minutes = 50;
        let s = session();
        let tasks = vec![fits];
        let e = with_ctx(&s, &tasks, |ctx| effort(&tasks[0], ctx));
        let base = 1.0 / (1.0 + (1.0 + 50.0_f64 / 5.0).ln() * 0.3);
        assert!((e - base * 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_urgency_overdue_exceeds_one() {
        let mut t = make_task(1);
        t.due_date = Some(now() - Duration::days(5));
        let s = session();
        let tasks = vec![t];
        let u = with_ctx(&s, &tasks, |ctx| urgency(&tasks[0], ctx));
        assert!(u > 1.0 && u < 1.5);
    }

    #[test]
    fn test_urgency_undated_grows_with_age() {
        let fresh = make_task(1);
        let mut old = make_task(2);
        old.created_at = now() - Duration::days(40);
        let s = session();
        let tasks = vec![fresh, old];
        let (a, b) = with_ctx(&s, &tasks, |ctx| (urgency(&tasks[0], ctx), urgency(&tasks[1], ctx)));
        assert!(a < b);
        assert!(b <= 0.5);
    }

    #[test]
    fn test_importance_neutral_without_signals() {
        let s = session();
        let tasks = vec![make_task(1)];
        let i = with_ctx(&s, &tasks, |ctx| importance(&tasks[0], ctx));
        assert!((i - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_importance_self_stakeholder_halved() {
        let mut t = make_task(1);
        t.priority = Some(1);
        t.stakeholder = Some(Stakeholder::Myself);
        let s = session();
        let tasks = vec![t];
        let i = with_ctx(&s, &tasks, |ctx| importance(&tasks[0], ctx));
        assert!((i - 3.5 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_context_fit_cases() {
        let universal = make_task(1);
        let mut phone = make_task(2);
        phone.contexts = ["@phone".to_string()].into_iter().collect();
        let mut office = make_task(3);
        office.contexts = ["@office".to_string()].into_iter().collect();
        let tasks = vec![universal, phone, office];

        let unconstrained = session();
        with_ctx(&unconstrained, &tasks, |ctx| {
            assert!((context_fit(&tasks[0], ctx) - 0.6).abs() < 1e-12);
            assert!((context_fit(&tasks[1], ctx) - 0.8).abs() < 1e-12);
        });

        let mut constrained = session();
        constrained.available_contexts = ["@Phone".to_string(), "@home".to_string()]
            .into_iter()
            .collect();
        with_ctx(&constrained, &tasks, |ctx| {
            assert!((context_fit(&tasks[1], ctx) - 0.7).abs() < 1e-12);
            assert!(context_fit(&tasks[2], ctx).abs() < 1e-12);
        });
    }

    #[test]
    fn test_energy_unset_is_neutral() {
        let s = session();
        let tasks = vec![make_task(1)];
        let e = with_ctx(&s, &tasks, |ctx| energy_alignment(&tasks[0], ctx));
        assert!((e - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_prefers_same_project() {
        let mut done = make_task(1);
        done.project_id = Some("apollo".to_string());
        done.completed = true;
        let mut same = make_task(2);
        same.project_id = Some("apollo".to_string());
        let mut other = make_task(3);
        other.project_id = Some("zeus".to_string());
        let tasks = vec![done, same, other];

        let mut s = session();
        s.recent.completed.push(TaskId(1));
        with_ctx(&s, &tasks, |ctx| {
            assert!(momentum(&tasks[1], ctx) > momentum(&tasks[2], ctx));
        });

        let fresh = session();
        with_ctx(&fresh, &tasks, |ctx| {
            assert!((momentum(&tasks[1], ctx) - 0.5).abs() < 1e-12);
        });
    }

    #[test]
    fn test_dependency_blocked_penalty() {
        let blocker = make_task(1);
        let mut blocked = make_task(2);
        blocked.blocked_by = [TaskId(1)].into_iter().collect();
        let tasks = vec![blocker, blocked];
        let s = session();
        with_ctx(&s, &tasks, |ctx| {
            assert!((dependency(&tasks[1], ctx) - 0.2).abs() < 1e-9);
            // unblocks one task and sits on the critical path
            let expected = ((0.7 + 2.0_f64.ln() * 0.15) * 1.2).min(1.0);
            assert!((dependency(&tasks[0], ctx) - expected).abs() < 1e-9);
        });
    }

    #[test]
    fn test_staleness_fresh_decay_and_revival() {
        let fresh = make_task(1);
        let mut month = make_task(2);
        month.created_at = now() - Duration::days(14);
        let mut ancient = make_task(3);
        ancient.created_at = now() - Duration::days(120);
        let tasks = vec![fresh, month, ancient];
        let s = session();
        with_ctx(&s, &tasks, |ctx| {
            assert!((staleness(&tasks[0], ctx) - 1.0).abs() < 1e-12);
            assert!((staleness(&tasks[1], ctx) - 0.5).abs() < 1e-9);
            let plain = 1.0 / (1.0 + (120.0_f64 / 14.0).powf(1.5));
            assert!(staleness(&tasks[2], ctx) > plain);
        });
    }

    #[test]
    fn test_opportunity_cost_single_and_relative() {
        let mut high = make_task(1);
        high.priority = Some(1);
        let mut low = make_task(2);
        low.priority = Some(4);
        let tasks = vec![high, low];
        let s = session();
        with_ctx(&s, &tasks, |ctx| {
            let refs: Vec<&Task> = tasks.iter().collect();
            assert!((opportunity_cost(&tasks[0], ctx, &refs[..1]) - 1.0).abs() < 1e-12);
            let hi = opportunity_cost(&tasks[0], ctx, &refs);
            let lo = opportunity_cost(&tasks[1], ctx, &refs);
            assert!((hi - 1.0).abs() < 1e-12);
            assert!((lo - 0.25).abs() < 1e-12);
        });
    }

    #[test]
    fn test_batching_affinity_bonuses() {
        let mut t = make_task(1);
        t.project_id = Some("apollo".to_string());
        t.category = Some("Work".to_string());
        t.contexts = ["@desk".to_string()].into_iter().collect();
        let tasks = vec![t];

        let plain = session();
        with_ctx(&plain, &tasks, |ctx| {
            assert!((batching_affinity(&tasks[0], ctx) - 0.5).abs() < 1e-12);
        });

        let mut warmed = session();
        warmed.recent.project_ids.push("apollo".to_string());
        warmed.recent.categories.push("work".to_string());
        warmed.recent.contexts.push("@DESK".to_string());
        with_ctx(&warmed, &tasks, |ctx| {
            assert!((batching_affinity(&tasks[0], ctx) - 1.0).abs() < 1e-12);
        });
    }
}
