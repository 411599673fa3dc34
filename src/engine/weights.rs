//! Adaptive weight synthesis and log-space score aggregation.

use super::context::OptimizationContext;
use super::types::{Dimension, TaskScoreVector};
use serde::Serialize;

/// One non-negative weight per dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveWeights {
    pub weights: [f64; Dimension::COUNT],
}

impl AdaptiveWeights {
    #[must_use]
    pub fn get(&self, dim: Dimension) -> f64 {
        self.weights[dim.index()]
    }

    fn scale(&mut self, dim: Dimension, factor: f64) {
        self.weights[dim.index()] *= factor;
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Derives weights from the user's sliders, then applies every contextual
/// modifier that fires. Modifiers compose multiplicatively.
#[must_use]
pub fn synthesize_weights(ctx: &OptimizationContext<'_>) -> AdaptiveWeights {
    let prefs = ctx.preferences();
    let cfg = &ctx.config.weights;
    let slider = |v: f64| (v / 100.0).max(0.0);

    let mut w = AdaptiveWeights {
        weights: [0.0; Dimension::COUNT],
    };
    for dim in Dimension::ALL {
        w.weights[dim.index()] = match dim {
            Dimension::Urgency => slider(prefs.urgency_weight),
            Dimension::ContextFit => slider(prefs.context_weight),
            Dimension::EnergyAlignment => slider(prefs.energy_weight),
            Dimension::BatchingAffinity => slider(prefs.batching_weight),
            Dimension::Importance => cfg.importance,
            Dimension::Effort => cfg.effort,
            Dimension::Momentum => cfg.momentum,
            Dimension::Dependency => cfg.dependency,
            Dimension::Staleness => cfg.staleness,
            Dimension::OpportunityCost => cfg.opportunity_cost,
        };
    }

    if ctx.session.high_time_pressure {
        w.scale(Dimension::Urgency, cfg.pressure.urgency);
        w.scale(Dimension::Effort, cfg.pressure.effort);
        w.scale(Dimension::BatchingAffinity, cfg.pressure.batching);
    }

    if ctx.current_energy() <= cfg.low_energy.threshold {
        w.scale(Dimension::EnergyAlignment, cfg.low_energy.energy_alignment);
        w.scale(Dimension::Effort, cfg.low_energy.effort);
    }

    if ctx.backlog_size > cfg.backlog.threshold {
        w.scale(Dimension::Importance, cfg.backlog.importance);
        w.scale(Dimension::Urgency, cfg.backlog.urgency);
        w.scale(Dimension::Staleness, cfg.backlog.staleness);
    }

    let hour = ctx.target_hour();
    let morning_peak = f64::from(prefs.morning_peak_hour);
    if (hour - morning_peak).abs() <= cfg.deep_work.window_hours {
        w.scale(Dimension::Importance, cfg.deep_work.importance);
        w.scale(Dimension::Effort, cfg.deep_work.effort);
        w.scale(Dimension::Momentum, cfg.deep_work.momentum);
    }

    if hour >= f64::from(cfg.late_day.from_hour) {
        w.scale(Dimension::Effort, cfg.late_day.effort);
        w.scale(Dimension::Urgency, cfg.late_day.urgency);
    }

    w
}

/// Weighted geometric mean of the vector, scaled to 0-100.
///
/// A near-zero score in a heavily weighted dimension drags the whole rank
/// down multiplicatively.
#[must_use]
pub fn aggregate(vector: &TaskScoreVector, weights: &AdaptiveWeights, log_floor: f64, scale: f64) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    let log_sum: f64 = vector
        .iter()
        .map(|(dim, score)| score.max(log_floor).ln() * weights.get(dim))
        .sum();
    (log_sum / total).exp() * scale
}

/// Final scalar score of one vector under the pass context.
#[must_use]
pub fn compute_final_score(vector: &TaskScoreVector, ctx: &OptimizationContext<'_>) -> f64 {
    let weights = synthesize_weights(ctx);
    let agg = &ctx.config.aggregation;
    aggregate(vector, &weights, agg.log_floor, agg.scale)
}

/// Per-dimension share of the aggregated log score.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionContribution {
    pub dimension: Dimension,
    pub score: f64,
    pub weight: f64,
    /// `weight * ln(score)` divided by the total weight.
    pub log_contribution: f64,
}

#[must_use]
pub fn contributions(
    vector: &TaskScoreVector,
    weights: &AdaptiveWeights,
    log_floor: f64,
) -> Vec<DimensionContribution> {
    let total = weights.total();
    vector
        .iter()
        .map(|(dimension, score)| {
            let weight = weights.get(dimension);
            let log_contribution = if total > 0.0 {
                score.max(log_floor).ln() * weight / total
            } else {
                0.0
            };
            DimensionContribution {
                dimension,
                score,
                weight,
                log_contribution,
            }
        })
        .collect()
}
