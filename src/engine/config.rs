//! Optimizer configuration: every curve constant used by the scorer.
//!
//! All groups deserialize with `#[serde(default)]`, so a config file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Top-level tuning parameters for the optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub durations: DurationConfig,
    pub urgency: UrgencyConfig,
    pub importance: ImportanceConfig,
    pub effort: EffortConfig,
    pub context_fit: ContextFitConfig,
    pub energy: EnergyConfig,
    pub circadian: CircadianConfig,
    pub momentum: MomentumConfig,
    pub dependency: DependencyConfig,
    pub staleness: StalenessConfig,
    pub opportunity: OpportunityConfig,
    pub batching: BatchingConfig,
    pub similarity: SimilarityConfig,
    pub weights: WeightConfig,
    pub aggregation: AggregationConfig,
    pub recency: RecencyCaps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    /// Used when a task has no estimate.
    pub default_task_minutes: u32,
    /// Used when a task has no priority.
    pub default_priority: u8,
    /// Critical-path weight is `minutes + (pivot - priority) * step`.
    pub priority_pivot: f64,
    pub priority_step_minutes: f64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            default_task_minutes: 30,
            default_priority: 3,
            priority_pivot: 4.0,
            priority_step_minutes: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    pub undated_midpoint_days: f64,
    pub undated_steepness: f64,
    pub undated_scale: f64,
    pub overdue_base: f64,
    pub overdue_scale: f64,
    pub overdue_max: f64,
    pub near_midpoint_days: f64,
    pub near_steepness: f64,
    pub half_life_days: f64,
    pub blend_midpoint_days: f64,
    pub blend_steepness: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            undated_midpoint_days: 14.0,
            undated_steepness: 0.15,
            undated_scale: 0.5,
            overdue_base: 1.0,
            overdue_scale: 0.3,
            overdue_max: 0.5,
            near_midpoint_days: 3.0,
            near_steepness: 0.8,
            half_life_days: 7.0,
            blend_midpoint_days: 7.0,
            blend_steepness: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportanceConfig {
    pub priority_scale: f64,
    pub stakeholder_bonus: f64,
    /// Multiplier applied to the stakeholder bonus when the task is for oneself.
    pub self_stakeholder_factor: f64,
    pub project_bonus: f64,
    pub critical_path_bonus: f64,
    pub deep_work_bonus: f64,
    pub blocking_step: f64,
    pub neutral: f64,
}

impl Default for ImportanceConfig {
    fn default() -> Self {
        Self {
            priority_scale: 3.0,
            stakeholder_bonus: 1.0,
            self_stakeholder_factor: 0.5,
            project_bonus: 0.7,
            critical_path_bonus: 1.0,
            deep_work_bonus: 0.5,
            blocking_step: 0.3,
            neutral: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortConfig {
    pub overflow_factor: f64,
    pub log_divisor_minutes: f64,
    pub log_factor: f64,
    pub tight_fit_min: f64,
    pub tight_fit_max: f64,
    pub tight_fit_bonus: f64,
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            overflow_factor: 0.1,
            log_divisor_minutes: 5.0,
            log_factor: 0.3,
            tight_fit_min: 0.8,
            tight_fit_max: 1.0,
            tight_fit_bonus: 1.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextFitConfig {
    pub universal: f64,
    pub unconstrained: f64,
    pub overlap_bonus: f64,
}

impl Default for ContextFitConfig {
    fn default() -> Self {
        Self {
            universal: 0.6,
            unconstrained: 0.8,
            overlap_bonus: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub unset: f64,
    pub sigma: f64,
    pub demanding_task_level: f64,
    pub low_energy_level: f64,
    pub strain_factor: f64,
    pub low_window_boost: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            unset: 0.7,
            sigma: 1.5,
            demanding_task_level: 4.0,
            low_energy_level: 2.0,
            strain_factor: 0.5,
            low_window_boost: 1.1,
        }
    }
}

/// Parameters of the modeled daily energy curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircadianConfig {
    pub morning_sigma: f64,
    pub morning_amplitude: f64,
    pub afternoon_sigma: f64,
    pub afternoon_amplitude: f64,
    pub lunch_start_hour: f64,
    pub lunch_end_hour: f64,
    pub lunch_center_hour: f64,
    pub lunch_sigma: f64,
    pub lunch_amplitude: f64,
    pub ultradian_amplitude: f64,
    pub ultradian_period_minutes: f64,
    pub baseline: f64,
    pub min_level: f64,
    pub max_level: f64,
}

impl Default for CircadianConfig {
    fn default() -> Self {
        Self {
            morning_sigma: 2.0,
            morning_amplitude: 5.0,
            afternoon_sigma: 2.5,
            afternoon_amplitude: 4.0,
            lunch_start_hour: 12.5,
            lunch_end_hour: 14.5,
            lunch_center_hour: 13.5,
            lunch_sigma: 1.0,
            lunch_amplitude: 1.5,
            ultradian_amplitude: 0.3,
            ultradian_period_minutes: 90.0,
            baseline: 2.5,
            min_level: 1.0,
            max_level: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub neutral: f64,
    pub decay_rate: f64,
    pub shared_project_boost: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            neutral: 0.5,
            decay_rate: 0.3,
            shared_project_boost: 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub base: f64,
    pub unblock_log_factor: f64,
    pub unblock_cap: f64,
    pub critical_path_boost: f64,
    pub urgent_parent_boost: f64,
    pub blocked_floor: f64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            base: 0.7,
            unblock_log_factor: 0.15,
            unblock_cap: 0.3,
            critical_path_boost: 1.2,
            urgent_parent_boost: 1.1,
            blocked_floor: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessConfig {
    pub fresh_days: f64,
    pub scale_days: f64,
    pub exponent: f64,
    pub revival_after_days: f64,
    pub revival_midpoint_days: f64,
    pub revival_steepness: f64,
    pub revival_scale: f64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            fresh_days: 1.0,
            scale_days: 14.0,
            exponent: 1.5,
            revival_after_days: 30.0,
            revival_midpoint_days: 30.0,
            revival_steepness: 0.1,
            revival_scale: 0.4,
        }
    }
}

/// Heuristic "value" model used to compare a task against the rest of the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityConfig {
    pub max_share: f64,
    pub average_share: f64,
    /// Value contributed by priority is `(pivot - priority).max(1)`.
    pub priority_pivot: f64,
    pub overdue_value: f64,
    pub due_within_day_value: f64,
    pub due_within_three_days_value: f64,
    pub due_within_week_value: f64,
    pub blocking_factor: f64,
    pub project_value: f64,
    pub stakeholder_value: f64,
    pub min_value: f64,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            max_share: 0.7,
            average_share: 0.3,
            priority_pivot: 5.0,
            overdue_value: 4.0,
            due_within_day_value: 3.0,
            due_within_three_days_value: 2.0,
            due_within_week_value: 1.0,
            blocking_factor: 1.5,
            project_value: 0.5,
            stakeholder_value: 0.5,
            min_value: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    pub baseline: f64,
    pub category_bonus: f64,
    pub project_bonus: f64,
    pub tag_bonus: f64,
    pub stakeholder_bonus: f64,
    pub context_bonus: f64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            baseline: 0.5,
            category_bonus: 0.2,
            project_bonus: 0.25,
            tag_bonus: 0.15,
            stakeholder_bonus: 0.15,
            context_bonus: 0.1,
        }
    }
}

/// Feature weights of the task similarity metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub category: f64,
    pub project: f64,
    pub contexts: f64,
    pub tags: f64,
    pub stakeholder: f64,
    pub energy: f64,
    pub text: f64,
    /// Returned when only the text feature is comparable.
    pub unrelated_default: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            category: 2.0,
            project: 3.0,
            contexts: 1.5,
            tags: 1.5,
            stakeholder: 1.0,
            energy: 0.5,
            text: 1.0,
            unrelated_default: 0.3,
        }
    }
}

/// Base weights for the dimensions without a user slider, plus contextual modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub importance: f64,
    pub effort: f64,
    pub momentum: f64,
    pub dependency: f64,
    pub staleness: f64,
    pub opportunity_cost: f64,
    pub pressure: PressureModifier,
    pub low_energy: LowEnergyModifier,
    pub backlog: BacklogModifier,
    pub deep_work: DeepWorkModifier,
    pub late_day: LateDayModifier,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            importance: 0.5,
            effort: 0.3,
            momentum: 0.3,
            dependency: 0.4,
            staleness: 0.2,
            opportunity_cost: 0.3,
            pressure: PressureModifier::default(),
            low_energy: LowEnergyModifier::default(),
            backlog: BacklogModifier::default(),
            deep_work: DeepWorkModifier::default(),
            late_day: LateDayModifier::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureModifier {
    pub urgency: f64,
    pub effort: f64,
    pub batching: f64,
}

impl Default for PressureModifier {
    fn default() -> Self {
        Self {
            urgency: 1.5,
            effort: 1.3,
            batching: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowEnergyModifier {
    pub threshold: f64,
    pub energy_alignment: f64,
    pub effort: f64,
}

impl Default for LowEnergyModifier {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            energy_alignment: 1.5,
            effort: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogModifier {
    /// Fires when the backlog is strictly larger than this.
    pub threshold: usize,
    pub importance: f64,
    pub urgency: f64,
    pub staleness: f64,
}

impl Default for BacklogModifier {
    fn default() -> Self {
        Self {
            threshold: 50,
            importance: 1.2,
            urgency: 1.1,
            staleness: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepWorkModifier {
    /// Half-width of the window around the morning peak, in hours.
    pub window_hours: f64,
    pub importance: f64,
    pub effort: f64,
    pub momentum: f64,
}

impl Default for DeepWorkModifier {
    fn default() -> Self {
        Self {
            window_hours: 2.0,
            importance: 1.3,
            effort: 0.8,
            momentum: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateDayModifier {
    pub from_hour: u32,
    pub effort: f64,
    pub urgency: f64,
}

impl Default for LateDayModifier {
    fn default() -> Self {
        Self {
            from_hour: 16,
            effort: 1.4,
            urgency: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Scores are floored here before taking the logarithm.
    pub log_floor: f64,
    pub scale: f64,
    pub pareto_boost: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            log_floor: 0.001,
            scale: 100.0,
            pareto_boost: 1.15,
        }
    }
}

/// Capacities of the rolling recent-activity windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyCaps {
    pub categories: usize,
    pub projects: usize,
    pub tags: usize,
    pub contexts: usize,
    pub completed: usize,
}

impl Default for RecencyCaps {
    fn default() -> Self {
        Self {
            categories: 5,
            projects: 3,
            tags: 10,
            contexts: 5,
            completed: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: OptimizerConfig =
            serde_json::from_str(r#"{ "urgency": { "half_life_days": 10.0 } }"#).unwrap();
        assert!((cfg.urgency.half_life_days - 10.0).abs() < f64::EPSILON);
        assert!((cfg.urgency.near_midpoint_days - 3.0).abs() < f64::EPSILON);
        assert_eq!(cfg.recency, RecencyCaps::default());
    }
}
