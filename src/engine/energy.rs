//! Circadian energy model.
//!
//! Estimates the user's energy (1-5) at a wall-clock time from two daily
//! peaks, a post-lunch dip and a 90-minute ultradian ripple.

use super::config::CircadianConfig;
use super::math::gaussian_score;
use chrono::{NaiveDateTime, Timelike};
use std::f64::consts::TAU;

/// Fractional hour of day, e.g. 13:30 -> 13.5.
#[must_use]
pub fn fractional_hour(at: NaiveDateTime) -> f64 {
    f64::from(at.hour()) + f64::from(at.minute()) / 60.0 + f64::from(at.second()) / 3600.0
}

/// Modeled energy level at `at`, clamped to `[min_level, max_level]`.
#[must_use]
pub fn modeled_energy(
    at: NaiveDateTime,
    morning_peak_hour: u32,
    afternoon_peak_hour: u32,
    cfg: &CircadianConfig,
) -> f64 {
    let hour = fractional_hour(at);

    let morning =
        cfg.morning_amplitude * gaussian_score(hour - f64::from(morning_peak_hour), cfg.morning_sigma);
    let afternoon = cfg.afternoon_amplitude
        * gaussian_score(hour - f64::from(afternoon_peak_hour), cfg.afternoon_sigma);
    let peak = morning.max(afternoon);

    let dip = if (cfg.lunch_start_hour..=cfg.lunch_end_hour).contains(&hour) {
        cfg.lunch_amplitude * gaussian_score(hour - cfg.lunch_center_hour, cfg.lunch_sigma)
    } else {
        0.0
    };

    let minute_of_day = hour * 60.0;
    let ripple = cfg.ultradian_amplitude * (TAU * minute_of_day / cfg.ultradian_period_minutes).sin();

    (cfg.baseline + peak - dip + ripple).clamp(cfg.min_level, cfg.max_level)
}
