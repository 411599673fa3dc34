//! Numeric primitives shared by every dimension scorer.
//!
//! `steepness`, `scale`, `half_life` and `sigma` must be positive; callers
//! take them from `OptimizerConfig`.

use std::collections::BTreeSet;

/// Logistic transition centered at `midpoint`, falling from 1 to 0 as `x` grows.
///
/// With `inverted` the curve rises from 0 to 1 instead.
#[inline]
#[must_use]
pub fn sigmoid_decay(x: f64, midpoint: f64, steepness: f64, inverted: bool) -> f64 {
    let s = 1.0 / (1.0 + (steepness * (x - midpoint)).exp());
    if inverted {
        1.0 - s
    } else {
        s
    }
}

/// Halves every `half_life` units of `x`.
#[inline]
#[must_use]
pub fn exponential_decay(x: f64, half_life: f64) -> f64 {
    0.5_f64.powf(x / half_life)
}

/// Grows from 0 towards `max` without ever reaching it.
#[inline]
#[must_use]
pub fn hyperbolic_growth(x: f64, scale: f64, max: f64) -> f64 {
    max * x / (scale + x)
}

/// Gaussian bump with peak 1 at `x = 0`.
#[inline]
#[must_use]
pub fn gaussian_score(x: f64, sigma: f64) -> f64 {
    (-(x * x) / (2.0 * sigma * sigma)).exp()
}

/// Case-insensitive Jaccard overlap of two label sets.
///
/// Two empty sets have no overlap (0.0).
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn jaccard<'a, A, B>(a: A, b: B) -> f64
where
    A: IntoIterator<Item = &'a String>,
    B: IntoIterator<Item = &'a String>,
{
    let a: BTreeSet<String> = a.into_iter().map(|s| s.to_lowercase()).collect();
    let b: BTreeSet<String> = b.into_iter().map(|s| s.to_lowercase()).collect();
    jaccard_sets(&a, &b)
}

/// Jaccard overlap of two already-normalized sets.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn jaccard_sets(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
