//! Pareto frontier over the five headline dimensions.

use super::types::{Dimension, TaskScoreVector};

/// True if `a` is at least as good as `b` on every Pareto dimension and
/// strictly better on at least one.
#[must_use]
pub fn dominates(a: &TaskScoreVector, b: &TaskScoreVector) -> bool {
    let mut strictly_better = false;
    for dim in Dimension::PARETO {
        let (x, y) = (a.get(dim), b.get(dim));
        if x < y {
            return false;
        }
        if x > y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of the vectors no other vector dominates, in input order.
#[must_use]
pub fn frontier_indices(vectors: &[TaskScoreVector]) -> Vec<usize> {
    (0..vectors.len())
        .filter(|&i| {
            !vectors
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && dominates(other, &vectors[i]))
        })
        .collect()
}

/// The non-dominated subset of `vectors`, in input order.
#[must_use]
pub fn find_pareto_frontier(vectors: &[TaskScoreVector]) -> Vec<TaskScoreVector> {
    frontier_indices(vectors)
        .into_iter()
        .map(|i| vectors[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::TaskId;

    fn vector(id: i64, headline: [f64; 5]) -> TaskScoreVector {
        let mut v = TaskScoreVector::new(TaskId(id));
        for (dim, score) in Dimension::PARETO.iter().zip(headline) {
            v.set(*dim, score);
        }
        v
    }

    #[test]
    fn test_dominance_requires_strict_gain() {
        let a = vector(1, [0.5; 5]);
        let b = vector(2, [0.5; 5]);
        assert!(!dominates(&a, &b));
        let c = vector(3, [0.5, 0.5, 0.5, 0.5, 0.6]);
        assert!(dominates(&c, &a));
        assert!(!dominates(&a, &c));
    }

    #[test]
    fn test_frontier_drops_dominated() {
        let vectors = vec![
            vector(1, [0.9, 0.1, 0.5, 0.5, 0.5]),
            vector(2, [0.1, 0.9, 0.5, 0.5, 0.5]),
            vector(3, [0.1, 0.1, 0.4, 0.4, 0.4]),
        ];
        let ids: Vec<TaskId> = find_pareto_frontier(&vectors)
            .iter()
            .map(|v| v.task_id)
            .collect();
        assert_eq!(ids, vec![TaskId(1), TaskId(2)]);
    }

    #[test]
    fn test_ties_all_survive() {
        let vectors = vec![vector(1, [0.5; 5]), vector(2, [0.5; 5])];
        assert_eq!(frontier_indices(&vectors), vec![0, 1]);
    }

    #[test]
    fn test_non_pareto_dimensions_ignored() {
        let mut a = vector(1, [0.5; 5]);
        let b = vector(2, [0.5; 5]);
        a.set(Dimension::Momentum, 1.0);
        assert!(!dominates(&a, &b));
    }

    #[test]
    fn test_empty_input() {
        assert!(find_pareto_frontier(&[]).is_empty());
    }
}
