//! Task similarity: a weighted blend of shared labels, energy and wording.
//!
//! A feature only counts when both tasks carry a value for it, so sparse
//! tasks are compared on what they actually have in common.

use super::config::SimilarityConfig;
use super::math::{jaccard, jaccard_sets};
use super::types::Task;
use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "that", "this", "about", "then", "than", "have",
    "has", "are", "was", "were", "will", "can", "not", "but", "all", "any", "our", "your", "its",
    "out", "get", "set", "make", "need", "needs", "todo",
];

/// Extracts lowercase salient tokens from a task's title and description.
///
/// Tokens shorter than three characters, pure numbers and stopwords are dropped.
#[must_use]
pub fn salient_tokens(task: &Task) -> BTreeSet<String> {
    let text = format!("{} {}", task.title, task.description).to_lowercase();
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Accumulates `(score * weight, weight)` over the comparable features.
#[derive(Default)]
struct Blend {
    total: f64,
    weight: f64,
    features: usize,
}

impl Blend {
    fn add(&mut self, score: f64, weight: f64) {
        self.total += score * weight;
        self.weight += weight;
        self.features += 1;
    }
}

/// Similarity of two tasks in `[0, 1]`.
#[must_use]
pub fn task_similarity(a: &Task, b: &Task, cfg: &SimilarityConfig) -> f64 {
    let mut blend = Blend::default();

    if let (Some(ca), Some(cb)) = (&a.category, &b.category) {
        blend.add(exact(ca.eq_ignore_ascii_case(cb)), cfg.category);
    }
    if let (Some(pa), Some(pb)) = (&a.project_id, &b.project_id) {
        blend.add(exact(pa == pb), cfg.project);
    }
    if !a.contexts.is_empty() && !b.contexts.is_empty() {
        blend.add(jaccard(&a.contexts, &b.contexts), cfg.contexts);
    }
    if !a.tags.is_empty() && !b.tags.is_empty() {
        blend.add(jaccard(&a.tags, &b.tags), cfg.tags);
    }
    if let (Some(sa), Some(sb)) = (&a.stakeholder, &b.stakeholder) {
        blend.add(exact(sa.matches(sb)), cfg.stakeholder);
    }
    if let (Some(ea), Some(eb)) = (a.energy_level, b.energy_level) {
        let diff = (f64::from(ea) - f64::from(eb)).abs();
        blend.add((1.0 - diff / 4.0).max(0.0), cfg.energy);
    }

    if blend.features == 0 {
        return cfg.unrelated_default;
    }

    let text = jaccard_sets(&salient_tokens(a), &salient_tokens(b));
    blend.add(text, cfg.text);

    (blend.total / blend.weight).clamp(0.0, 1.0)
}

fn exact(matched: bool) -> f64 {
    if matched {
        1.0
    } else {
        0.0
    }
}
