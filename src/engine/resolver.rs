//! Fuzzy Task Resolver: Matches human queries to tasks in a loaded backlog.

use super::error::{OptimizerError, Result};
use super::types::Task;
use std::collections::HashSet;

pub struct ResolveResult<'a> {
    pub task: &'a Task,
    pub confidence: f64,
}

pub struct TaskResolver<'a> {
    tasks: &'a [Task],
    strict: bool,
}

impl<'a> TaskResolver<'a> {
    /// Creates a new resolver.
    #[must_use]
    pub fn new(tasks: &'a [Task]) -> Self {
        Self {
            tasks,
            strict: false,
        }
    }

    /// Creates a resolver in strict mode (id or exact slug only).
    #[must_use]
    pub fn strict(tasks: &'a [Task]) -> Self {
        Self {
            tasks,
            strict: true,
        }
    }

    /// Resolves a user query into a task.
    ///
    /// # Errors
    /// Returns `TaskNotFound` if nothing matches.
    pub fn resolve(&self, query: &str) -> Result<ResolveResult<'a>> {
        let query = query.trim().trim_start_matches('#');

        if let Ok(id) = query.parse::<i64>() {
            if let Some(task) = self.tasks.iter().find(|t| t.id.0 == id) {
                return Ok(ResolveResult {
                    task,
                    confidence: 1.0,
                });
            }
        }

        let wanted = slugify(query);
        if let Some(task) = self.tasks.iter().find(|t| slugify(&t.title) == wanted) {
            return Ok(ResolveResult {
                task,
                confidence: 1.0,
            });
        }

        if self.strict {
            return Err(OptimizerError::TaskNotFound(query.to_string()));
        }
        self.fuzzy_resolve(query)
    }

    fn fuzzy_resolve(&self, query: &str) -> Result<ResolveResult<'a>> {
        let query_lower = query.to_lowercase();
        let words: Vec<_> = query_lower.split_whitespace().collect();

        let mut matches: Vec<_> = self
            .tasks
            .iter()
            .map(|t| (calculate_score(t, &query_lower, &words), t))
            .filter(|(s, _)| *s > 0.3)
            .collect();

        matches.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let (confidence, task) = matches
            .into_iter()
            .next()
            .ok_or_else(|| OptimizerError::TaskNotFound(query.to_string()))?;

        Ok(ResolveResult { task, confidence })
    }
}

/// Generates a slug from a title string.
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// Calculates a match score between a task and a query.
fn calculate_score(task: &Task, query: &str, query_words: &[&str]) -> f64 {
    let slug_lower = slugify(&task.title);
    let title_lower = task.title.to_lowercase();

    let mut score = 0.0;

    if title_lower.contains(query) {
        score += 0.7;
    }
    if slug_lower.starts_with(&slugify(query)) {
        score += 0.5;
    }

    for word in query_words {
        if title_lower.contains(word) {
            score += 0.25;
        }
    }

    score += string_similarity(&title_lower, query) * 0.4;

    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn string_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: HashSet<char> = a.chars().collect();
    let b_chars: HashSet<char> = b.chars().collect();

    let intersection = a_chars.intersection(&b_chars).count();
    let union = a_chars.union(&b_chars).count();

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}
