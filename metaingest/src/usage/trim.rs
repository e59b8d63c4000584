//! Query text shaping for usage records.

use crate::error::{IngestError, Result};

/// Rewrites query text before it is stored in a usage record.
pub trait QueryFormatter {
    fn format(&self, query: &str) -> String;
}

impl<F> QueryFormatter for F
where
    F: Fn(&str) -> String,
{
    fn format(&self, query: &str) -> String {
        self(query)
    }
}

/// Collapses every run of whitespace into a single space.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollapseWhitespace;

impl QueryFormatter for CollapseWhitespace {
    fn format(&self, query: &str) -> String {
        query.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Shortens `query` to at most `budget_per_query` characters.
///
/// Queries within budget are returned unchanged. Longer ones are cut so that
/// the cut text plus `trimmer` is exactly `budget_per_query` characters.
///
/// # Errors
///
/// Returns [`IngestError::QueryBudget`] when a query must be trimmed but the
/// budget cannot even hold `trimmer`.
pub fn trim_query(query: &str, budget_per_query: usize, trimmer: &str) -> Result<String> {
    if query.chars().count() <= budget_per_query {
        return Ok(query.to_string());
    }

    let keep = budget_per_query
        .checked_sub(trimmer.chars().count())
        .filter(|&keep| keep > 0)
        .ok_or(IngestError::QueryBudget {
            budget: budget_per_query,
        })?;

    let mut trimmed: String = query.chars().take(keep).collect();
    trimmed.push_str(trimmer);
    Ok(trimmed)
}
