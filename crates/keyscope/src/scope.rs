//! Duplicate scope selection: ranking row groups by a designated column.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::Result;

/// Rows sharing one value of the scope column. Null is its own group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The shared value.
    pub value: Value,
    /// Number of member rows.
    pub row_count: usize,
    /// Stable identifiers of the member rows, in dataset order.
    pub row_ids: Vec<usize>,
}

/// Top `top_n` groups with more than one member, by descending size.
///
/// Ties keep first-encountered group order. An empty result is the
/// no-duplicate-scope condition, not an error: the caller may fall back to
/// analyzing the whole dataset.
pub fn most_duplicated(
    dataset: &Dataset,
    scope_column: &str,
    top_n: usize,
) -> Result<Vec<DuplicateGroup>> {
    let mut groups = group_rows(dataset, scope_column)?;
    groups.retain(|g| g.row_count > 1);
    groups.truncate(top_n);
    Ok(groups)
}

/// Top `top_n` groups regardless of duplication, by descending size.
///
/// Singleton groups are included; if `top_n` exceeds the number of distinct
/// groups, all groups are returned.
pub fn top_groups(
    dataset: &Dataset,
    scope_column: &str,
    top_n: usize,
) -> Result<Vec<DuplicateGroup>> {
    let mut groups = group_rows(dataset, scope_column)?;
    groups.truncate(top_n);
    Ok(groups)
}

/// Group all rows by the scope column, ordered by descending size with
/// stable first-encounter tie-break.
fn group_rows(dataset: &Dataset, scope_column: &str) -> Result<Vec<DuplicateGroup>> {
    let col = dataset.column_index(scope_column)?;

    let mut by_value: IndexMap<&Value, Vec<usize>> = IndexMap::new();
    for row in 0..dataset.row_count() {
        by_value
            .entry(dataset.value_at(row, col))
            .or_default()
            .push(dataset.row_id(row));
    }

    let mut groups: Vec<DuplicateGroup> = by_value
        .into_iter()
        .map(|(value, row_ids)| DuplicateGroup {
            value: value.clone(),
            row_count: row_ids.len(),
            row_ids,
        })
        .collect();
    groups.sort_by(|a, b| b.row_count.cmp(&a.row_count));

    Ok(groups)
}
