//! Uniqueness and null-freedom validation of candidate keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::error::Result;

/// Outcome of validating one candidate key over one row subset.
///
/// Key failures are ordinary result states, not errors: the caller decides
/// whether an invalid key is fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValidationResult {
    /// The columns that were validated, in the order given.
    pub columns: Vec<String>,
    /// True only when `duplicate_count == 0` and no participating column
    /// contains a null.
    pub is_valid: bool,
    /// Rows in the validated subset.
    pub total_rows: usize,
    /// Distinct value tuples over the key columns.
    pub unique_count: usize,
    /// `total_rows - unique_count`.
    pub duplicate_count: usize,
    /// Null counts per participating column; only columns with at least one
    /// null appear.
    pub null_counts: IndexMap<String, usize>,
    /// Identifiers of every row belonging to a tuple that occurs more than
    /// once, in first-encountered group order.
    pub duplicate_rows: Vec<usize>,
}

impl KeyValidationResult {
    /// Whether any participating column contains nulls.
    pub fn has_nulls(&self) -> bool {
        !self.null_counts.is_empty()
    }

    /// Total nulls across participating columns.
    pub fn total_nulls(&self) -> usize {
        self.null_counts.values().sum()
    }
}

/// Validate a candidate key over a dataset view.
///
/// Nulls disqualify the key regardless of uniqueness, mirroring relational
/// primary-key semantics. An empty column set projects every row onto the
/// same empty tuple, so it is valid only when the view has at most one row.
///
/// Validity is monotone under column addition: any superset of a valid key
/// is also valid. The reducer relies on this from the other direction:
/// removing a column may or may not preserve validity, so every removal is
/// re-checked.
///
/// Fails with `InvalidColumn` if a column is absent from the dataset.
pub fn validate(dataset: &Dataset, columns: &[String]) -> Result<KeyValidationResult> {
    let indices: Vec<usize> = columns
        .iter()
        .map(|name| dataset.column_index(name))
        .collect::<Result<_>>()?;

    let total_rows = dataset.row_count();

    // Null counts per participating column.
    let mut null_counts: IndexMap<String, usize> = IndexMap::new();
    for (name, &col) in columns.iter().zip(&indices) {
        let nulls = (0..total_rows)
            .filter(|&row| dataset.value_at(row, col).is_null())
            .count();
        if nulls > 0 {
            null_counts.insert(name.clone(), nulls);
        }
    }

    // Project each row onto its key tuple and group by tuple, keeping
    // first-encounter group order for deterministic diagnostics.
    let mut groups: IndexMap<Vec<&Value>, Vec<usize>> = IndexMap::new();
    for row in 0..total_rows {
        let tuple: Vec<&Value> = indices.iter().map(|&col| dataset.value_at(row, col)).collect();
        groups.entry(tuple).or_default().push(dataset.row_id(row));
    }

    let unique_count = groups.len();
    let duplicate_count = total_rows - unique_count.min(total_rows);

    let duplicate_rows: Vec<usize> = groups
        .values()
        .filter(|ids| ids.len() > 1)
        .flatten()
        .copied()
        .collect();

    let is_valid = duplicate_count == 0 && null_counts.is_empty();

    Ok(KeyValidationResult {
        columns: columns.to_vec(),
        is_valid,
        total_rows,
        unique_count,
        duplicate_count,
        null_counts,
        duplicate_rows,
    })
}
