//! Column classification: order level vs item level by cardinality.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};

/// Maximum distinct non-null sample values reported per column.
const MAX_SAMPLE_VALUES: usize = 5;

/// Cardinality profile of one column within one row subset.
///
/// Profiles are recomputed per subset and never cached across subsets,
/// since cardinality depends on the rows under analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Rows in the analyzed subset.
    pub total_rows: usize,
    /// Distinct values, with all nulls counted as one distinct value.
    pub unique_count: usize,
    /// Number of null values.
    pub null_count: usize,
}

/// A column whose value is constant across the analyzed subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLevelColumn {
    #[serde(flatten)]
    pub profile: ColumnProfile,
    /// The single representative value (may be null).
    pub value: Value,
}

/// A column whose value varies across the analyzed subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLevelColumn {
    #[serde(flatten)]
    pub profile: ColumnProfile,
    /// Up to [`MAX_SAMPLE_VALUES`] distinct non-null values, in
    /// first-encountered order.
    pub sample_values: Vec<Value>,
}

/// A column excluded from classification by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedColumn {
    #[serde(flatten)]
    pub profile: ColumnProfile,
    /// Up to [`MAX_SAMPLE_VALUES`] distinct non-null values, in
    /// first-encountered order.
    pub sample_values: Vec<Value>,
}

/// Disjoint, total partition of a subset's columns.
///
/// Protection takes precedence: a protected column is listed under
/// `protected` even when its cardinality would qualify it as order level.
/// List order is dataset column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub protected: Vec<ProtectedColumn>,
    pub order_level: Vec<OrderLevelColumn>,
    pub item_level: Vec<ItemLevelColumn>,
}

impl ColumnClassification {
    /// Names of item-level columns, in classification order.
    pub fn item_level_names(&self) -> Vec<String> {
        self.item_level
            .iter()
            .map(|c| c.profile.name.clone())
            .collect()
    }

    /// Names of order-level columns, in classification order.
    pub fn order_level_names(&self) -> Vec<String> {
        self.order_level
            .iter()
            .map(|c| c.profile.name.clone())
            .collect()
    }

    /// Total number of classified columns, protected included.
    pub fn total_columns(&self) -> usize {
        self.protected.len() + self.order_level.len() + self.item_level.len()
    }
}

/// Partition a dataset's columns into protected, order-level and item-level.
///
/// Deterministic: the result depends only on dataset content and the
/// protected list, never on prior calls. Protected names absent from the
/// dataset are ignored.
pub fn classify(dataset: &Dataset, protected_columns: &[String]) -> ColumnClassification {
    let protected_set: HashSet<&str> = protected_columns.iter().map(String::as_str).collect();

    let mut protected = Vec::new();
    let mut order_level = Vec::new();
    let mut item_level = Vec::new();

    for (col, name) in dataset.column_names().iter().enumerate() {
        let (profile, samples) = profile_column(dataset, name, col);

        if protected_set.contains(name.as_str()) {
            protected.push(ProtectedColumn {
                profile,
                sample_values: samples,
            });
        } else if profile.unique_count <= 1 {
            // Zero-row and all-null subsets land here with a null
            // representative.
            let value = if dataset.row_count() > 0 {
                dataset.value_at(0, col).clone()
            } else {
                Value::Null
            };
            order_level.push(OrderLevelColumn { profile, value });
        } else {
            item_level.push(ItemLevelColumn {
                profile,
                sample_values: samples,
            });
        }
    }

    ColumnClassification {
        protected,
        order_level,
        item_level,
    }
}

/// Compute the cardinality profile of one column, plus its bounded sample of
/// distinct non-null values in first-encountered order.
fn profile_column(dataset: &Dataset, name: &str, col: usize) -> (ColumnProfile, Vec<Value>) {
    let total_rows = dataset.row_count();
    let mut distinct: IndexSet<&Value> = IndexSet::new();
    let mut null_count = 0;

    for row in 0..total_rows {
        let value = dataset.value_at(row, col);
        if value.is_null() {
            null_count += 1;
        }
        distinct.insert(value);
    }

    let samples = distinct
        .iter()
        .filter(|v| !v.is_null())
        .take(MAX_SAMPLE_VALUES)
        .map(|v| (*v).clone())
        .collect();

    let profile = ColumnProfile {
        name: name.to_string(),
        total_rows,
        unique_count: distinct.len(),
        null_count,
    };

    (profile, samples)
}
