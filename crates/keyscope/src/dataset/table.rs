//! Immutable in-memory tabular value store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{KeyscopeError, Result};

use super::value::Value;

/// An immutable view over a tabular dataset.
///
/// Column names and the row store are shared behind `Arc`; each dataset
/// carries its own selection of row identifiers into the store. `subset` and
/// `drop_exact_duplicate_rows` therefore produce lightweight index filters,
/// never copies of the row data. Row identifiers are stable store indices,
/// so they survive subsetting and can be reported back to the caller.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
    store: Arc<Vec<Vec<Value>>>,
    selection: Vec<usize>,
}

impl Dataset {
    /// Build a dataset from column names and rows.
    ///
    /// Column names must be unique and every row must carry exactly one value
    /// per declared column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut column_index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if column_index.insert(name.clone(), idx).is_some() {
                return Err(KeyscopeError::DuplicateColumn(name.clone()));
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(KeyscopeError::RowShape {
                    row: row_idx,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        let selection = (0..rows.len()).collect();
        Ok(Self {
            columns: Arc::new(columns),
            column_index: Arc::new(column_index),
            store: Arc::new(rows),
            selection,
        })
    }

    /// Number of rows in this view.
    pub fn row_count(&self) -> usize {
        self.selection.len()
    }

    /// Declared column names, in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Resolve a column name to its position.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| KeyscopeError::InvalidColumn {
                column: name.to_string(),
            })
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Value at `(row, column)` where `row` indexes this view.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        let col = self.column_index(column)?;
        Ok(&self.store[self.selection[row]][col])
    }

    /// Value at `(row, column_position)` where `row` indexes this view.
    pub fn value_at(&self, row: usize, col: usize) -> &Value {
        &self.store[self.selection[row]][col]
    }

    /// All values of one row, by view position.
    pub fn row_values(&self, row: usize) -> &[Value] {
        &self.store[self.selection[row]]
    }

    /// Stable identifier of a row, by view position.
    pub fn row_id(&self, row: usize) -> usize {
        self.selection[row]
    }

    /// Stable identifiers of all rows in this view, in view order.
    pub fn row_ids(&self) -> &[usize] {
        &self.selection
    }

    /// New view containing the rows for which the predicate holds.
    /// Relative row order is preserved.
    pub fn subset<F>(&self, mut predicate: F) -> Dataset
    where
        F: FnMut(&[Value]) -> bool,
    {
        let selection = self
            .selection
            .iter()
            .copied()
            .filter(|&id| predicate(&self.store[id]))
            .collect();
        self.with_selection(selection)
    }

    /// New view restricted to the given stable row identifiers. Rows keep
    /// their current relative order; identifiers not in this view are ignored.
    pub fn select_rows(&self, row_ids: &[usize]) -> Dataset {
        let wanted: HashSet<usize> = row_ids.iter().copied().collect();
        let selection = self
            .selection
            .iter()
            .copied()
            .filter(|id| wanted.contains(id))
            .collect();
        self.with_selection(selection)
    }

    /// New view with rows whose full value tuple equals an earlier row's
    /// removed. The first occurrence survives and relative order is kept.
    pub fn drop_exact_duplicate_rows(&self) -> Dataset {
        let mut seen: HashSet<&[Value]> = HashSet::with_capacity(self.selection.len());
        let mut selection = Vec::with_capacity(self.selection.len());
        for &id in &self.selection {
            if seen.insert(self.store[id].as_slice()) {
                selection.push(id);
            }
        }
        self.with_selection(selection)
    }

    fn with_selection(&self, selection: Vec<usize>) -> Dataset {
        Dataset {
            columns: Arc::clone(&self.columns),
            column_index: Arc::clone(&self.column_index),
            store: Arc::clone(&self.store),
            selection,
        }
    }
}
