//! Main Keyscope struct and public API.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, ColumnClassification};
use crate::dataset::{Dataset, Value};
use crate::error::{KeyscopeError, Result};
use crate::hashing::{self, HashAnalysis};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::keys::{find_minimal_key, validate, KeyValidationResult, MinimalKeyResult};
use crate::scope::{self, DuplicateGroup};

/// Configuration for a Keyscope run.
///
/// An explicit value object passed into the engine's entry points; there is
/// no process-wide state.
#[derive(Debug, Clone)]
pub struct KeyscopeConfig {
    /// Column whose most-duplicated value selects the analysis scope.
    /// `None` analyzes the whole dataset (classification only).
    pub search_key: Option<String>,
    /// Columns always retained in any candidate key.
    pub base_key: Vec<String>,
    /// How many top duplicate groups to report.
    pub top_n: usize,
    /// Columns excluded from classification, listed separately.
    pub protected_columns: Vec<String>,
    /// Remove exact-duplicate rows before analysis.
    pub drop_exact_duplicates: bool,
    /// Parser configuration for file entry points.
    pub parser: ParserConfig,
}

impl Default for KeyscopeConfig {
    fn default() -> Self {
        Self {
            search_key: None,
            base_key: Vec::new(),
            top_n: 1,
            protected_columns: Vec::new(),
            drop_exact_duplicates: true,
            parser: ParserConfig::default(),
        }
    }
}

/// The scope actually analyzed: one value of the search-key column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSummary {
    /// The search-key column.
    pub column: String,
    /// The most duplicated value of that column.
    pub value: Value,
    /// Rows carrying that value.
    pub row_count: usize,
    /// Stable identifiers of those rows.
    pub row_ids: Vec<usize>,
}

impl ScopeSummary {
    fn from_group(column: &str, group: &DuplicateGroup) -> Self {
        Self {
            column: column.to_string(),
            value: group.value.clone(),
            row_count: group.row_count,
            row_ids: group.row_ids.clone(),
        }
    }
}

/// Result of column-level classification over a scoped subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Metadata about the source file, when loaded from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Exact-duplicate rows removed before analysis.
    pub duplicate_rows_removed: usize,
    /// The scope selected, or `None` when the whole dataset was analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeSummary>,
    /// Rows actually analyzed.
    pub analyzed_rows: usize,
    /// The column partition.
    pub classification: ColumnClassification,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

/// Result of minimal-primary-key discovery over a scoped subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Metadata about the source file, when loaded from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Exact-duplicate rows removed before analysis.
    pub duplicate_rows_removed: usize,
    /// The caller's base key.
    pub base_key: Vec<String>,
    /// Top duplicate groups of the search key, largest first.
    pub duplicate_groups: Vec<DuplicateGroup>,
    /// The scope analyzed. `None` means the search key had no duplicated
    /// value and no key analysis was performed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeSummary>,
    /// Column partition of the scoped subset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ColumnClassification>,
    /// Whole-row duplicate diagnostics over base + item-level columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_analysis: Option<HashAnalysis>,
    /// Validation of the base key over the scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_validation: Option<KeyValidationResult>,
    /// Minimal-key search outcome, when the base key was invalid and
    /// item-level columns were available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimal_key: Option<MinimalKeyResult>,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl DiscoveryReport {
    /// The key the analysis settled on: the base key when it validated,
    /// otherwise the minimal key when one was found.
    pub fn resolved_key(&self) -> Option<&[String]> {
        match &self.base_validation {
            Some(v) if v.is_valid => Some(&self.base_key),
            _ => self
                .minimal_key
                .as_ref()
                .filter(|m| m.is_valid)
                .map(|m| m.minimal_key.as_slice()),
        }
    }
}

/// The key discovery engine.
///
/// All analysis is a synchronous, single-pass computation over an immutable
/// [`Dataset`]; the engine holds no mutable state between calls.
pub struct Keyscope {
    config: KeyscopeConfig,
    parser: Parser,
}

impl Keyscope {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(KeyscopeConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: KeyscopeConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self { config, parser }
    }

    /// Classify the columns of a delimited-text file.
    pub fn classify_file(&self, path: impl AsRef<Path>) -> Result<ClassificationReport> {
        let (dataset, source) = self.parser.parse_file(path)?;
        let mut report = self.classify_dataset(&dataset)?;
        report.source = Some(source);
        Ok(report)
    }

    /// Classify the columns of an in-memory dataset.
    ///
    /// When a search key is configured and has a duplicated value, the
    /// most-duplicated group is analyzed; otherwise (no search key, search
    /// key absent from the dataset, or no duplicated value) the whole
    /// dataset is.
    pub fn classify_dataset(&self, dataset: &Dataset) -> Result<ClassificationReport> {
        let (working, duplicate_rows_removed) = self.prepare(dataset);

        let scope = match &self.config.search_key {
            Some(key) if working.has_column(key) => {
                scope::most_duplicated(&working, key, 1)?
                    .first()
                    .map(|group| ScopeSummary::from_group(key, group))
            }
            _ => None,
        };

        let target = match &scope {
            Some(s) => working.select_rows(&s.row_ids),
            None => working.clone(),
        };

        let classification = classify(&target, &self.config.protected_columns);

        Ok(ClassificationReport {
            source: None,
            duplicate_rows_removed,
            scope,
            analyzed_rows: target.row_count(),
            classification,
            generated_at: Utc::now(),
        })
    }

    /// Discover a minimal primary key for a delimited-text file.
    pub fn discover_file(&self, path: impl AsRef<Path>) -> Result<DiscoveryReport> {
        let (dataset, source) = self.parser.parse_file(path)?;
        let mut report = self.discover_dataset(&dataset)?;
        report.source = Some(source);
        Ok(report)
    }

    /// Discover a minimal primary key for an in-memory dataset.
    ///
    /// The pipeline removes exact-duplicate rows (config toggle), selects
    /// the scope on the search key, classifies the scoped columns, runs the
    /// duplicate-hash diagnostics, validates the base key, and searches for
    /// a minimal key when the base key is invalid. A search key and base
    /// key are required; their absence from the dataset is `InvalidColumn`.
    pub fn discover_dataset(&self, dataset: &Dataset) -> Result<DiscoveryReport> {
        let search_key = self.config.search_key.as_ref().ok_or_else(|| {
            KeyscopeError::Config("discovery requires a search key".to_string())
        })?;
        if self.config.base_key.is_empty() {
            return Err(KeyscopeError::Config(
                "discovery requires a non-empty base key".to_string(),
            ));
        }

        let (working, duplicate_rows_removed) = self.prepare(dataset);

        // Configuration errors surface before any analysis.
        working.column_index(search_key)?;
        for column in &self.config.base_key {
            working.column_index(column)?;
        }

        let duplicate_groups =
            scope::most_duplicated(&working, search_key, self.config.top_n.max(1))?;

        let Some(top) = duplicate_groups.first() else {
            // No duplicated search-key value: every row already stands
            // alone, so there is nothing to discover.
            return Ok(DiscoveryReport {
                source: None,
                duplicate_rows_removed,
                base_key: self.config.base_key.clone(),
                duplicate_groups,
                scope: None,
                classification: None,
                hash_analysis: None,
                base_validation: None,
                minimal_key: None,
                generated_at: Utc::now(),
            });
        };

        let scope_summary = ScopeSummary::from_group(search_key, top);
        let subset = working.select_rows(&scope_summary.row_ids);

        // Base-key columns are protected: they are always part of any
        // candidate, so classifying them as item level would be redundant.
        let mut protected = self.config.base_key.clone();
        for column in &self.config.protected_columns {
            if !protected.contains(column) {
                protected.push(column.clone());
            }
        }
        let classification = classify(&subset, &protected);
        let item_columns = classification.item_level_names();

        let mut hash_columns = self.config.base_key.clone();
        hash_columns.extend(item_columns.iter().cloned());
        let hash_analysis = hashing::analyze(&subset, &hash_columns)?;

        let base_validation = validate(&subset, &self.config.base_key)?;

        let minimal_key = if !base_validation.is_valid && !item_columns.is_empty() {
            Some(find_minimal_key(
                &subset,
                &self.config.base_key,
                &item_columns,
            )?)
        } else {
            None
        };

        Ok(DiscoveryReport {
            source: None,
            duplicate_rows_removed,
            base_key: self.config.base_key.clone(),
            duplicate_groups,
            scope: Some(scope_summary),
            classification: Some(classification),
            hash_analysis: Some(hash_analysis),
            base_validation: Some(base_validation),
            minimal_key,
            generated_at: Utc::now(),
        })
    }

    /// Apply the duplicate-row toggle, returning the working view and the
    /// number of rows removed.
    fn prepare(&self, dataset: &Dataset) -> (Dataset, usize) {
        if self.config.drop_exact_duplicates {
            let deduped = dataset.drop_exact_duplicate_rows();
            let removed = dataset.row_count() - deduped.row_count();
            (deduped, removed)
        } else {
            (dataset.clone(), 0)
        }
    }
}

impl Default for Keyscope {
    fn default() -> Self {
        Self::new()
    }
}
