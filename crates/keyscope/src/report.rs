//! Report persistence and plain-text rendering.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KeyscopeError, Result};
use crate::keys::StepAction;
use crate::keyscope::{ClassificationReport, DiscoveryReport};

/// Save a report as pretty-printed JSON.
///
/// # Example
///
/// ```no_run
/// # use keyscope::{report, DiscoveryReport};
/// # fn example(r: &DiscoveryReport) -> keyscope::Result<()> {
/// report::save_json(r, "orders.keyscope.json")?;
/// # Ok(())
/// # }
/// ```
pub fn save_json<T: Serialize>(report: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| KeyscopeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Load a previously saved report.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| KeyscopeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Default report path for a data file: `orders.csv` -> `orders.keyscope.json`.
pub fn report_path(data_path: impl AsRef<Path>) -> PathBuf {
    let data_path = data_path.as_ref();
    let stem = data_path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = data_path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.keyscope.json", stem))
}

/// Render a classification report as plain text.
pub fn render_classification(report: &ClassificationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Column Classification");
    let _ = writeln!(out, "=====================");
    if let Some(source) = &report.source {
        let _ = writeln!(out, "Source: {} ({} rows)", source.file, source.row_count);
    }
    if report.duplicate_rows_removed > 0 {
        let _ = writeln!(
            out,
            "Removed {} exact-duplicate row(s)",
            report.duplicate_rows_removed
        );
    }
    match &report.scope {
        Some(scope) => {
            let _ = writeln!(
                out,
                "Scope: {} = {} ({} rows)",
                scope.column, scope.value, scope.row_count
            );
        }
        None => {
            let _ = writeln!(out, "Scope: whole dataset ({} rows)", report.analyzed_rows);
        }
    }
    let _ = writeln!(out);

    let c = &report.classification;
    if !c.protected.is_empty() {
        let _ = writeln!(out, "Protected ({}):", c.protected.len());
        for col in &c.protected {
            let _ = writeln!(
                out,
                "  {} (unique: {}, nulls: {})",
                col.profile.name, col.profile.unique_count, col.profile.null_count
            );
        }
    }
    let _ = writeln!(out, "Order level ({}):", c.order_level.len());
    for col in &c.order_level {
        let _ = writeln!(out, "  {} = {}", col.profile.name, col.value);
    }
    let _ = writeln!(out, "Item level ({}):", c.item_level.len());
    for col in &c.item_level {
        let samples: Vec<String> = col.sample_values.iter().map(|v| v.to_string()).collect();
        let _ = writeln!(
            out,
            "  {} (unique: {}, e.g. {})",
            col.profile.name,
            col.profile.unique_count,
            samples.join(", ")
        );
    }

    out
}

/// Render a discovery report as plain text, one section per pipeline step.
pub fn render_discovery(report: &DiscoveryReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Key Discovery");
    let _ = writeln!(out, "=============");
    if let Some(source) = &report.source {
        let _ = writeln!(out, "Source: {} ({} rows)", source.file, source.row_count);
    }
    if report.duplicate_rows_removed > 0 {
        let _ = writeln!(
            out,
            "Removed {} exact-duplicate row(s)",
            report.duplicate_rows_removed
        );
    }
    let _ = writeln!(out, "Base key: [{}]", report.base_key.join(", "));
    let _ = writeln!(out);

    let Some(scope) = &report.scope else {
        let _ = writeln!(out, "No duplicated scope value found; nothing to analyze.");
        return out;
    };

    let _ = writeln!(
        out,
        "Scope: {} = {} ({} rows)",
        scope.column, scope.value, scope.row_count
    );
    if report.duplicate_groups.len() > 1 {
        let _ = writeln!(out, "Other duplicate groups:");
        for group in report.duplicate_groups.iter().skip(1) {
            let _ = writeln!(out, "  {} ({} rows)", group.value, group.row_count);
        }
    }
    let _ = writeln!(out);

    if let Some(classification) = &report.classification {
        let _ = writeln!(
            out,
            "Item-level columns: [{}]",
            classification.item_level_names().join(", ")
        );
    }

    if let Some(hashes) = &report.hash_analysis {
        if hashes.duplicate_hash_count > 0 {
            let _ = writeln!(
                out,
                "Whole-row duplicates: {} group(s)",
                hashes.groups.len()
            );
            for group in &hashes.groups {
                let _ = writeln!(out, "  rows {:?} share {}", group.row_ids, group.hash);
            }
        } else {
            let _ = writeln!(out, "Whole-row duplicates: none");
        }
    }
    let _ = writeln!(out);

    if let Some(base) = &report.base_validation {
        if base.is_valid {
            let _ = writeln!(out, "Base key is already unique and null-free.");
        } else {
            let _ = writeln!(
                out,
                "Base key fails: {} duplicate row(s), {} null(s)",
                base.duplicate_count,
                base.total_nulls()
            );
        }
    }

    if let Some(minimal) = &report.minimal_key {
        let _ = writeln!(out);
        let _ = writeln!(out, "Reduction trace ({} steps):", minimal.iterations.len());
        for step in &minimal.iterations {
            let action = match &step.action {
                StepAction::Seed => "seed".to_string(),
                StepAction::DropNullColumns { dropped } => {
                    format!("drop null columns [{}]", dropped.join(", "))
                }
                StepAction::Remove { column } => format!("remove {}", column),
            };
            let _ = writeln!(
                out,
                "  {} -> [{}] ({})",
                action,
                step.columns.join(", "),
                if step.is_valid { "valid" } else { "invalid" }
            );
        }
        let _ = writeln!(out);
        if minimal.is_valid {
            let _ = writeln!(out, "Minimal key: [{}]", minimal.minimal_key.join(", "));
            if !minimal.added_columns.is_empty() {
                let _ = writeln!(out, "Added: [{}]", minimal.added_columns.join(", "));
            }
            if !minimal.removed_columns.is_empty() {
                let _ = writeln!(out, "Removed: [{}]", minimal.removed_columns.join(", "));
            }
        } else {
            let _ = writeln!(out, "No valid key exists within the candidate columns.");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, Value};
    use crate::{Keyscope, KeyscopeConfig};

    fn sample_report() -> DiscoveryReport {
        let ds = Dataset::new(
            vec!["k".to_string(), "q".to_string()],
            vec![
                vec![Value::from("a"), Value::from(1)],
                vec![Value::from("a"), Value::from(2)],
                vec![Value::from("b"), Value::from(1)],
            ],
        )
        .unwrap();
        let engine = Keyscope::with_config(KeyscopeConfig {
            search_key: Some("k".to_string()),
            base_key: vec!["k".to_string()],
            ..KeyscopeConfig::default()
        });
        engine.discover_dataset(&ds).unwrap()
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path("data/orders.csv").to_string_lossy(),
            "data/orders.keyscope.json"
        );
        assert_eq!(report_path("x.tsv").to_string_lossy(), "x.keyscope.json");
    }

    #[test]
    fn test_render_discovery_sections() {
        let report = sample_report();
        let text = render_discovery(&report);

        assert!(text.contains("Key Discovery"));
        assert!(text.contains("Scope: k = a (2 rows)"));
        assert!(text.contains("Minimal key: [k, q]"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.keyscope.json");

        save_json(&report, &path).unwrap();
        let loaded: DiscoveryReport = load_json(&path).unwrap();

        assert_eq!(loaded.base_key, report.base_key);
        assert_eq!(
            loaded.minimal_key.unwrap().minimal_key,
            report.minimal_key.unwrap().minimal_key
        );
    }
}
