//! Classify command - partition columns within the analysis scope.

use std::path::PathBuf;

use colored::Colorize;
use keyscope::{report, ClassificationReport, Keyscope, KeyscopeConfig, ParserConfig};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    search_key: Option<String>,
    protect: Vec<String>,
    keep_duplicates: bool,
    max_rows: Option<usize>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Classifying".cyan().bold(),
        file.display().to_string().white()
    );

    let engine = Keyscope::with_config(KeyscopeConfig {
        search_key: search_key.clone(),
        protected_columns: protect,
        drop_exact_duplicates: !keep_duplicates,
        parser: ParserConfig {
            max_rows,
            ..ParserConfig::default()
        },
        ..KeyscopeConfig::default()
    });

    let result = engine.classify_file(&file)?;

    if let Some(key) = &search_key {
        if let Some(message) = fallback_warning(&result, key) {
            println!("{} {}", "Warning:".yellow().bold(), message);
        }
    }

    if verbose {
        if let Some(source) = &result.source {
            println!();
            println!("{}", "Source:".yellow().bold());
            println!("  Format: {}", source.format);
            println!("  Rows: {}", source.row_count);
            println!("  Columns: {}", source.column_count);
            println!("  Hash: {}", source.hash);
        }
    }

    println!();
    match &result.scope {
        Some(scope) => println!(
            "Scope: {} = {} ({} rows)",
            scope.column.white().bold(),
            scope.value.to_string().white().bold(),
            scope.row_count
        ),
        None => println!(
            "Scope: whole file ({} rows)",
            result.analyzed_rows.to_string().white().bold()
        ),
    }
    if result.duplicate_rows_removed > 0 {
        println!(
            "Removed {} exact-duplicate row(s)",
            result.duplicate_rows_removed.to_string().yellow()
        );
    }
    println!();

    let c = &result.classification;
    if !c.protected.is_empty() {
        println!("{}", format!("Protected ({}):", c.protected.len()).bold());
        for col in &c.protected {
            println!("  {}", col.profile.name);
        }
        println!();
    }

    println!(
        "{}",
        format!("Order level ({}):", c.order_level.len()).green().bold()
    );
    for col in &c.order_level {
        println!("  {} = {}", col.profile.name, col.value);
    }
    println!();

    println!(
        "{}",
        format!("Item level ({}):", c.item_level.len()).cyan().bold()
    );
    for col in &c.item_level {
        let samples: Vec<String> = col.sample_values.iter().map(|v| v.to_string()).collect();
        println!(
            "  {} (unique: {}, e.g. {})",
            col.profile.name,
            col.profile.unique_count,
            samples.join(", ")
        );
    }

    if let Some(path) = output {
        report::save_json(&result, &path)?;
        println!();
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

/// Explain a whole-file fallback when the user asked for a scoped run.
///
/// A typo'd column name and a column with no duplicated value both fall
/// back silently in the library; the CLI tells them apart so the user can
/// spot the typo.
fn fallback_warning(result: &ClassificationReport, search_key: &str) -> Option<String> {
    if result.scope.is_some() {
        return None;
    }

    let c = &result.classification;
    let known = c
        .protected
        .iter()
        .map(|col| col.profile.name.as_str())
        .chain(c.order_level.iter().map(|col| col.profile.name.as_str()))
        .chain(c.item_level.iter().map(|col| col.profile.name.as_str()))
        .any(|name| name == search_key);

    if known {
        Some(format!(
            "search key '{}' has no duplicated value; analyzed the whole file",
            search_key
        ))
    } else {
        Some(format!(
            "search key '{}' not found in the file; analyzed the whole file",
            search_key
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyscope::{Dataset, Value};

    fn classify_with_key(key: &str) -> ClassificationReport {
        let ds = Dataset::new(
            vec!["id".to_string(), "v".to_string()],
            vec![
                vec![Value::from("a"), Value::from(1)],
                vec![Value::from("a"), Value::from(2)],
                vec![Value::from("b"), Value::from(3)],
            ],
        )
        .unwrap();
        let engine = Keyscope::with_config(KeyscopeConfig {
            search_key: Some(key.to_string()),
            ..KeyscopeConfig::default()
        });
        engine.classify_dataset(&ds).unwrap()
    }

    #[test]
    fn test_no_warning_when_scope_found() {
        let result = classify_with_key("id");
        assert!(fallback_warning(&result, "id").is_none());
    }

    #[test]
    fn test_warns_on_missing_column() {
        let result = classify_with_key("idd");
        let message = fallback_warning(&result, "idd").unwrap();
        assert!(message.contains("not found"));
        assert!(message.contains("idd"));
    }

    #[test]
    fn test_warns_on_unduplicated_column() {
        let result = classify_with_key("v");
        let message = fallback_warning(&result, "v").unwrap();
        assert!(message.contains("no duplicated value"));
    }
}
