//! Discover command - find a minimal primary key for the top duplicate scope.

use std::path::PathBuf;

use colored::Colorize;
use keyscope::keys::StepAction;
use keyscope::{report, Keyscope, KeyscopeConfig, ParserConfig};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    search_key: String,
    base_key: Vec<String>,
    top_n: usize,
    keep_duplicates: bool,
    max_rows: Option<usize>,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Discovering".cyan().bold(),
        file.display().to_string().white()
    );

    let base_key = if base_key.is_empty() {
        vec![search_key.clone()]
    } else {
        base_key
    };

    let engine = Keyscope::with_config(KeyscopeConfig {
        search_key: Some(search_key),
        base_key,
        top_n,
        drop_exact_duplicates: !keep_duplicates,
        parser: ParserConfig {
            max_rows,
            ..ParserConfig::default()
        },
        ..KeyscopeConfig::default()
    });

    let result = engine.discover_file(&file)?;

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
    if result.duplicate_rows_removed > 0 {
        println!(
            "Removed {} exact-duplicate row(s)",
            result.duplicate_rows_removed.to_string().yellow()
        );
    }

    let Some(scope) = &result.scope else {
        println!(
            "{}",
            "No duplicated scope value found; every row already stands alone.".green()
        );
        return Ok(());
    };

    println!(
        "Scope: {} = {} ({} rows)",
        scope.column.white().bold(),
        scope.value.to_string().white().bold(),
        scope.row_count
    );
    if result.duplicate_groups.len() > 1 {
        for group in result.duplicate_groups.iter().skip(1) {
            println!("       {} ({} rows)", group.value, group.row_count);
        }
    }
    println!();

    if let Some(classification) = &result.classification {
        println!(
            "Item-level columns: [{}]",
            classification.item_level_names().join(", ").cyan()
        );
    }

    if let Some(hashes) = &result.hash_analysis {
        if hashes.duplicate_hash_count > 0 {
            println!(
                "Whole-row duplicates: {} group(s)",
                hashes.groups.len().to_string().red().bold()
            );
            if verbose {
                for group in &hashes.groups {
                    println!("  rows {:?} share {}", group.row_ids, group.hash);
                }
            }
        }
    }
    println!();

    if let Some(base) = &result.base_validation {
        if base.is_valid {
            println!(
                "{} [{}]",
                "Base key is already unique and null-free:".green().bold(),
                result.base_key.join(", ")
            );
        } else {
            println!(
                "Base key [{}] fails: {} duplicate row(s), {} null(s)",
                result.base_key.join(", "),
                base.duplicate_count.to_string().red(),
                base.total_nulls().to_string().red()
            );
        }
    }

    if let Some(minimal) = &result.minimal_key {
        if verbose {
            println!();
            println!("{}", "Reduction trace:".yellow().bold());
            for step in &minimal.iterations {
                let action = match &step.action {
                    StepAction::Seed => "seed".to_string(),
                    StepAction::DropNullColumns { dropped } => {
                        format!("drop null columns [{}]", dropped.join(", "))
                    }
                    StepAction::Remove { column } => format!("remove {}", column),
                };
                println!(
                    "  {} -> [{}] ({})",
                    action,
                    step.columns.join(", "),
                    if step.is_valid {
                        "valid".green()
                    } else {
                        "invalid".red()
                    }
                );
            }
        }

        println!();
        if minimal.is_valid {
            println!(
                "{} [{}]",
                "Minimal key:".green().bold(),
                minimal.minimal_key.join(", ").white().bold()
            );
            if !minimal.removed_columns.is_empty() {
                println!("Removed: [{}]", minimal.removed_columns.join(", "));
            }
        } else {
            println!(
                "{}",
                "No valid key exists within the candidate columns.".red().bold()
            );
        }
    }

    let output_path = match (output, json) {
        (Some(path), _) => Some(path),
        (None, true) => Some(report::report_path(&file)),
        (None, false) => None,
    };
    if let Some(path) = output_path {
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
