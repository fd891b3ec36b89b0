//! Example: Discover a minimal primary key in a tabular data file.
//!
//! Usage:
//!   cargo run --example discover -- <file_path> <search_key> [base_key...]
//!
//! Example:
//!   cargo run --example discover -- orders.csv OrderID OrderID

use std::env;
use std::path::Path;

use keyscope::{report, Keyscope, KeyscopeConfig};

fn main() -> keyscope::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example discover -- <file_path> <search_key> [base_key...]");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example discover -- orders.csv OrderID OrderID");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let search_key = args[2].clone();
    let base_key: Vec<String> = if args.len() > 3 {
        args[3..].to_vec()
    } else {
        vec![search_key.clone()]
    };

    let engine = Keyscope::with_config(KeyscopeConfig {
        search_key: Some(search_key),
        base_key,
        ..KeyscopeConfig::default()
    });

    let result = engine.discover_file(path)?;
    print!("{}", report::render_discovery(&result));

    Ok(())
}
