//! Keyscope CLI - schema-free key discovery for tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify {
            file,
            search_key,
            protect,
            keep_duplicates,
            max_rows,
            output,
        } => commands::classify::run(
            file,
            search_key,
            protect,
            keep_duplicates,
            max_rows,
            output,
            cli.verbose,
        ),

        Commands::Discover {
            file,
            search_key,
            base_key,
            top_n,
            keep_duplicates,
            max_rows,
            output,
            json,
        } => commands::discover::run(
            file,
            search_key,
            base_key,
            top_n,
            keep_duplicates,
            max_rows,
            output,
            json,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
