use crate::cli::CleanDumpArgs;
use crate::config::Config;
use crate::db::DumpCleaner;
use anyhow::Result;
use console::style;
use std::path::Path;
use tracing::info;

pub async fn run(args: CleanDumpArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let input = args.input_file.unwrap_or_else(|| config.raw_dump_path());
    let output = args.output.unwrap_or_else(|| config.cleaned_dump_path());
    let source_schema = args
        .source_schema
        .unwrap_or_else(|| config.source.schema.clone());
    let target_schema = args
        .target_schema
        .unwrap_or_else(|| config.target.schema.clone());

    info!(
        "Cleaning {} (schema {} -> {})",
        input.display(),
        source_schema,
        target_schema
    );

    let cleaner = DumpCleaner::new(&source_schema, &target_schema)?;
    let stats = cleaner.clean_file(&input, &output)?;

    println!("{} Dump cleaned: {}", style("✓").green(), stats);
    println!("  Output: {}", output.display());
    println!(
        "\n{} Inspect the cleaned dump before importing; unmatched provider-specific\n  statements pass through unchanged.",
        style("ℹ️").cyan()
    );
    Ok(())
}
