use crate::cli::MigrateArgs;
use crate::config::Config;
use crate::db::{DumpCleaner, PgDump, PgRestore};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use std::fs;
use std::path::Path;
use tracing::info;

/// Full pipeline: export from CloudSQL, clean, import into Supabase.
/// Aborts on the first failing stage.
pub async fn run(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let source_schema = args
        .source_schema
        .unwrap_or_else(|| config.source.schema.clone());
    let target_schema = args
        .target_schema
        .unwrap_or_else(|| config.target.schema.clone());

    let raw_dump = config.raw_dump_path();
    let cleaned_dump = config.cleaned_dump_path();

    println!("\n{} Migration Plan", style("📋").bold());
    println!(
        "  Source: {}/{} (schema {})",
        config.source.host, config.source.database, source_schema
    );
    println!(
        "  Target: {}/{} (schema {})",
        config.target.host, config.target.database, target_schema
    );
    println!("  Raw dump: {}", raw_dump.display());
    println!("  Cleaned dump: {}", cleaned_dump.display());
    println!("  Schema only: {}", args.schema_only);
    println!("  Data only: {}", args.data_only);

    if args.dry_run {
        println!("\n{} Dry run - no changes will be made", style("ℹ️").cyan());
        return Ok(());
    }

    if !args.yes
        && !Confirm::new()
            .with_prompt("Proceed with migration?")
            .default(false)
            .interact()?
    {
        println!("Migration cancelled.");
        return Ok(());
    }

    fs::create_dir_all(&config.output.dir)?;

    // Stage 1: export
    println!("\n{} Exporting from CloudSQL...", style("🗄️").bold());
    let source_password = config.source.resolve_password("CloudSQL")?;
    let spinner = super::stage_spinner("Running pg_dump...");
    let result = PgDump::new(config.source.clone(), source_password)
        .schema_only(args.schema_only)
        .data_only(args.data_only)
        .dump_to_file(&raw_dump);
    spinner.finish_and_clear();
    result.context("export stage failed")?;
    println!("{} Export complete", style("✓").green());

    // Stage 2: clean
    println!("\n{} Cleaning dump...", style("🧹").bold());
    let cleaner = DumpCleaner::new(&source_schema, &target_schema)?;
    let stats = cleaner
        .clean_file(&raw_dump, &cleaned_dump)
        .context("clean stage failed")?;
    info!("Cleaned dump saved as: {}", cleaned_dump.display());
    println!("{} Clean complete: {}", style("✓").green(), stats);

    // Stage 3: import
    println!("\n{} Importing into Supabase...", style("📦").bold());
    let target_password = config.target.resolve_password("Supabase")?;
    let restore = PgRestore::new(config.target.clone(), target_password);
    restore
        .ensure_schema(&target_schema)
        .context("import stage failed")?;
    let spinner = super::stage_spinner("Running psql...");
    let result = restore.restore_from_file(&cleaned_dump);
    spinner.finish_and_clear();
    result.context("import stage failed")?;
    println!("{} Import complete", style("✓").green());

    println!("\n{} Migration completed successfully!", style("🎉").bold());
    Ok(())
}
