use crate::cli::ImportDbArgs;
use crate::config::Config;
use crate::db::PgRestore;
use anyhow::Result;
use console::style;
use std::path::Path;
use tracing::info;

pub async fn run(args: ImportDbArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let input = args.input_file.unwrap_or_else(|| config.cleaned_dump_path());
    let schema = args.schema.unwrap_or_else(|| config.target.schema.clone());

    println!("\n{} Importing into Supabase", style("🗄️").bold());
    println!("  Target: {}/{}", config.target.host, config.target.database);
    println!("  Schema: {}", schema);
    println!("  Input: {}", input.display());

    let password = config.target.resolve_password("Supabase")?;
    let restore = PgRestore::new(config.target.clone(), password);

    restore.ensure_schema(&schema)?;

    let spinner = super::stage_spinner("Running psql...");
    let result = restore.restore_from_file(&input);
    spinner.finish_and_clear();
    result?;

    info!("Import finished: {}", input.display());
    println!("{} Database import complete!", style("✓").green());
    Ok(())
}
