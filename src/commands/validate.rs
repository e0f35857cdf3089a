use crate::config::Config;
use crate::db::{PgDump, PgRestore};
use anyhow::Result;
use console::style;
use std::path::Path;
use tracing::info;

/// Connectivity and credential checks only; no dump, no import.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;
    println!("{} Configuration complete", style("✓").green());

    PgDump::check_available()?;
    PgRestore::check_available()?;
    println!("{} PostgreSQL client tools found", style("✓").green());

    info!("Checking CloudSQL connectivity...");
    let source_password = config.source.resolve_password("CloudSQL")?;
    PgRestore::new(config.source.clone(), source_password).check_connection("CloudSQL source")?;
    println!(
        "{} CloudSQL source reachable ({})",
        style("✓").green(),
        config.source.host
    );

    info!("Checking Supabase connectivity...");
    let target_password = config.target.resolve_password("Supabase")?;
    PgRestore::new(config.target.clone(), target_password).check_connection("Supabase target")?;
    println!(
        "{} Supabase target reachable ({})",
        style("✓").green(),
        config.target.host
    );

    println!("\n{} Ready to migrate", style("🎉").bold());
    Ok(())
}
