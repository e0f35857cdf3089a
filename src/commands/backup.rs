use crate::cli::BackupArgs;
use crate::config::Config;
use crate::db::PgDump;
use anyhow::Result;
use console::style;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub async fn run(args: BackupArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let plain_file = args.output.unwrap_or_else(|| config.raw_dump_path());
    let final_file = if args.compress {
        plain_file.with_extension("sql.gz")
    } else {
        plain_file.clone()
    };

    if let Some(parent) = final_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    println!("\n{} Backup Plan", style("📋").bold());
    println!("  Source: {}/{}", config.source.host, config.source.database);
    println!("  Schema: {}", config.source.schema);
    println!("  Output: {}", final_file.display());
    println!("  Schema only: {}", args.schema_only);
    println!("  Data only: {}", args.data_only);
    println!("  Compress: {}", args.compress);

    let password = config.source.resolve_password("CloudSQL")?;

    println!("\n{} Backing up database...", style("🗄️").bold());
    let spinner = super::stage_spinner("Running pg_dump...");

    let result = PgDump::new(config.source.clone(), password)
        .schema_only(args.schema_only)
        .data_only(args.data_only)
        .dump_to_file(&plain_file);

    spinner.finish_and_clear();
    result?;

    if args.compress {
        let sql = fs::read(&plain_file)?;
        let file = fs::File::create(&final_file)?;
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&sql)?;
        encoder.finish()?;
        fs::remove_file(&plain_file)?;
        info!("Compressed dump saved to: {}", final_file.display());
    }

    println!("{} Database backup complete!", style("✓").green());
    println!("  Location: {}", final_file.display());
    Ok(())
}
