use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "supashift",
    author,
    version,
    about = "CLI tool for migrating a CloudSQL Postgres database to Supabase",
    long_about = "Export a dump from CloudSQL, clean it for Supabase compatibility,\n\
                  and import it into a Supabase project.\n\n\
                  Each stage is also exposed on its own (backup, clean-dump, import-db)\n\
                  for manual use."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, global = true, env = "SUPASHIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check configuration and connectivity to both databases
    Validate,

    /// Export a dump from the CloudSQL source
    Backup(BackupArgs),

    /// Clean a raw dump for Supabase compatibility
    CleanDump(CleanDumpArgs),

    /// Import a cleaned dump into the Supabase target
    ImportDb(ImportDbArgs),

    /// Run the full pipeline: export, clean, import
    Migrate(MigrateArgs),
}

#[derive(Parser)]
pub struct BackupArgs {
    /// Output file (defaults to the configured raw dump path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Schema only (no data)
    #[arg(long, default_value = "false", conflicts_with = "data_only")]
    pub schema_only: bool,

    /// Data only (no schema)
    #[arg(long, default_value = "false")]
    pub data_only: bool,

    /// Compress output with gzip
    #[arg(long, default_value = "false")]
    pub compress: bool,
}

#[derive(Parser)]
pub struct CleanDumpArgs {
    /// Raw dump file to clean (defaults to the configured raw dump path)
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Schema name expected on the target
    #[arg(long)]
    pub target_schema: Option<String>,

    /// Schema name as it appears in the dump
    #[arg(long)]
    pub source_schema: Option<String>,

    /// Output file (defaults to the configured cleaned dump path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ImportDbArgs {
    /// Cleaned dump file to import (defaults to the configured cleaned dump path)
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Schema to create on the target before importing
    #[arg(long)]
    pub schema: Option<String>,
}

#[derive(Parser)]
pub struct MigrateArgs {
    /// Schema name as it appears in the source dump
    #[arg(long)]
    pub source_schema: Option<String>,

    /// Schema name to use on the target
    #[arg(long)]
    pub target_schema: Option<String>,

    /// Schema only (no data)
    #[arg(long, default_value = "false", conflicts_with = "data_only")]
    pub schema_only: bool,

    /// Data only (no schema)
    #[arg(long, default_value = "false")]
    pub data_only: bool,

    /// Dry run - show what would be done
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long, default_value = "false")]
    pub yes: bool,
}
