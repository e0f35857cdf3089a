use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupashiftError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connectivity error ({endpoint}): {message}")]
    Connectivity { endpoint: String, message: String },

    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    FailedProcess {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("pg_dump not found. Please install PostgreSQL client tools.")]
    PgDumpNotFound,

    #[error("psql not found. Please install PostgreSQL client tools.")]
    PsqlNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl SupashiftError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SupashiftError>;
