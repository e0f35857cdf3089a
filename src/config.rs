use crate::error::{Result, SupashiftError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./supashift.toml",
    "~/.config/supashift/config.toml",
    "~/.supashift.toml",
];

/// Full migration configuration: the two database endpoints plus output paths.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: EndpointConfig,

    #[serde(default)]
    pub target: EndpointConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Connection parameters for one Postgres endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub database: String,

    /// Prompted interactively when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// None means "not configured"; each endpoint has its own default
    /// (source `prefer`, target `require`), filled in at load time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sslmode: Option<String>,

    #[serde(default = "default_schema")]
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for dump files
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Raw dump file name
    #[serde(default = "default_raw_dump")]
    pub raw_dump: String,

    /// Cleaned dump file name
    #[serde(default = "default_cleaned_dump")]
    pub cleaned_dump: String,
}

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_raw_dump() -> String {
    "backup.sql".to_string()
}

fn default_cleaned_dump() -> String {
    "cleaned_backup.sql".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            user: String::new(),
            database: String::new(),
            password: None,
            sslmode: None,
            schema: default_schema(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            raw_dump: default_raw_dump(),
            cleaned_dump: default_cleaned_dump(),
        }
    }
}

impl Config {
    /// Load config from file (or default locations), then apply environment
    /// variable overrides. Environment wins over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => {
                let mut found = None;
                for default_path in DEFAULT_CONFIG_PATHS {
                    let expanded = shellexpand::tilde(default_path);
                    let candidate = Path::new(expanded.as_ref());
                    if candidate.exists() {
                        found = Some(Self::load_from_path(candidate)?);
                        break;
                    }
                }
                found.unwrap_or_default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SupashiftError::file_access(path, e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay endpoint/output settings from a key-value lookup (the
    /// environment in production, a map in tests).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        self.source.apply_overrides("CLOUDSQL", &lookup)?;
        self.target.apply_overrides("SUPABASE", &lookup)?;
        if self.target.database.is_empty() {
            self.target.database = "postgres".to_string();
        }

        // Built-in SSL defaults apply only when neither file nor env set one.
        if self.source.sslmode.is_none() {
            self.source.sslmode = Some("prefer".to_string());
        }
        if self.target.sslmode.is_none() {
            self.target.sslmode = Some("require".to_string());
        }

        if let Some(dir) = lookup("SUPASHIFT_OUTPUT_DIR") {
            self.output.dir = dir;
        }
        Ok(())
    }

    /// Check that both endpoints carry enough to build a connection.
    pub fn validate(&self) -> Result<()> {
        self.source.validate("CLOUDSQL")?;
        self.target.validate("SUPABASE")?;
        Ok(())
    }

    pub fn raw_dump_path(&self) -> std::path::PathBuf {
        Path::new(&self.output.dir).join(&self.output.raw_dump)
    }

    pub fn cleaned_dump_path(&self) -> std::path::PathBuf {
        Path::new(&self.output.dir).join(&self.output.cleaned_dump)
    }
}

impl EndpointConfig {
    fn apply_overrides(
        &mut self,
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(host) = lookup(&format!("{prefix}_HOST")) {
            self.host = host;
        }
        if let Some(port) = lookup(&format!("{prefix}_PORT")) {
            self.port = port.parse().map_err(|_| {
                SupashiftError::Configuration(format!(
                    "{prefix}_PORT must be a positive integer, got {port:?}"
                ))
            })?;
        }
        if let Some(user) = lookup(&format!("{prefix}_USER")) {
            self.user = user;
        }
        if let Some(database) = lookup(&format!("{prefix}_DB")) {
            self.database = database;
        }
        if let Some(password) = lookup(&format!("{prefix}_PASSWORD")) {
            self.password = Some(password);
        }
        if let Some(sslmode) = lookup(&format!("{prefix}_SSLMODE")) {
            self.sslmode = Some(sslmode);
        }
        if let Some(schema) = lookup(&format!("{prefix}_SCHEMA")) {
            self.schema = schema;
        }
        Ok(())
    }

    fn validate(&self, prefix: &str) -> Result<()> {
        for (field, value) in [
            ("HOST", &self.host),
            ("USER", &self.user),
            ("DB", &self.database),
        ] {
            if value.is_empty() {
                return Err(SupashiftError::Configuration(format!(
                    "{prefix}_{field} is not set"
                )));
            }
        }
        Ok(())
    }

    /// SSL mode for libpq's PGSSLMODE. `Config::load` fills the per-endpoint
    /// default; a bare struct falls back to `prefer`.
    pub fn sslmode(&self) -> &str {
        self.sslmode.as_deref().unwrap_or("prefer")
    }

    /// Resolve the password, prompting on the terminal when not configured.
    pub fn resolve_password(&self, label: &str) -> Result<String> {
        match &self.password {
            Some(p) => Ok(p.clone()),
            None => {
                let password = dialoguer::Password::new()
                    .with_prompt(format!("Enter {label} password"))
                    .interact()?;
                Ok(password)
            }
        }
    }
}
