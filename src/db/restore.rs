use crate::config::EndpointConfig;
use crate::error::{Result, SupashiftError};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// psql wrapper for the Supabase target.
pub struct PgRestore {
    endpoint: EndpointConfig,
    password: String,
}

impl PgRestore {
    pub fn new(endpoint: EndpointConfig, password: String) -> Self {
        Self { endpoint, password }
    }

    /// Check if psql is available
    pub fn check_available() -> Result<()> {
        let output = Command::new("psql").arg("--version").output();

        match output {
            Ok(o) if o.status.success() => {
                let version = String::from_utf8_lossy(&o.stdout);
                debug!("Found psql: {}", version.trim());
                Ok(())
            }
            _ => Err(SupashiftError::PsqlNotFound),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("psql");
        cmd.arg("-h")
            .arg(&self.endpoint.host)
            .arg("-p")
            .arg(self.endpoint.port.to_string())
            .arg("-U")
            .arg(&self.endpoint.user)
            .arg("-d")
            .arg(&self.endpoint.database)
            .env("PGPASSWORD", &self.password)
            .env("PGSSLMODE", self.endpoint.sslmode())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Restore from SQL file
    pub fn restore_from_file(&self, input_path: &Path) -> Result<()> {
        Self::check_available()?;

        if !input_path.exists() {
            return Err(SupashiftError::file_access(
                input_path,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        info!("Starting database restore from {}...", input_path.display());

        let mut cmd = self.command();
        cmd.arg("--file").arg(input_path);

        debug!("Running: {:?}", cmd);

        let output = cmd.output()?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        // psql exits 0 on script errors unless ON_ERROR_STOP is set
        if !output.status.success() || stderr.contains("ERROR") {
            return Err(SupashiftError::FailedProcess {
                tool: "psql",
                code: output.status.code(),
                stderr: stderr.to_string(),
            });
        }

        info!("Database restore completed");
        Ok(())
    }

    /// Execute a single SQL command
    pub fn execute(&self, sql: &str) -> Result<String> {
        Self::check_available()?;

        let mut cmd = self.command();
        cmd.arg("-c").arg(sql);

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SupashiftError::FailedProcess {
                tool: "psql",
                code: output.status.code(),
                stderr: stderr.to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Connectivity probe used by `validate`.
    pub fn check_connection(&self, endpoint_name: &str) -> Result<()> {
        self.execute("SELECT 1;").map_err(|e| match e {
            SupashiftError::FailedProcess { stderr, .. } => SupashiftError::Connectivity {
                endpoint: endpoint_name.to_string(),
                message: stderr.trim().to_string(),
            },
            other => other,
        })?;
        Ok(())
    }

    /// Make sure the target schema exists before a restore runs into it.
    pub fn ensure_schema(&self, schema: &str) -> Result<()> {
        // Quote the identifier; schema names come from operator flags.
        let quoted = format!("\"{}\"", schema.replace('"', "\"\""));
        self.execute(&format!("CREATE SCHEMA IF NOT EXISTS {quoted};"))?;
        info!("Ensured schema {} exists on target", schema);
        Ok(())
    }
}
