use crate::config::EndpointConfig;
use crate::error::{Result, SupashiftError};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// pg_dump wrapper for the CloudSQL source.
pub struct PgDump {
    endpoint: EndpointConfig,
    password: String,
    schema_only: bool,
    data_only: bool,
}

impl PgDump {
    pub fn new(endpoint: EndpointConfig, password: String) -> Self {
        Self {
            endpoint,
            password,
            schema_only: false,
            data_only: false,
        }
    }

    pub fn schema_only(mut self, value: bool) -> Self {
        self.schema_only = value;
        self
    }

    pub fn data_only(mut self, value: bool) -> Self {
        self.data_only = value;
        self
    }

    /// Check if pg_dump is available
    pub fn check_available() -> Result<()> {
        let output = Command::new("pg_dump").arg("--version").output();

        match output {
            Ok(o) if o.status.success() => {
                let version = String::from_utf8_lossy(&o.stdout);
                debug!("Found pg_dump: {}", version.trim());
                Ok(())
            }
            _ => Err(SupashiftError::PgDumpNotFound),
        }
    }

    /// Execute pg_dump and write to file
    pub fn dump_to_file(&self, output_path: &Path) -> Result<()> {
        Self::check_available()?;

        info!("Starting database dump...");

        let mut cmd = Command::new("pg_dump");
        cmd.arg("-h")
            .arg(&self.endpoint.host)
            .arg("-p")
            .arg(self.endpoint.port.to_string())
            .arg("-U")
            .arg(&self.endpoint.user)
            .arg("-d")
            .arg(&self.endpoint.database)
            .arg(format!("--schema={}", self.endpoint.schema))
            .arg("--no-comments");

        if self.schema_only {
            cmd.arg("--schema-only");
        }
        if self.data_only {
            // Plain INSERTs restore cleanly even when table definitions
            // already exist on the target.
            cmd.arg("--data-only").arg("--column-inserts");
        }

        cmd.arg("-f").arg(output_path);

        cmd.env("PGPASSWORD", &self.password)
            .env("PGSSLMODE", self.endpoint.sslmode());

        debug!("Running: {:?}", cmd);

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SupashiftError::FailedProcess {
                tool: "pg_dump",
                code: output.status.code(),
                stderr: stderr.to_string(),
            });
        }

        info!("Database dump completed: {}", output_path.display());
        Ok(())
    }
}
