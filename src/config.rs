//! Client configuration for pgmeta
//!
//! Settings come from defaults, then an optional TOML file, then an optional
//! connection URL; later sources win. URLs and key/value connection strings
//! are parsed by the driver, so percent-escapes and parameters such as
//! `sslmode` behave as they do in libpq.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio_postgres::config::Host;

use crate::error::{Error, Result};
use crate::query::ExecContext;

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// How the CLI renders results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login role
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database name
    pub dbname: Option<String>,
    /// Per-query timeout in milliseconds
    pub statement_timeout: Option<u64>,
    /// Reject patterns with an unterminated quote
    pub strict_patterns: bool,
    pub output: OutputFormat,
    /// Driver settings from the connection URL, kept for the options
    /// without a field of their own
    #[serde(skip)]
    pub connection: Option<tokio_postgres::Config>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            user: None,
            password: None,
            dbname: None,
            statement_timeout: None,
            strict_patterns: false,
            output: OutputFormat::Table,
            connection: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    /// Set the per-query timeout
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout.as_millis() as u64);
        self
    }

    pub fn strict_patterns(mut self, strict: bool) -> Self {
        self.strict_patterns = strict;
        self
    }

    /// Parse TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then `file` if given, then `url` if given
    pub fn load(file: Option<&Path>, url: Option<&str>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        match url {
            Some(url) => config.with_url(url),
            None => Ok(config),
        }
    }

    /// Overlay the parts a `postgres://` URL or `key=value` string specifies
    pub fn with_url(mut self, url: &str) -> Result<Self> {
        let parsed: tokio_postgres::Config = url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid connection string: {}", e)))?;

        if let Some(host) = parsed.get_hosts().first() {
            self.host = match host {
                Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                Host::Unix(dir) => dir.to_string_lossy().into_owned(),
            };
        }
        if let Some(port) = parsed.get_ports().first() {
            self.port = *port;
        }
        if let Some(user) = parsed.get_user() {
            self.user = Some(user.to_string());
        }
        if let Some(password) = parsed.get_password() {
            self.password = Some(String::from_utf8_lossy(password).into_owned());
        }
        if let Some(dbname) = parsed.get_dbname() {
            self.dbname = Some(dbname.to_string());
        }
        self.connection = Some(parsed);
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.statement_timeout.map(Duration::from_millis)
    }

    /// Driver configuration for these settings.
    ///
    /// Starts from the parsed URL, if any, so its extra options survive;
    /// hosts and ports it lists are used as given.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg = self.connection.clone().unwrap_or_default();
        if pg.get_hosts().is_empty() {
            pg.host(&self.host);
        }
        if pg.get_ports().is_empty() {
            pg.port(self.port);
        }
        if pg.get_application_name().is_none() {
            pg.application_name("pgmeta");
        }
        if let Some(user) = &self.user {
            pg.user(user);
        }
        if let Some(password) = &self.password {
            pg.password(password);
        }
        if let Some(dbname) = &self.dbname {
            pg.dbname(dbname);
        }
        pg
    }

    /// Execution context carrying the timeout and pattern strictness
    pub fn exec_context(&self) -> ExecContext {
        ExecContext::new()
            .with_timeout(self.timeout())
            .with_strict_patterns(self.strict_patterns)
    }
}
