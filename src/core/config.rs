use crate::models::user::Role;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Defaults to 3001 unless a Unix socket is configured instead
    #[serde(default)]
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Write-ahead log location; memory only when absent
    pub wal_path: Option<PathBuf>,
    #[serde(default = "default_compact_on_start")]
    pub compact_on_start: bool,
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    pub path: Option<PathBuf>,
    #[serde(default = "default_console")]
    pub console: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// Account created at startup unless its email is already taken
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// Settings read by the `desk` terminal client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_revalidate_on_restore")]
    pub revalidate_on_restore: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
}

// Default value functions
fn default_port() -> Option<u16> {
    Some(3001)
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_compact_on_start() -> bool {
    true
}

fn default_password_iterations() -> u32 {
    100_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

fn default_api_url() -> String {
    "http://127.0.0.1:3001/api".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".equipdesk-session.json")
}

fn default_revalidate_on_restore() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_export_path() -> PathBuf {
    PathBuf::from("employee-entries.xlsx")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            unix_socket: None,
            num_threads: default_num_threads(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: None,
            compact_on_start: default_compact_on_start(),
            password_iterations: default_password_iterations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            path: None,
            console: default_console(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: default_session_file(),
            revalidate_on_restore: default_revalidate_on_restore(),
            timeout_secs: default_timeout_secs(),
            export_path: default_export_path(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        if config.server.port.is_none() && config.server.unix_socket.is_none() {
            config.server.port = default_port();
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.storage.password_iterations == 0 {
            bail!("password_iterations must be greater than 0");
        }

        self.logging.validate()?;

        for (index, user) in self.seed.users.iter().enumerate() {
            if user.email.trim().is_empty() || user.password.is_empty() {
                bail!("seed user #{} needs both an email and a password", index + 1);
            }
        }

        self.client.validate()?;

        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.format
            );
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ClientFile {
    #[serde(default)]
    client: ClientConfig,
}

impl ClientConfig {
    /// Read the `[client]` table, falling back to defaults when the file is absent
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let file: ClientFile = toml::from_str(&content)
            .context("Failed to parse client config")?;

        file.client.validate()?;

        Ok(file.client)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!("api_url must be an http(s) URL, got '{}'", self.api_url);
        }

        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
