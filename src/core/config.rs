//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default location of the note file, relative to the working directory.
pub const DEFAULT_NOTES_PATH: &str = "data/notes.json";

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Note storage configuration.
    pub notes: NotesConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Where notes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteBackend {
    /// A JSON file at [`NotesConfig::path`].
    File,

    /// Process memory; notes vanish on exit.
    Memory,
}

/// Configuration for the notes domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    pub backend: NoteBackend,

    /// Note file used by the `file` backend.
    pub path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            backend: NoteBackend::File,
            path: PathBuf::from(DEFAULT_NOTES_PATH),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "utility-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            notes: NotesConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_NOTES_PATH`.
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = parse_flag(&timestamps).unwrap_or(true);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(path) = std::env::var("MCP_NOTES_PATH") {
            config.notes.path = PathBuf::from(path);
        }

        if let Ok(backend) = std::env::var("MCP_NOTES_BACKEND") {
            match backend.to_lowercase().as_str() {
                "file" => config.notes.backend = NoteBackend::File,
                "memory" => config.notes.backend = NoteBackend::Memory,
                other => warn!("Unknown MCP_NOTES_BACKEND '{}', using file storage", other),
            }
        }

        config
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(Error::config("server name must not be empty"));
        }
        if self.notes.backend == NoteBackend::File && self.notes.path.as_os_str().is_empty() {
            return Err(Error::config("notes path must not be empty"));
        }
        self.transport.validate()
    }
}

/// Parse a boolean-ish environment value.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.notes.path, PathBuf::from("data/notes.json"));
        assert_eq!(config.notes.backend, NoteBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_notes_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_NOTES_PATH", "/tmp/elsewhere/notes.json");
            std::env::set_var("MCP_NOTES_BACKEND", "memory");
        }
        let config = Config::from_env();
        assert_eq!(config.notes.path, PathBuf::from("/tmp/elsewhere/notes.json"));
        assert_eq!(config.notes.backend, NoteBackend::Memory);
        unsafe {
            std::env::remove_var("MCP_NOTES_PATH");
            std::env::remove_var("MCP_NOTES_BACKEND");
        }
    }

    #[test]
    fn test_server_name_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_SERVER_NAME", "kit");
        }
        let config = Config::from_env();
        assert_eq!(config.server.name, "kit");
        unsafe {
            std::env::remove_var("MCP_SERVER_NAME");
        }
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut config = Config::default();
        config.server.name = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
