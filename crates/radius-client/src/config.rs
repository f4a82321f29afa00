use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Longest shared secret RFC 2865 implementations are expected to handle
const RECOMMENDED_MAX_SECRET_LENGTH: usize = 128;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for talking to one RADIUS authentication server
///
/// The configuration is never modified by an exchange and may be shared
/// between concurrent authentications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorConfig {
    /// Server host name or IP address
    pub server: String,

    /// Server authentication port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret registered for this client on the server
    pub secret: String,

    /// Number of times the request is sent before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Time to wait for an answer to each transmission, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// NAS-Identifier sent when the caller does not supply one
    #[serde(default)]
    pub nas_identifier: Option<String>,

    /// Log level for the command line tool: "trace", "debug", "info", "warn", "error"
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_port() -> u16 {
    1812 // Standard RADIUS authentication port
}

fn default_retries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        AuthenticatorConfig {
            server: "127.0.0.1".to_string(),
            port: default_port(),
            secret: String::new(),
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
            nas_identifier: None,
            log_level: None,
        }
    }
}

impl AuthenticatorConfig {
    /// Configuration with the default retry count (3) and timeout (10s)
    pub fn new(server: impl Into<String>, port: u16, secret: impl Into<String>) -> Self {
        AuthenticatorConfig {
            server: server.into(),
            port,
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_nas_identifier(mut self, nas_identifier: impl Into<String>) -> Self {
        self.nas_identifier = Some(nas_identifier.into());
        self
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the shared secret
    pub fn get_secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: AuthenticatorConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid("Server cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("Port cannot be 0".to_string()));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        if self.retries == 0 {
            return Err(ConfigError::Invalid(
                "Retries must be at least 1".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("Timeout cannot be 0".to_string()));
        }

        if self.secret.len() > RECOMMENDED_MAX_SECRET_LENGTH {
            warn!(
                secret_len = self.secret.len(),
                "Shared secret is longer than {} bytes; some servers may not accept it",
                RECOMMENDED_MAX_SECRET_LENGTH
            );
        }

        Ok(())
    }

    /// Create an example configuration file
    pub fn example() -> Self {
        AuthenticatorConfig {
            server: "radius.example.com".to_string(),
            port: 1812,
            secret: "testing123".to_string(),
            retries: 3,
            timeout_ms: 5_000,
            nas_identifier: Some("vpn-gateway-01".to_string()),
            log_level: Some("info".to_string()),
        }
    }
}
