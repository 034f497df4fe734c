//! Configuration for amiwire
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::time::Duration;

use crate::error::{AmiError, Result};

/// Default manager port
pub const DEFAULT_PORT: u16 = 5038;

/// Connection and credential settings for one session
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Manager host name or IP address
    pub host: String,

    /// Manager TCP port
    pub port: u16,

    /// Upper bound on establishing the TCP connection (milliseconds)
    pub connect_timeout_ms: u64,

    /// Per-read timeout (milliseconds). A reply stream that stalls for this
    /// long is considered finished.
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    pub username: String,

    pub secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            read_timeout_ms: 1000,
            write_timeout_ms: 5000,
            username: String::new(),
            secret: String::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as used for resolution and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Reject settings the socket layer cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AmiError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(AmiError::Config("port must not be 0".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(AmiError::Config(
                "connect timeout must be greater than 0".to_string(),
            ));
        }
        if self.read_timeout_ms == 0 {
            return Err(AmiError::Config(
                "read timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Overwrite the credential buffers before they are released.
    ///
    /// Best effort only: copies made elsewhere (e.g. the encoded Login
    /// request) are not reached.
    pub fn clear_credentials(&mut self) {
        wipe(&mut self.username);
        wipe(&mut self.secret);
    }
}

fn wipe(value: &mut String) {
    let mut bytes = std::mem::take(value).into_bytes();
    bytes.fill(0);
    std::hint::black_box(&bytes);
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the manager host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the manager port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the login username and secret
    pub fn credentials(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.secret = secret.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
