//! Listener and transport settings for the gamestore HTTP server.

use std::path::PathBuf;
use std::time::Duration;

/// Where and how the API is served.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub host: String,
    /// 0 lets the OS pick a port; `NetworkModule::start` reports the result.
    pub port: u16,
    /// Serves HTTPS when set.
    pub tls: Option<TlsConfig>,
    /// Origins allowed by CORS. A lone `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Requests running longer are answered with 408.
    pub request_timeout: Duration,
    /// How long shutdown waits for in-flight API requests.
    pub drain_timeout: Duration,
}

impl NetworkConfig {
    /// `host:port` as handed to the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            tls: None,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            drain_timeout: Duration::from_secs(10),
        }
    }
}

/// PEM certificate and key. There is no default location.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl TlsConfig {
    /// TLS material when both paths are given, `None` otherwise.
    #[must_use]
    pub fn from_paths(cert_path: Option<PathBuf>, key_path: Option<PathBuf>) -> Option<Self> {
        Some(Self {
            cert_path: cert_path?,
            key_path: key_path?,
        })
    }
}
