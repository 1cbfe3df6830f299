//! Gamestore server binary.
//!
//! Reads its settings from flags or `GAMESTORE_*` environment variables,
//! serves the admin and storefront API, and drains on Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gamestore_server::network::TlsConfig;
use gamestore_server::{MemoryStore, NetworkConfig, NetworkModule, ServiceConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gamestore-server", about = "Gamestore admin and storefront API")]
struct Args {
    #[arg(long, env = "GAMESTORE_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "GAMESTORE_PORT", default_value_t = 3000)]
    port: u16,

    /// Comma-separated allowed origins; `*` allows any.
    #[arg(
        long,
        env = "GAMESTORE_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    cors_origins: Vec<String>,

    #[arg(long, env = "GAMESTORE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    #[arg(long, env = "GAMESTORE_DRAIN_TIMEOUT_SECS", default_value_t = 10)]
    drain_timeout_secs: u64,

    /// PEM certificate; TLS is enabled when both cert and key are given.
    #[arg(long, env = "GAMESTORE_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    #[arg(long, env = "GAMESTORE_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    #[arg(long, env = "GAMESTORE_HOME_SECTION_SIZE", default_value_t = 4)]
    home_section_size: u32,

    #[arg(long, env = "GAMESTORE_RELEASE_WINDOW_DAYS", default_value_t = 7)]
    release_window_days: i64,

    /// Emit logs as JSON lines.
    #[arg(long, env = "GAMESTORE_LOG_JSON", default_value_t = false)]
    log_json: bool,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls: TlsConfig::from_paths(self.tls_cert.clone(), self.tls_key.clone()),
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            home_section_size: self.home_section_size,
            release_window_days: self.release_window_days,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info,hyper=warn".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut module = NetworkModule::new(
        args.network_config(),
        args.service_config(),
        Arc::new(MemoryStore::new()),
    );
    let port = module.start().await.context("starting gamestore server")?;
    tracing::info!(port, "gamestore server ready");

    module
        .serve(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for ctrl-c");
            }
            tracing::info!("shutdown requested");
        })
        .await
}
