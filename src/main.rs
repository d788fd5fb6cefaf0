//! File Translation Server: HTTP file-format conversion service.
//!
//! Main entry point that wires the crates together and starts the server.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use translation_converter::FileTranslation;
use translation_core::config::AppConfig;
use translation_core::{AppError, TranslationConfig, TranslationOptions};

/// Command-line options. Each translation flag overrides the matching
/// `[translation]` setting from configuration files and the environment.
#[derive(Debug, Parser)]
#[command(name = "file-translation-server", version, about)]
struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(long)]
    env: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    /// Route prefix for every conversion endpoint
    #[arg(long)]
    route_prefix: Option<String>,

    /// API version path segment
    #[arg(long)]
    api_version: Option<String>,

    /// Service log level: 1 logs registrations, 2 also logs tool command lines
    #[arg(long)]
    log_level: Option<u8>,

    /// Maximum accepted upload size in bytes
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Pixel ceiling for resized output images
    #[arg(long)]
    max_output_pixels: Option<u64>,

    /// Path to the pdftk binary
    #[arg(long)]
    pdftk_path: Option<PathBuf>,

    /// Path to the pdftoppm binary
    #[arg(long)]
    pdftoppm_path: Option<PathBuf>,

    /// External tool timeout in seconds
    #[arg(long)]
    tool_timeout: Option<u64>,

    /// Directory for temporary files
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

impl Cli {
    fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            route_prefix: self.route_prefix.clone(),
            version: self.api_version.clone(),
            log_level: self.log_level,
            max_file_size: self.max_file_size,
            max_output_pixels: self.max_output_pixels,
            pdftk_path: self.pdftk_path.clone(),
            pdftoppm_path: self.pdftoppm_path.clone(),
            tool_timeout_seconds: self.tool_timeout,
            temp_dir: self.temp_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config);

    if let Err(e) = run(config, cli.translation_options()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("TRANSLATION_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig, options: TranslationOptions) -> Result<(), AppError> {
    tracing::info!("Starting File Translation Server v{}", env!("CARGO_PKG_VERSION"));

    let translation_config = TranslationConfig::resolve(&options, &config.translation)?;
    tracing::info!(
        route_prefix = %translation_config.route_prefix,
        version = %translation_config.version,
        max_file_size = translation_config.max_file_size,
        temp_dir = %translation_config.temp_dir.display(),
        "Resolved translation configuration"
    );

    let translation = FileTranslation::new(translation_config);

    for (tool, path) in translation.missing_tools().await {
        tracing::warn!(
            tool,
            path = %path.display(),
            "External tool not found; PDF conversions will fail"
        );
    }

    let app = translation_api::connect_routes(&translation)?;

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        converters = translation.converters().len(),
        "File translation server listening on {}",
        addr
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let grace_elapsed = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
        }
        _ = grace_elapsed => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Grace period elapsed, dropping in-flight requests"
            );
        }
    }

    tracing::info!("File translation server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
