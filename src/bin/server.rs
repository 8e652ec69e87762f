use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ranking_server::db::bootstrap;
use ranking_server::server::config::ServerConfig;
use ranking_server::web::{self, render::LeaderboardRenderer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        require_school = server_config.require_school,
        require_deviation = server_config.require_deviation,
        top_limit = server_config.top_limit,
        retention = ?server_config.retention,
        "Starting ranking server."
    );

    // --- Database Pool Setup ---
    let db_pool = match bootstrap::init_db(&server_config).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to initialize database.");
            return Err(e.into());
        }
    };

    let renderer = match LeaderboardRenderer::new() {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            error!(error = %e, "Failed to compile leaderboard template.");
            return Err(e.into());
        }
    };

    // --- Axum HTTP Server Setup ---
    let app = web::create_axum_router(db_pool, server_config.clone(), renderer);

    let addr: SocketAddr = server_config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
