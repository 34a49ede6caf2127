//! Process entry point (§6): wires the HTTP/WebSocket surface on top of
//! the core crates and runs the axum server. Exit codes: `0` ok, `1`
//! config error, `2` bind/listen failure.

mod config;
mod error;
mod llm_factory;
mod routes;
mod sse;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "vps-gateway", about = "Agentic VPS management gateway")]
struct Cli {
    /// Path to a TOML config file; falls back to standard search locations.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::from(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start the async runtime");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: config::Config) -> ExitCode {
    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = state::AppState::init(config);
    let app = routes::build_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %bind_addr, "failed to bind listener");
            return ExitCode::from(2);
        }
    };

    tracing::info!(addr = %bind_addr, "vps-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
