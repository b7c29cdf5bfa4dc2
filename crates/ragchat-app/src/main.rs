//! ragchat server binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Apply flag and environment overrides
//! 3. Build the chat backend, session, and upstream client
//! 4. Serve the API and UI until ctrl-c

mod cli;

use clap::Parser;
use ragchat_api::{start_server, AppState};
use ragchat_core::config::RagchatConfig;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config = RagchatConfig::load_or_default(&config_file);
    args.apply(&mut config);

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting ragchat v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");
    tracing::info!(
        backend = ?config.chat.backend,
        llm_url = %config.upstream.llm_url,
        rag_url = %config.upstream.rag_url,
        "Upstreams configured"
    );

    let state = AppState::new(config.clone())?;

    if let Err(e) = start_server(&config, state).await {
        tracing::error!(error = %e, "Server stopped with an error");
        return Err(e.into());
    }

    Ok(())
}
