//! Hookport CLI and REST API entry point.
//!
//! Binary name: `hookport`
//!
//! Parses CLI arguments, initializes logging, database and services, then
//! dispatches to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use hookport_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::bootstrap::BootstrapArgs;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "hookport", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(&TracingOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                addr = %addr,
                backend = ?state.config.registrar.backend,
                data_dir = %state.data_dir.display(),
                "Hookport API listening"
            );
            println!(
                "  {} Hookport API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Bootstrap {
            org,
            title,
            email,
            name,
            env,
            kind,
            endpoints,
        } => {
            let args = BootstrapArgs {
                org,
                title,
                email,
                name,
                env,
                kind,
                endpoints,
            };
            cli::bootstrap::bootstrap(&state, args, cli.json).await?;
        }

        Commands::Keys { action } => {
            cli::keys::handle_keys_command(&state, action, cli.json).await?;
        }

        Commands::Members { action } => {
            cli::members::handle_members_command(&state, action, cli.json).await?;
        }

        Commands::Invite { action } => {
            cli::members::handle_invite_command(&state, action, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
