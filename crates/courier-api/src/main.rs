//! Courier CLI and REST API entry point.
//!
//! Binary name: `courier`
//!
//! Parses CLI arguments, loads config and templates, then dispatches to the
//! appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::send::Route;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,courier=debug",
        _ => "trace",
    };
    if let Err(err) = courier_observe::tracing_setup::init_tracing(filter, cli.otel) {
        eprintln!("Warning: tracing setup failed: {err}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "courier", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(cli, &state).await;

    state.registry.disconnect_all().await;
    courier_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Template { action } => {
            cli::template::handle_template_command(action, state, cli.json).await?;
        }

        Commands::Account { action } => {
            cli::account::handle_account_command(action, state, cli.json).await?;
        }

        Commands::Search { handle } => {
            cli::connect_configured(state, cli.quiet).await;
            cli::dialog::search(state, &handle, cli.json).await?;
        }

        Commands::Send {
            handle,
            template,
            params,
            account,
            via_search,
        } => {
            let route = match (account, via_search) {
                (Some(account), _) => Route::Account(account),
                (None, true) => Route::ViaSearch,
                (None, false) => Route::Fallback,
            };
            cli::connect_configured(state, cli.quiet).await;
            cli::send::send(state, &handle, &template, params, route, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let failures = cli::connect_configured(state, cli.quiet).await;
            let connected = state.registry.len().await;
            tracing::info!(connected, failed = failures.len(), "accounts ready");

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Courier API listening on {} ({} account(s) connected)",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan(),
                connected,
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
