//! CLI command definitions and dispatch for the `courier` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! noun (e.g., `courier template add`, `courier account connect`), with
//! `search` and `send` as top-level verbs.

pub mod account;
pub mod challenge;
pub mod dialog;
pub mod send;
pub mod template;

use std::collections::HashMap;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;

use courier_core::account::PresetChallenge;
use courier_types::dialog::AccountFailure;

use crate::state::AppState;
use challenge::TerminalChallenge;

/// Send templated messages through several messaging accounts.
#[derive(Parser)]
#[command(name = "courier", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage message templates (list, show, add, delete, render, reload).
    Template {
        #[command(subcommand)]
        action: template::TemplateCommand,
    },

    /// Manage messaging accounts (list, connect).
    Account {
        #[command(subcommand)]
        action: account::AccountCommand,
    },

    /// Find a dialog by public handle across all configured accounts.
    Search {
        /// Handle to look up (leading @ optional).
        handle: String,
    },

    /// Render a template and send it.
    Send {
        /// Recipient handle (leading @ optional).
        handle: String,

        /// Template name.
        #[arg(short, long)]
        template: String,

        /// Template parameter as NAME=VALUE (repeatable).
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Send only through this account.
        #[arg(short, long)]
        account: Option<String>,

        /// Search dialogs first and send through the account that owns the match.
        #[arg(long, conflicts_with = "account")]
        via_search: bool,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse a `NAME=VALUE` pair. The value may be empty or contain `=`.
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Collect repeated `--param` pairs; later values win.
pub fn params_map(params: Vec<(String, String)>) -> HashMap<String, String> {
    params.into_iter().collect()
}

/// Sign in every configured account before a command that needs sessions.
///
/// Failures are printed to stderr and returned; the command proceeds with
/// whatever connected.
pub async fn connect_configured(state: &AppState, quiet: bool) -> Vec<AccountFailure> {
    let challenge = TerminalChallenge::new(PresetChallenge::new());
    let failures = state.connect_configured(&challenge).await;
    if !quiet {
        for failure in &failures {
            eprintln!(
                "  {} {}: {}",
                style("!").yellow().bold(),
                style(&failure.account).cyan(),
                failure.error
            );
        }
    }
    failures
}
