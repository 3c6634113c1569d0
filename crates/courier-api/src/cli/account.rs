//! Account CLI subcommands.
//!
//! The CLI holds no sessions between runs, so `connect` signs in a single
//! configured account to verify its credentials and challenge answers.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use courier_core::account::PresetChallenge;
use courier_infra::config::connection_request;

use super::challenge::TerminalChallenge;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum AccountCommand {
    /// List configured accounts.
    List,

    /// Sign in a configured account.
    Connect {
        /// Account name from config.toml.
        name: String,

        /// Verification code (prompted for when omitted).
        #[arg(long)]
        code: Option<String>,

        /// Two-factor password (prompted for when omitted).
        #[arg(long)]
        password: Option<String>,

        /// Profile name for a phone number that has no account yet.
        #[arg(long)]
        profile_name: Option<String>,
    },
}

pub async fn handle_account_command(
    cmd: AccountCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        AccountCommand::List => list_accounts(state, json).await,
        AccountCommand::Connect {
            name,
            code,
            password,
            profile_name,
        } => {
            let mut preset = PresetChallenge::new();
            if let Some(code) = code {
                preset = preset.with_code(code);
            }
            if let Some(password) = password {
                preset = preset.with_password(password);
            }
            if let Some(profile_name) = profile_name {
                preset = preset.with_profile_name(profile_name);
            }
            connect_account(state, &name, TerminalChallenge::new(preset), json).await
        }
    }
}

async fn list_accounts(state: &AppState, json: bool) -> Result<()> {
    let connected = state.registry.list().await;

    if json {
        let accounts: Vec<_> = state
            .config
            .accounts
            .iter()
            .map(|account| {
                let live = connected.iter().find(|a| a.name == account.name);
                serde_json::json!({
                    "name": account.name,
                    "api_id": account.api_id,
                    "phone": account.phone,
                    "api_hash_env": account.api_hash_env,
                    "connected": live.is_some(),
                    "display_name": live.and_then(|a| a.display_name.clone()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if state.config.accounts.is_empty() {
        println!();
        println!("  No accounts configured. Add one to:");
        println!(
            "  {}",
            style(state.data_dir.join("config.toml").display()).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Phone", "API ID", "Hash env", "Hash set"]);

    for account in &state.config.accounts {
        let hash_set = connection_request(account).is_ok();
        let hash_cell = if hash_set {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&account.name).fg(Color::Cyan),
            Cell::new(&account.phone),
            Cell::new(account.api_id),
            Cell::new(&account.api_hash_env).fg(Color::DarkGrey),
            hash_cell,
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn connect_account(
    state: &AppState,
    name: &str,
    challenge: TerminalChallenge,
    json: bool,
) -> Result<()> {
    let config = state
        .config
        .accounts
        .iter()
        .find(|a| a.name == name)
        .with_context(|| format!("Account '{name}' is not in config.toml"))?;

    let request = connection_request(config)?;
    let account = tokio::time::timeout(
        state.request_timeout() * 4,
        state.registry.connect(request, &challenge),
    )
    .await
    .with_context(|| format!("Timed out connecting '{name}'"))??;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
    } else {
        println!();
        println!(
            "  {} Connected '{}' as {}",
            style("✓").green().bold(),
            style(&account.name).cyan(),
            style(account.display_name.as_deref().unwrap_or(&account.phone)).bold(),
        );
        println!();
    }

    state.registry.disconnect_all().await;
    Ok(())
}
