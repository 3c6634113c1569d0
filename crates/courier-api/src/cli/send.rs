//! `courier send`: render a template and deliver it to a handle.

use anyhow::{Context, Result};
use console::style;

use courier_types::dispatch::ScriptResult;

use super::params_map;
use crate::state::AppState;

/// How the sending account is chosen.
pub enum Route {
    /// Try each connected account in order until one delivers.
    Fallback,
    /// Use only the named account.
    Account(String),
    /// Search dialogs first and use the account that owns the match.
    ViaSearch,
}

pub async fn send(
    state: &AppState,
    handle: &str,
    template: &str,
    params: Vec<(String, String)>,
    route: Route,
    json: bool,
) -> Result<()> {
    let params = params_map(params);
    let work = async {
        match route {
            Route::Fallback => {
                state
                    .dispatcher
                    .send_to_handle(handle, template, &params)
                    .await
            }
            Route::Account(account) => {
                state
                    .dispatcher
                    .send_to_handle_via(handle, &account, template, &params)
                    .await
            }
            Route::ViaSearch => {
                let dialog = state.resolver.search(handle).await;
                state
                    .dispatcher
                    .send_to_dialog(&dialog, template, &params)
                    .await
            }
        }
    };

    let result = tokio::time::timeout(state.request_timeout(), work)
        .await
        .with_context(|| format!("Sending to '{handle}' timed out"))?;

    print_result(&result, handle, json)?;
    if !result.success {
        anyhow::bail!(
            "{}",
            result.error.as_deref().unwrap_or("message was not delivered")
        );
    }
    Ok(())
}

fn print_result(result: &ScriptResult, handle: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    if result.success {
        println!(
            "  {} Sent to {} via {}",
            style("✓").green().bold(),
            style(handle).cyan(),
            style(result.account.as_deref().unwrap_or("-")).cyan(),
        );
    } else {
        println!(
            "  {} Not sent to {}",
            style("✗").red().bold(),
            style(handle).cyan()
        );
    }
    if let Some(message) = &result.message {
        for line in message.lines() {
            println!("    {}", style(line).dim());
        }
    }
    for failure in &result.failures {
        println!(
            "    {} {}: {}",
            style("!").yellow(),
            style(&failure.account).cyan(),
            failure.error
        );
    }
    println!();
    Ok(())
}
