//! `courier search`: look a handle up across every connected account.

use anyhow::{Context, Result};
use console::style;

use crate::state::AppState;

pub async fn search(state: &AppState, handle: &str, json: bool) -> Result<()> {
    let result = tokio::time::timeout(
        state.request_timeout(),
        state.resolver.search_detailed(handle),
    )
    .await
    .with_context(|| format!("Search for '{handle}' timed out"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let dialog = &result.dialog;
    println!();
    if dialog.found {
        println!(
            "  {} {} ({})",
            style("✓").green().bold(),
            style(&dialog.title).bold(),
            style(format!("@{}", dialog.handle)).cyan(),
        );
        println!("    id:      {}", dialog.id);
        println!(
            "    account: {}",
            style(dialog.account.as_deref().unwrap_or("-")).cyan()
        );
    } else {
        println!(
            "  {} @{} not found ({} account(s) searched)",
            style("✗").red().bold(),
            dialog.handle,
            result.accounts_queried,
        );
    }
    for failure in &result.failures {
        println!(
            "    {} {}: {}",
            style("!").yellow(),
            style(&failure.account).cyan(),
            style(&failure.error).dim(),
        );
    }
    println!();
    Ok(())
}
