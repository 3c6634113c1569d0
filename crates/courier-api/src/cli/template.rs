//! Template CLI subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use courier_core::template::placeholder::{extract_placeholders, render_body};

use super::{params_map, parse_key_val};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List all templates.
    List,

    /// Show a single template.
    Show {
        /// Template name.
        name: String,
    },

    /// Add a template, or replace one with the same name.
    Add {
        /// Template name.
        name: String,

        /// Body with {Placeholder} markers.
        body: String,

        /// Free-form description.
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a template.
    Delete {
        /// Template name.
        name: String,
    },

    /// Render a template without sending it.
    Render {
        /// Template name. Ignored when --body is given.
        #[arg(required_unless_present = "body")]
        name: Option<String>,

        /// Preview an ad-hoc body instead of a stored template.
        #[arg(long)]
        body: Option<String>,

        /// Template parameter as NAME=VALUE (repeatable).
        #[arg(short, long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Re-read the template document from disk.
    Reload,
}

pub async fn handle_template_command(
    cmd: TemplateCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        TemplateCommand::List => list_templates(state, json).await,
        TemplateCommand::Show { name } => show_template(state, &name, json).await,
        TemplateCommand::Add {
            name,
            body,
            description,
        } => add_template(state, &name, &body, &description, json).await,
        TemplateCommand::Delete { name } => delete_template(state, &name, json).await,
        TemplateCommand::Render { name, body, params } => {
            render_template(state, name.as_deref(), body.as_deref(), params, json).await
        }
        TemplateCommand::Reload => reload_templates(state, json).await,
    }
}

async fn list_templates(state: &AppState, json: bool) -> Result<()> {
    let templates = state.template_service.list().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!();
        println!("  No templates yet. Add one with:");
        println!(
            "  {}",
            style("courier template add greet \"Hello, {Name}!\"").cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Name", "Placeholders", "Description"]);

    for template in &templates {
        table.add_row(vec![
            Cell::new(&template.name).fg(Color::Cyan),
            Cell::new(template.placeholders.join(", ")).fg(Color::Yellow),
            Cell::new(&template.description),
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn show_template(state: &AppState, name: &str, json: bool) -> Result<()> {
    let template = state
        .template_service
        .get(name)
        .await
        .with_context(|| format!("Template '{name}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&template.name).cyan().bold());
    if !template.description.is_empty() {
        println!("  {}", style(&template.description).dim());
    }
    println!();
    for line in template.body.lines() {
        println!("    {line}");
    }
    println!();
    if !template.placeholders.is_empty() {
        println!(
            "  Placeholders: {}",
            style(template.placeholders.join(", ")).yellow()
        );
        println!();
    }
    Ok(())
}

async fn add_template(
    state: &AppState,
    name: &str,
    body: &str,
    description: &str,
    json: bool,
) -> Result<()> {
    let outcome = state
        .template_service
        .add_or_update(name, body, description)
        .await?;

    if json {
        let result = serde_json::json!({
            "name": name.trim(),
            "outcome": outcome,
            "placeholders": extract_placeholders(body),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} Template '{}' {}",
            style("✓").green().bold(),
            style(name.trim()).cyan(),
            outcome,
        );
        println!();
    }
    Ok(())
}

async fn delete_template(state: &AppState, name: &str, json: bool) -> Result<()> {
    state.template_service.delete(name).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": name }));
    } else {
        println!();
        println!(
            "  {} Template '{}' deleted",
            style("✓").green().bold(),
            style(name).cyan()
        );
        println!();
    }
    Ok(())
}

async fn render_template(
    state: &AppState,
    name: Option<&str>,
    body: Option<&str>,
    params: Vec<(String, String)>,
    json: bool,
) -> Result<()> {
    let params = params_map(params);
    let rendered = match (body, name) {
        (Some(body), _) => render_body(body, &params),
        (None, Some(name)) => state.template_service.render(name, &params).await?,
        (None, None) => anyhow::bail!("either a template name or --body is required"),
    };

    if json {
        println!("{}", serde_json::json!({ "rendered": rendered }));
    } else {
        println!("{rendered}");
    }
    Ok(())
}

async fn reload_templates(state: &AppState, json: bool) -> Result<()> {
    let count = state.template_service.reload().await;

    if json {
        println!("{}", serde_json::json!({ "loaded": count }));
    } else {
        println!();
        println!(
            "  {} Loaded {} template(s)",
            style("✓").green().bold(),
            style(count).cyan()
        );
        println!();
    }
    Ok(())
}
