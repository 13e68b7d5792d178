//! API key CLI commands: create, revoke.

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Mint a new API key for an environment.
    Create {
        /// Organization slug.
        #[arg(long)]
        org: String,

        /// Environment slug.
        #[arg(long)]
        env: String,

        /// Label stored with the key.
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// Revoke an API key by id.
    Revoke {
        /// Key id printed when the key was created.
        id: Uuid,
    },
}

pub async fn handle_keys_command(state: &AppState, action: KeysCommand, json: bool) -> Result<()> {
    match action {
        KeysCommand::Create { org, env, name } => create_key(state, &org, &env, &name, json).await,
        KeysCommand::Revoke { id } => revoke_key(state, &id, json).await,
    }
}

async fn create_key(state: &AppState, org: &str, env: &str, name: &str, json: bool) -> Result<()> {
    let organization = state
        .tenants
        .find_organization(org)
        .await?
        .with_context(|| format!("organization '{org}' not found"))?;
    let environment = state
        .tenants
        .find_environment(&organization.id, env)
        .await?
        .with_context(|| format!("environment '{env}' not found in '{org}'"))?;

    let (id, key) = state.api_keys.create_api_key(&environment, name).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"id": id, "environment": environment.slug, "key": key.expose_secret()})
        );
    } else {
        println!();
        println!(
            "  {} API key {} for {}/{} (save this -- it won't be shown again):",
            style("🔑").bold(),
            style(id).dim(),
            style(org).cyan(),
            style(env).cyan()
        );
        println!();
        println!("  {}", style(key.expose_secret()).yellow().bold());
        println!();
    }

    Ok(())
}

async fn revoke_key(state: &AppState, id: &Uuid, json: bool) -> Result<()> {
    state
        .api_keys
        .revoke_api_key(id)
        .await
        .with_context(|| format!("could not revoke API key {id}"))?;

    if json {
        println!("{}", serde_json::json!({"revoked": true, "id": id}));
    } else {
        println!("  {} API key {} revoked", style("✓").green().bold(), style(id).bold());
    }

    Ok(())
}
