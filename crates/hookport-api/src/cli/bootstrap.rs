//! `hookport bootstrap`: provision everything a first registration needs.
//!
//! Existing organizations, users, memberships, environments and endpoints are
//! reused, so the command can be re-run to mint another key or add endpoints.

use anyhow::Result;
use console::style;
use secrecy::ExposeSecret;

use hookport_types::environment::EnvironmentKind;
use hookport_types::error::RepositoryError;
use hookport_types::organization::MemberRole;

use crate::state::AppState;

/// Arguments of the `bootstrap` command.
pub struct BootstrapArgs {
    pub org: String,
    pub title: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub env: String,
    pub kind: EnvironmentKind,
    pub endpoints: Vec<String>,
}

/// Ignore `Conflict` for steps that may already have run.
fn tolerate_conflict<T>(result: Result<T, RepositoryError>) -> Result<Option<T>, RepositoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RepositoryError::Conflict(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn bootstrap(state: &AppState, args: BootstrapArgs, json: bool) -> Result<()> {
    let tenants = &state.tenants;

    let org = match tenants.find_organization(&args.org).await? {
        Some(org) => org,
        None => {
            let title = args.title.as_deref().unwrap_or(&args.org);
            tenants.create_organization(&args.org, title).await?
        }
    };

    let user = match tenants.find_user_by_email(&args.email).await? {
        Some(user) => user,
        None => tenants.create_user(&args.email, args.name.as_deref()).await?,
    };

    let member_id = tolerate_conflict(tenants.add_member(&org.id, &user.id, MemberRole::Admin).await)?;

    let environment = match tenants.find_environment(&org.id, &args.env).await? {
        Some(env) => env,
        None => tenants.create_environment(&org.id, &args.env, args.kind).await?,
    };

    let mut created_endpoints = Vec::new();
    for slug in &args.endpoints {
        if tolerate_conflict(tenants.create_endpoint(&environment.id, slug, None).await)?.is_some() {
            created_endpoints.push(slug.clone());
        }
    }

    let (key_id, api_key) = state.api_keys.create_api_key(&environment, "bootstrap").await?;

    tracing::info!(
        organization = %org.slug,
        environment = %environment.slug,
        key_id = %key_id,
        "Bootstrap complete"
    );

    if json {
        let out = serde_json::json!({
            "organization": org,
            "user": user,
            "memberId": member_id,
            "environment": environment,
            "endpointsCreated": created_endpoints,
            "apiKey": { "id": key_id, "key": api_key.expose_secret() },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Organization {} ({})",
        style("✓").green().bold(),
        style(&org.slug).cyan().bold(),
        org.title
    );
    println!(
        "  {} Admin {}{}",
        style("✓").green().bold(),
        style(&user.email).bold(),
        if member_id.is_some() { "" } else { " (already a member)" }
    );
    println!(
        "  {} Environment {} [{}]",
        style("✓").green().bold(),
        style(&environment.slug).cyan(),
        environment.kind
    );
    for slug in &created_endpoints {
        println!("  {} Endpoint {}", style("✓").green().bold(), style(slug).cyan());
    }
    println!();
    println!(
        "  {} API key generated (save this -- it won't be shown again):",
        style("🔑").bold()
    );
    println!();
    println!("  {}", style(api_key.expose_secret()).yellow().bold());
    println!();

    Ok(())
}
