//! Team membership CLI commands: list, remove, invite, and invite lookup.
//!
//! Commands act on behalf of the user given with `--as <email>`; an
//! organization is only visible to its own members.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use hookport_types::organization::{MemberRole, UserSummary};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum MembersCommand {
    /// List members and open invites of an organization.
    #[command(alias = "ls")]
    List {
        /// Organization slug.
        org: String,

        /// Email of the acting user.
        #[arg(long = "as", value_name = "EMAIL")]
        as_user: String,
    },

    /// Remove a member from an organization.
    #[command(alias = "rm")]
    Remove {
        /// Organization slug.
        org: String,

        /// Member id (as shown by `members list`).
        member_id: Uuid,

        /// Email of the acting user.
        #[arg(long = "as", value_name = "EMAIL")]
        as_user: String,
    },

    /// Invite people to an organization by email.
    Invite {
        /// Organization slug.
        org: String,

        /// Emails to invite.
        #[arg(required = true)]
        emails: Vec<String>,

        /// Email of the acting user.
        #[arg(long = "as", value_name = "EMAIL")]
        as_user: String,
    },
}

#[derive(Subcommand)]
pub enum InviteCommand {
    /// Show the invite behind an invitation token.
    Show {
        /// Token from the invitation link.
        token: String,
    },
}

pub async fn handle_members_command(
    state: &AppState,
    action: MembersCommand,
    json: bool,
) -> Result<()> {
    match action {
        MembersCommand::List { org, as_user } => list_members(state, &org, &as_user, json).await,
        MembersCommand::Remove {
            org,
            member_id,
            as_user,
        } => remove_member(state, &org, &member_id, &as_user, json).await,
        MembersCommand::Invite {
            org,
            emails,
            as_user,
        } => invite_members(state, &org, &emails, &as_user, json).await,
    }
}

pub async fn handle_invite_command(
    state: &AppState,
    action: InviteCommand,
    json: bool,
) -> Result<()> {
    match action {
        InviteCommand::Show { token } => show_invite(state, &token, json).await,
    }
}

async fn acting_user(state: &AppState, email: &str) -> Result<UserSummary> {
    state
        .tenants
        .find_user_by_email(email)
        .await?
        .with_context(|| format!("no user with email '{email}'"))
}

fn display_name(user: &UserSummary) -> String {
    user.name.clone().unwrap_or_else(|| user.email.clone())
}

async fn list_members(state: &AppState, org: &str, as_user: &str, json: bool) -> Result<()> {
    let user = acting_user(state, as_user).await?;

    let Some(roster) = state
        .membership_service
        .get_team_members_and_invites(&user.id, org)
        .await?
    else {
        bail!("organization '{org}' not found or {as_user} is not a member");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&roster)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Member").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Id").fg(Color::White),
    ]);

    for member in &roster.members {
        let role = match member.role {
            MemberRole::Admin => Cell::new(member.role.to_string()).fg(Color::Yellow),
            MemberRole::Member => Cell::new(member.role.to_string()),
        };
        table.add_row(vec![
            Cell::new(display_name(&member.user)).fg(Color::Cyan),
            Cell::new(&member.user.email),
            role,
            Cell::new(member.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");

    if !roster.invites.is_empty() {
        let mut invites = Table::new();
        invites.load_preset(presets::UTF8_FULL_CONDENSED);
        invites.set_content_arrangement(ContentArrangement::Dynamic);
        invites.set_header(vec![
            Cell::new("Invited").fg(Color::White),
            Cell::new("By").fg(Color::White),
            Cell::new("Sent").fg(Color::White),
        ]);
        for invite in &roster.invites {
            invites.add_row(vec![
                Cell::new(&invite.email).fg(Color::Cyan),
                Cell::new(display_name(&invite.inviter)),
                Cell::new(invite.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
            ]);
        }
        println!();
        println!("{invites}");
    }

    println!();
    println!(
        "  {} member{}, {} open invite{}",
        style(roster.members.len()).bold(),
        if roster.members.len() == 1 { "" } else { "s" },
        style(roster.invites.len()).bold(),
        if roster.invites.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn remove_member(
    state: &AppState,
    org: &str,
    member_id: &Uuid,
    as_user: &str,
    json: bool,
) -> Result<()> {
    let user = acting_user(state, as_user).await?;
    let removed = state
        .membership_service
        .remove_team_member(&user.id, org, member_id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&removed)?);
    } else {
        println!(
            "  {} Removed {} from {}",
            style("✓").green().bold(),
            style(&removed.user.email).bold(),
            style(&removed.organization.slug).cyan()
        );
    }

    Ok(())
}

async fn invite_members(
    state: &AppState,
    org: &str,
    emails: &[String],
    as_user: &str,
    json: bool,
) -> Result<()> {
    let user = acting_user(state, as_user).await?;
    let invites = state
        .membership_service
        .invite_members(org, emails, &user.id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&invites)?);
        return Ok(());
    }

    println!();
    for invite in &invites {
        println!(
            "  {} {} {}",
            style("✉").blue().bold(),
            style(&invite.email).bold(),
            style(format!("token {}", invite.token)).dim()
        );
    }
    println!();

    Ok(())
}

async fn show_invite(state: &AppState, token: &str, json: bool) -> Result<()> {
    let Some(invite) = state.membership_service.get_invite_from_token(token).await? else {
        bail!("no invite for this token");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&invite)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} invited {} to {}",
        style("✉").blue().bold(),
        style(display_name(&invite.inviter)).bold(),
        style(&invite.email).bold(),
        style(&invite.organization.title).cyan()
    );
    println!(
        "  {}",
        style(format!("sent {}", invite.created_at.format("%Y-%m-%d %H:%M UTC"))).dim()
    );
    println!();

    Ok(())
}
