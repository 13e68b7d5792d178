//! CLI command definitions and dispatch for the `hookport` binary.
//!
//! Uses clap derive macros for argument parsing. Besides `serve`, the
//! commands provision tenants and API keys and manage team membership.

pub mod bootstrap;
pub mod keys;
pub mod members;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use hookport_types::environment::EnvironmentKind;

/// Trigger registration intake service.
#[derive(Parser)]
#[command(name = "hookport", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs as JSON lines.
    #[arg(long, global = true, env = "HOOKPORT_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(short, long, env = "HOOKPORT_PORT")]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long, env = "HOOKPORT_HOST")]
        host: Option<String>,
    },

    /// Provision an organization, its first admin, an environment, endpoints
    /// and an API key.
    Bootstrap {
        /// Organization slug.
        #[arg(long)]
        org: String,

        /// Organization display name (defaults to the slug).
        #[arg(long)]
        title: Option<String>,

        /// Email of the organization's first admin.
        #[arg(long)]
        email: String,

        /// Display name of the admin.
        #[arg(long)]
        name: Option<String>,

        /// Environment slug.
        #[arg(long, default_value = "dev")]
        env: String,

        /// Environment kind (development, staging, production).
        #[arg(long, default_value = "development")]
        kind: EnvironmentKind,

        /// Endpoint slug to create (repeatable).
        #[arg(long = "endpoint")]
        endpoints: Vec<String>,
    },

    /// Manage environment API keys.
    Keys {
        #[command(subcommand)]
        action: keys::KeysCommand,
    },

    /// Manage organization members.
    Members {
        #[command(subcommand)]
        action: members::MembersCommand,
    },

    /// Inspect organization invites.
    Invite {
        #[command(subcommand)]
        action: members::InviteCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
