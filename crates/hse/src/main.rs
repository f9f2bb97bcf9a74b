//! HSE - command-line client for the HSE management API
//!
//! Main entry point for the `hse` CLI.

use clap::{Parser, Subcommand};
use console::Style;

mod client;
mod commands;

use commands::{audits, auth, config, contractors, incidents, permits, stations, usage, users};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// HSE - manage stations, audits and incidents from the command line
#[derive(Parser)]
#[command(name = "hse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (overrides the context's server)
    #[arg(long, global = true, env = "HSE_SERVER_URL")]
    pub server: Option<String>,

    /// Connection context from client.yaml
    #[arg(long, global = true, env = "HSE_CONTEXT")]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, sign up, log out
    Auth(auth::AuthArgs),

    /// Manage connection contexts
    Config(config::ConfigArgs),

    /// Station management
    Stations(stations::StationsArgs),

    /// Audit scheduling and results
    Audits(audits::AuditsArgs),

    /// Incident reporting
    Incidents(incidents::IncidentsArgs),

    /// List contractors
    Contractors(contractors::ContractorsArgs),

    /// List work permits
    Permits(permits::PermitsArgs),

    /// List users in the organization
    Users(users::UsersArgs),

    /// Show usage for the current billing period
    Usage(usage::UsageArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file in the config dir
    let filter = if cli.verbose {
        "hse=debug,hse_client=debug,hse_config=debug,info"
    } else {
        "hse=info,hse_client=info,hse_config=info,warn"
    };
    let console_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let log_dir = hse_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "hse.log");
    let (non_blocking, log_guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(cli.verbose)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "hse=debug,hse_client=debug,hse_config=debug,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        server_url: cli.server,
        context_name: cli.context,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Stations(args) => stations::run(args, &ctx).await,
        Commands::Audits(args) => audits::run(args, &ctx).await,
        Commands::Incidents(args) => incidents::run(args, &ctx).await,
        Commands::Contractors(args) => contractors::run(args, &ctx).await,
        Commands::Permits(args) => permits::run(args, &ctx).await,
        Commands::Users(args) => users::run(args, &ctx).await,
        Commands::Usage(args) => usage::run(args, &ctx).await,
    };

    if let Err(e) = result {
        let red = Style::new().red();
        eprintln!("{} {:#}", red.apply_to("Error:"), e);
        if let Some(hint) = commands::hint_for(&e) {
            eprintln!("{}", Style::new().dim().apply_to(hint));
        }
        drop(log_guard);
        std::process::exit(1);
    }
}
