//! Auth command - session management.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::Style;
use hse_client::AuthResponse;
use serde_json::json;

use super::{Context, print_field, print_json, print_success};
use crate::client::Connection;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "HSE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an organization and its first admin user
    Signup {
        /// Your name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Organization name
        #[arg(long)]
        organization: String,

        /// Password (prompted for when omitted)
        #[arg(long, env = "HSE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Revoke the session and forget stored tokens
    Logout,

    /// Show the connection and session for the current context
    Status,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    let conn = Connection::open(ctx)?;

    match args.command {
        AuthCommand::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let response = conn.client.auth().login(&email, &password).await?;
            report_session(&response, &conn, ctx)
        }
        AuthCommand::Signup {
            name,
            email,
            organization,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let response = conn
                .client
                .auth()
                .signup(&name, &email, &password, &organization)
                .await?;
            report_session(&response, &conn, ctx)
        }
        AuthCommand::Logout => cmd_logout(&conn, ctx).await,
        AuthCommand::Status => cmd_status(&conn, ctx),
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

fn report_session(response: &AuthResponse, conn: &Connection, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        // Tokens stay in the credential store, not on stdout.
        return print_json(&json!({
            "context": conn.resolved.name,
            "server": conn.resolved.server,
            "user": response.user,
            "organization": response.organization,
        }));
    }

    let who = response
        .user
        .as_ref()
        .map(|u| format!("{} <{}>", u.name, u.email))
        .unwrap_or_else(|| "session started".to_string());
    print_success(&format!("Logged in: {}", who));
    if let Some(org) = &response.organization {
        print_field("Organization", Some(&org.name));
    }
    print_field("Server", Some(&conn.resolved.server));
    if conn.store.is_none() {
        println!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("No config directory found; the session will not be saved.")
        );
    }
    Ok(())
}

async fn cmd_logout(conn: &Connection, ctx: &Context) -> Result<()> {
    conn.client.auth().logout().await?;
    let removed = conn.forget_session()?;

    if ctx.json_output {
        return print_json(&json!({ "loggedOut": true, "removedStoredSession": removed }));
    }
    print_success("Logged out");
    Ok(())
}

fn cmd_status(conn: &Connection, ctx: &Context) -> Result<()> {
    let session = conn.client.session();
    let stored = conn.has_stored_session()?;
    let credential = if session.refresh_token().is_some() {
        "session"
    } else if session.is_authenticated() {
        "static token"
    } else {
        "none"
    };

    if ctx.json_output {
        return print_json(&json!({
            "context": conn.resolved.name,
            "server": conn.resolved.server,
            "authenticated": session.is_authenticated(),
            "credential": credential,
            "storedSession": stored,
        }));
    }

    super::print_header("Auth Status");
    print_field("Context", Some(&conn.resolved.name));
    print_field("Server", Some(&conn.resolved.server));
    print_field("Credential", Some(credential));
    if ctx.verbose {
        let path = conn.store.as_ref().map(|s| s.path().display().to_string());
        print_field("Store", path.as_deref());
    }
    if !session.is_authenticated() {
        println!();
        println!(
            "{}",
            Style::new().dim().apply_to("Run 'hse auth login' to start a session.")
        );
    }
    Ok(())
}
