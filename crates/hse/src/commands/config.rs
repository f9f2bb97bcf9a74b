//! Config command - manage connection contexts in `client.yaml`.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use console::Style;
use hse_config::{AuthConfig, ClientConfig, Context as ClientContext, CredentialStore};
use serde_json::json;

use super::{Context, print_json, print_success};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the current context name
    CurrentContext,

    /// List available contexts
    GetContexts,

    /// Switch to a different context
    UseContext {
        /// Context name to switch to
        name: String,
    },

    /// Create or update a context pointing at --server
    SetContext {
        /// Context name
        name: String,

        /// Environment variable holding a bearer token
        #[arg(long)]
        token_env: Option<String>,

        /// File holding a bearer token
        #[arg(long)]
        token_file: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Retries for transient failures
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Delete a context and its stored session
    DeleteContext {
        /// Context name to delete
        name: String,
    },

    /// Show the configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::CurrentContext => cmd_current_context(ctx),
        ConfigCommand::GetContexts => cmd_get_contexts(ctx),
        ConfigCommand::UseContext { name } => cmd_use_context(&name),
        ConfigCommand::SetContext {
            name,
            token_env,
            token_file,
            timeout,
            max_retries,
        } => {
            let auth = match (token_file, token_env) {
                (Some(file), None) => Some(AuthConfig::bearer_file(file)),
                (None, Some(var)) => Some(AuthConfig::bearer_env(var)),
                (Some(file), Some(var)) => Some(AuthConfig::Bearer {
                    token_file: Some(file),
                    token_env: Some(var),
                }),
                (None, None) => None,
            };
            cmd_set_context(&name, ctx.server_url.clone(), auth, timeout, max_retries)
        }
        ConfigCommand::DeleteContext { name } => cmd_delete_context(&name),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_current_context(ctx: &Context) -> Result<()> {
    let config = hse_config::load_client_config()?;

    if ctx.json_output {
        return print_json(&json!({ "currentContext": config.current_context }));
    }

    match &config.current_context {
        Some(name) => println!("{}", name),
        None => {
            println!("No current context set. Use 'hse config use-context <name>' to set one.")
        }
    }
    Ok(())
}

fn cmd_get_contexts(ctx: &Context) -> Result<()> {
    let config = hse_config::load_client_config()?;
    let current = config.current_context.as_deref();

    if ctx.json_output {
        let contexts: Vec<_> = config
            .contexts
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "server": c.server,
                    "current": current == Some(c.name.as_str()),
                })
            })
            .collect();
        return print_json(&contexts);
    }

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!();
        println!("Create one with:");
        println!("  hse config set-context local --server=http://localhost:3001");
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", dim.apply_to("CURRENT   NAME            SERVER"));
    for c in &config.contexts {
        let marker = if current == Some(c.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{}         {:<15} {}", marker, c.name, c.server);
    }
    Ok(())
}

fn cmd_use_context(name: &str) -> Result<()> {
    let mut config = hse_config::load_client_config()?;
    config.use_context(name)?;
    hse_config::save_client_config(&config)?;

    print_success(&format!("Switched to context \"{}\"", name));
    Ok(())
}

fn cmd_set_context(
    name: &str,
    server: Option<String>,
    auth: Option<AuthConfig>,
    timeout: Option<u64>,
    max_retries: Option<u32>,
) -> Result<()> {
    let mut config = hse_config::load_client_config()?;

    match config.get_context_mut(name) {
        Some(existing) => {
            if let Some(url) = server {
                existing.server = url;
            }
            if auth.is_some() {
                existing.auth = auth;
            }
            if timeout.is_some() {
                existing.timeout = timeout;
            }
            if max_retries.is_some() {
                existing.max_retries = max_retries;
            }
            print_success(&format!("Context \"{}\" modified", name));
        }
        None => {
            let server =
                server.ok_or_else(|| anyhow!("--server is required when creating a new context"))?;
            config.set_context(new_context(name, server, auth, timeout, max_retries));
            print_success(&format!("Context \"{}\" created", name));
        }
    }

    // The first context becomes current.
    if config.current_context.is_none() && config.contexts.len() == 1 {
        config.current_context = Some(name.to_string());
        println!("Context \"{}\" set as current context.", name);
    }

    hse_config::save_client_config(&config)?;
    Ok(())
}

fn new_context(
    name: &str,
    server: String,
    auth: Option<AuthConfig>,
    timeout: Option<u64>,
    max_retries: Option<u32>,
) -> ClientContext {
    let mut context = ClientContext::new(name, server);
    if let Some(auth) = auth {
        context = context.with_auth(auth);
    }
    if let Some(timeout) = timeout {
        context = context.with_timeout(timeout);
    }
    if let Some(retries) = max_retries {
        context = context.with_max_retries(retries);
    }
    context
}

fn cmd_delete_context(name: &str) -> Result<()> {
    let mut config: ClientConfig = hse_config::load_client_config()?;

    if config.remove_context(name).is_none() {
        return Err(hse_config::ConfigError::ContextNotFound(name.to_string()).into());
    }
    hse_config::save_client_config(&config)?;

    if let Some(store) = CredentialStore::default_location() {
        store.remove(name)?;
    }

    print_success(&format!("Context \"{}\" deleted", name));
    if config.current_context.is_none() {
        println!("Note: No current context. Use 'hse config use-context <name>' to set one.");
    }
    Ok(())
}

fn cmd_path() -> Result<()> {
    match hse_config::client_config_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("Could not determine config directory"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_applies_overrides() {
        let context = new_context(
            "site",
            "https://hse.example.com".to_string(),
            Some(AuthConfig::bearer_env("HSE_TOKEN")),
            Some(10),
            Some(0),
        );
        assert_eq!(context.server, "https://hse.example.com");
        assert_eq!(context.auth, Some(AuthConfig::bearer_env("HSE_TOKEN")));
        assert_eq!(context.timeout, Some(10));
        assert_eq!(context.max_retries, Some(0));
        assert!(context.retry_backoff_ms.is_none());
    }
}
