//! Connecting the CLI to an HSE server.
//!
//! Resolves the connection context from `client.yaml` and the global flags,
//! restores the stored session for that context, and wires the client's
//! token observer to the credential store so refreshed pairs survive the
//! process.

use anyhow::{Context as _, Result};
use hse_client::{AuthTokens, HseClient};
use hse_config::{CredentialStore, ResolvedContext, StoredTokens};
use tracing::{debug, warn};

use crate::commands::Context;

/// A configured client plus where its session is persisted.
pub struct Connection {
    pub client: HseClient,
    pub resolved: ResolvedContext,
    /// Key of this connection's entry in the credential store.
    pub session_key: String,
    pub store: Option<CredentialStore>,
}

impl Connection {
    /// Build a client for the command context.
    pub fn open(ctx: &Context) -> Result<Self> {
        let config = hse_config::load_client_config().context("loading client config")?;
        let mut resolved = config.resolve(ctx.context_name.as_deref())?;

        // An explicit server gets its own session slot unless a context was named.
        let session_key = match (&ctx.server_url, &ctx.context_name) {
            (Some(server), None) => server.clone(),
            _ => resolved.name.clone(),
        };
        if let Some(server) = &ctx.server_url {
            resolved.server = server.clone();
        }
        debug!(context = %resolved.name, server = %resolved.server, "Resolved connection");

        let store = CredentialStore::default_location();
        let stored = match &store {
            Some(store) => store.load(&session_key)?,
            None => None,
        };

        let mut builder = HseClient::builder()
            .base_url(&resolved.server)
            .timeout(resolved.timeout)
            .max_retries(resolved.max_retries)
            .retry_backoff(resolved.retry_backoff);

        if let Some(stored) = stored {
            builder = builder.tokens(AuthTokens::new(stored.access_token, stored.refresh_token));
        } else if let Some(token) = &resolved.token {
            builder = builder.access_token(token);
        }

        if let Some(store) = store.clone() {
            let key = session_key.clone();
            builder = builder.on_token_refresh(move |tokens| {
                let stored = StoredTokens::new(&tokens.access_token, &tokens.refresh_token);
                if let Err(e) = store.save(&key, &stored) {
                    warn!(error = %e, "Failed to save session");
                }
            });
        }

        let client = builder
            .build()
            .with_context(|| format!("connecting to {}", resolved.server))?;

        Ok(Self {
            client,
            resolved,
            session_key,
            store,
        })
    }

    /// Whether a session is stored for this connection.
    pub fn has_stored_session(&self) -> Result<bool> {
        Ok(match &self.store {
            Some(store) => store.load(&self.session_key)?.is_some(),
            None => false,
        })
    }

    /// Drop the stored session for this connection.
    pub fn forget_session(&self) -> Result<bool> {
        match &self.store {
            Some(store) => Ok(store.remove(&self.session_key)?),
            None => Ok(false),
        }
    }
}
