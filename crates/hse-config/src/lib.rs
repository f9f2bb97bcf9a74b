//! Configuration for HSE API clients.
//!
//! Client configuration (kubeconfig-style):
//! - Named connection contexts (server, auth, retry tuning)
//! - `current-context` for default selection
//! - Defaults applied to every context
//!
//! Sessions issued by the server are kept per context in a separate
//! credential store so the CLI can resume them between runs.

pub mod client;
pub mod credentials;
pub mod discovery;
pub mod error;

pub use client::{
    AuthConfig, ClientConfig, ClientDefaults, Context, DEFAULT_CONTEXT, DEFAULT_SERVER,
    ResolvedContext, client_config_path, load_client_config, load_client_config_from,
    save_client_config, save_client_config_to,
};
pub use credentials::{CredentialStore, StoredTokens};
pub use discovery::{config_dir, CONFIG_DIR_ENV};
pub use error::{ConfigError, Result};
