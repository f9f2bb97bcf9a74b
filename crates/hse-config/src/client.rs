//! Client configuration for connecting to HSE servers.
//!
//! Implements a kubeconfig-style configuration with named contexts:
//!
//! ```yaml
//! api-version: v1
//! kind: ClientConfig
//!
//! current-context: local
//!
//! contexts:
//!   - name: local
//!     server: http://localhost:3001
//!   - name: prod
//!     server: https://hse.example.com
//!     auth:
//!       type: bearer
//!       token-env: HSE_TOKEN
//!     max-retries: 5
//!
//! defaults:
//!   timeout: 30
//!   max-retries: 3
//!   retry-backoff-ms: 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// API version for the client config file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for client config files.
pub const KIND: &str = "ClientConfig";

/// Server used when no context is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:3001";

/// Name given to the implicit context when none is configured.
pub const DEFAULT_CONTEXT: &str = "default";

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Root client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API version (always "v1" currently).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Config kind (always "ClientConfig").
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Name of the current/default context.
    #[serde(default)]
    pub current_context: Option<String>,

    /// Named connection contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Default settings applied to all contexts.
    #[serde(default)]
    pub defaults: ClientDefaults,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ClientConfig {
    /// Create an empty client config.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Get the current context, if set and valid.
    pub fn current(&self) -> Option<&Context> {
        self.current_context
            .as_ref()
            .and_then(|name| self.get_context(name))
    }

    /// Get a context by name.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a mutable context by name.
    pub fn get_context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Remove a context by name, unsetting it as current if needed.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let index = self.contexts.iter().position(|c| c.name == name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(index))
    }

    /// Add or update a context.
    pub fn set_context(&mut self, context: Context) {
        if let Some(existing) = self.contexts.iter_mut().find(|c| c.name == context.name) {
            *existing = context;
        } else {
            self.contexts.push(context);
        }
    }

    /// Set the current context by name.
    ///
    /// Returns an error if the context doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.get_context(name).is_some() {
            self.current_context = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ContextNotFound(name.to_string()))
        }
    }

    /// Resolve a context into concrete connection settings.
    ///
    /// With `name` unset the current context is used. If neither a name nor a
    /// current context is configured, an implicit context pointing at
    /// [`DEFAULT_SERVER`] is returned.
    pub fn resolve(&self, name: Option<&str>) -> Result<ResolvedContext> {
        let name = name.or(self.current_context.as_deref());

        let Some(name) = name else {
            debug!("No context configured, using {}", DEFAULT_SERVER);
            return Ok(ResolvedContext::with_defaults(
                DEFAULT_CONTEXT,
                DEFAULT_SERVER,
                &self.defaults,
            ));
        };

        let context = self
            .get_context(name)
            .ok_or_else(|| ConfigError::ContextNotFound(name.to_string()))?;

        let token = match &context.auth {
            Some(auth) => match auth.resolve()? {
                Some(token) => Some(token),
                None if matches!(auth, AuthConfig::Bearer { .. }) => {
                    return Err(ConfigError::MissingToken(context.name.clone()));
                }
                None => None,
            },
            None => None,
        };

        Ok(ResolvedContext {
            name: context.name.clone(),
            server: context.server.clone(),
            token,
            timeout: Duration::from_secs(context.timeout.unwrap_or(self.defaults.timeout)),
            max_retries: context.max_retries.unwrap_or(self.defaults.max_retries),
            retry_backoff: Duration::from_millis(
                context
                    .retry_backoff_ms
                    .unwrap_or(self.defaults.retry_backoff_ms),
            ),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named connection context (server + auth bundle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// Server URL (e.g., "http://localhost:3001").
    pub server: String,

    /// Authentication configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Request timeout override (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Transient retry count override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Base retry delay override (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_backoff_ms: Option<u64>,
}

impl Context {
    /// Create a new context with just a name and server URL.
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            auth: None,
            timeout: None,
            max_retries: None,
            retry_backoff_ms: None,
        }
    }

    /// Set the auth configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the retry count.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// A context with defaults applied and its static token loaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    /// Context name; also the key in the credential store.
    pub name: String,
    /// Server URL.
    pub server: String,
    /// Static bearer token from `auth`, if configured.
    pub token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Transient retry count.
    pub max_retries: u32,
    /// Base retry delay.
    pub retry_backoff: Duration,
}

impl ResolvedContext {
    /// An ad-hoc context for a server given on the command line.
    pub fn with_defaults(
        name: impl Into<String>,
        server: impl Into<String>,
        defaults: &ClientDefaults,
    ) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            token: None,
            timeout: Duration::from_secs(defaults.timeout),
            max_retries: defaults.max_retries,
            retry_backoff: Duration::from_millis(defaults.retry_backoff_ms),
        }
    }
}

impl std::fmt::Debug for ResolvedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedContext")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication configuration for a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// No static credential; log in interactively.
    None,

    /// Static bearer token, used as the initial access token.
    #[serde(rename_all = "kebab-case")]
    Bearer {
        /// Path to file containing the bearer token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_file: Option<PathBuf>,
        /// Environment variable containing the token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },
}

impl AuthConfig {
    /// Bearer auth reading the token from a file.
    pub fn bearer_file(path: impl Into<PathBuf>) -> Self {
        Self::Bearer {
            token_file: Some(path.into()),
            token_env: None,
        }
    }

    /// Bearer auth reading the token from an environment variable.
    pub fn bearer_env(var: impl Into<String>) -> Self {
        Self::Bearer {
            token_file: None,
            token_env: Some(var.into()),
        }
    }

    /// Resolve the actual credential value.
    ///
    /// The file wins over the environment variable when both are set.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            AuthConfig::None => Ok(None),

            AuthConfig::Bearer {
                token_file,
                token_env,
            } => {
                if let Some(path) = token_file {
                    let expanded = expand_path(path);
                    if expanded.exists() {
                        let token = std::fs::read_to_string(&expanded)
                            .map_err(|e| ConfigError::ReadFile {
                                path: expanded.display().to_string(),
                                source: e,
                            })?
                            .trim()
                            .to_string();
                        if !token.is_empty() {
                            return Ok(Some(token));
                        }
                    }
                }
                if let Some(var) = token_env
                    && let Ok(token) = std::env::var(var)
                    && !token.is_empty()
                {
                    return Ok(Some(token));
                }
                Ok(None)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default settings applied to all contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Request timeout in seconds.
    pub timeout: u64,

    /// Transient retry count.
    pub max_retries: u32,

    /// Base retry delay in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    crate::config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        debug!(path = %path.display(), "No client config, using defaults");
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save the client configuration.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let path = client_config_path()
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))?;
    save_client_config_to(config, &path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/"))
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
