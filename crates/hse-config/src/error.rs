//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or saving client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(String),

    /// The credential store is not valid JSON.
    #[error("failed to parse credential store '{path}': {message}")]
    ParseCredentials { path: String, message: String },

    /// Context not found.
    #[error("context '{0}' not found")]
    ContextNotFound(String),

    /// A context names an auth source that yields nothing.
    #[error("no bearer token found for context '{0}' (check token-file / token-env)")]
    MissingToken(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}
