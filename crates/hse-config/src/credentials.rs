//! Stored sessions, one token pair per context.
//!
//! The store is a single JSON file next to `client.yaml`:
//!
//! ```json
//! {
//!   "contexts": {
//!     "local": { "accessToken": "...", "refreshToken": "..." }
//!   }
//! }
//! ```
//!
//! Every write replaces the whole file. On Unix it is created with mode
//! `0600`.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, Result};

/// Default credential store filename.
const CREDENTIALS_FILE: &str = "credentials.json";

/// A token pair as persisted on disk.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl StoredTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    contexts: BTreeMap<String, StoredTokens>,
}

/// File-backed store of token pairs keyed by context name.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the config directory, if one can be determined.
    pub fn default_location() -> Option<Self> {
        crate::config_dir().map(|d| Self::new(d.join(CREDENTIALS_FILE)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored pair for a context.
    pub fn load(&self, context: &str) -> Result<Option<StoredTokens>> {
        Ok(self.read()?.contexts.remove(context))
    }

    /// Store (or replace) the pair for a context.
    pub fn save(&self, context: &str, tokens: &StoredTokens) -> Result<()> {
        let mut file = self.read()?;
        file.contexts.insert(context.to_string(), tokens.clone());
        self.write(&file)?;
        debug!(context, path = %self.path.display(), "Saved session");
        Ok(())
    }

    /// Forget the pair for a context. Returns whether one was stored.
    ///
    /// The file is removed once no context has a stored pair.
    pub fn remove(&self, context: &str) -> Result<bool> {
        let mut file = self.read()?;
        let removed = file.contexts.remove(context).is_some();
        if file.contexts.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| ConfigError::WriteFile {
                    path: self.path.display().to_string(),
                    source: e,
                })?;
            }
        } else if removed {
            self.write(&file)?;
        }
        Ok(removed)
    }

    fn read(&self) -> Result<CredentialFile> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadFile {
            path: self.path.display().to_string(),
            source: e,
        })?;
        if contents.trim().is_empty() {
            return Ok(CredentialFile::default());
        }
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseCredentials {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, file: &CredentialFile) -> Result<()> {
        let write_err = |path: &Path, source: std::io::Error| ConfigError::WriteFile {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
        }

        let contents = serde_json::to_string_pretty(file)
            .map_err(|e| ConfigError::Other(format!("failed to serialize credentials: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        // A leftover temp file may carry wider permissions; start fresh.
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_err(&tmp, e)),
        }

        let mut out = create_private(&tmp).map_err(|e| write_err(&tmp, e))?;
        out.write_all(contents.as_bytes())
            .and_then(|()| out.sync_all())
            .map_err(|e| write_err(&tmp, e))?;
        drop(out);

        std::fs::rename(&tmp, &self.path).map_err(|e| write_err(&self.path, e))?;
        Ok(())
    }
}

/// Create a new file readable only by its owner.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
