//! Session credentials held by one client instance.
//!
//! The access and refresh tokens only ever change together: a successful
//! login, signup, or refresh replaces the pair, and logout or a failed
//! refresh clears it. The one exception is a client built with just an
//! access token, which has nothing to refresh with.
//!
//! Concurrent calls on one client are not coordinated. Two calls that both
//! see a 401 will each run their own refresh cycle; callers that share a
//! client across tasks should refresh proactively or serialize on their own.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Access/refresh token pair returned by login, signup, and refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Bearer credential sent on every request.
    pub access_token: String,
    /// Credential exchanged for a new pair at `/api/auth/refresh`.
    pub refresh_token: String,
}

impl AuthTokens {
    /// Create a token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Callback invoked with every new token pair.
pub type TokenObserver = Arc<dyn Fn(&AuthTokens) + Send + Sync>;

#[derive(Clone, Default)]
enum Credentials {
    #[default]
    Anonymous,
    /// Configured up front; cannot be refreshed.
    AccessOnly(String),
    Pair(AuthTokens),
}

/// Owned credential state plus the optional refresh observer.
#[derive(Default)]
pub struct SessionState {
    credentials: RwLock<Credentials>,
    observer: Option<TokenObserver>,
}

impl SessionState {
    /// A session with no credentials.
    pub fn new(observer: Option<TokenObserver>) -> Self {
        Self {
            credentials: RwLock::new(Credentials::Anonymous),
            observer,
        }
    }

    /// A session seeded with a bare access token.
    pub(crate) fn with_access_token(token: String, observer: Option<TokenObserver>) -> Self {
        Self {
            credentials: RwLock::new(Credentials::AccessOnly(token)),
            observer,
        }
    }

    /// A session restored from a previously issued pair.
    ///
    /// The observer is not notified: nothing new was issued.
    pub(crate) fn with_tokens(tokens: AuthTokens, observer: Option<TokenObserver>) -> Self {
        Self {
            credentials: RwLock::new(Credentials::Pair(tokens)),
            observer,
        }
    }

    /// Replace both tokens and notify the observer before returning.
    pub fn set_credentials(&self, tokens: AuthTokens) {
        *self.credentials.write() = Credentials::Pair(tokens.clone());

        // Lock is released so the observer may read the session.
        if let Some(observer) = &self.observer {
            observer(&tokens);
        }
    }

    /// Drop both tokens. Idempotent.
    pub fn clear_credentials(&self) {
        *self.credentials.write() = Credentials::Anonymous;
    }

    /// `Bearer <access_token>` when an access token is held.
    pub fn current_auth_header(&self) -> Option<String> {
        self.access_token().map(|token| format!("Bearer {}", token))
    }

    /// The current access token.
    pub fn access_token(&self) -> Option<String> {
        match &*self.credentials.read() {
            Credentials::Anonymous => None,
            Credentials::AccessOnly(token) => Some(token.clone()),
            Credentials::Pair(tokens) => Some(tokens.access_token.clone()),
        }
    }

    /// The current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        match &*self.credentials.read() {
            Credentials::Pair(tokens) => Some(tokens.refresh_token.clone()),
            _ => None,
        }
    }

    /// The full pair, if one is held.
    pub fn tokens(&self) -> Option<AuthTokens> {
        match &*self.credentials.read() {
            Credentials::Pair(tokens) => Some(tokens.clone()),
            _ => None,
        }
    }

    /// Whether any access credential is held.
    pub fn is_authenticated(&self) -> bool {
        !matches!(&*self.credentials.read(), Credentials::Anonymous)
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.credentials.read() {
            Credentials::Anonymous => "anonymous",
            Credentials::AccessOnly(_) => "access-only",
            Credentials::Pair(_) => "pair",
        };
        f.debug_struct("SessionState")
            .field("credentials", &state)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
