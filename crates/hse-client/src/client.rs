//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::{
    AuditsApi, AuthApi, ContractorsApi, IncidentsApi, StationsApi, UsageApi, UsersApi,
    WorkPermitsApi,
};
use crate::dispatch::{Dispatcher, RequestDescriptor};
use crate::error::{Error, Result};
use crate::session::{AuthTokens, SessionState, TokenObserver};
use crate::transport::{RetryPolicy, Transport};
use crate::types::{decode, decode_list};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base URL of a local development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// HSE API client.
///
/// Cloning is cheap; clones share the connection pool and the session.
///
/// # Example
///
/// ```no_run
/// use hse_client::HseClient;
///
/// # async fn example() -> hse_client::Result<()> {
/// let client = HseClient::builder()
///     .base_url("http://localhost:3001")
///     .build()?;
///
/// client.auth().login("admin@example.com", "password123").await?;
/// let stations = client.stations().list(None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HseClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    dispatcher: Dispatcher,
    session: SessionState,
}

impl HseClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings pointing to localhost.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_BASE_URL).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        self.inner.dispatcher.base_url()
    }

    /// The session credentials held by this client.
    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    /// Replace the token pair and notify the observer.
    pub fn set_credentials(&self, tokens: AuthTokens) {
        self.inner.session.set_credentials(tokens);
    }

    /// Forget both tokens.
    pub fn clear_credentials(&self) {
        self.inner.session.clear_credentials();
    }

    /// The `Authorization` header value for the current access token.
    pub fn current_auth_header(&self) -> Option<String> {
        self.inner.session.current_auth_header()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the stations API.
    pub fn stations(&self) -> StationsApi {
        StationsApi::new(self.clone())
    }

    /// Access the audits API.
    pub fn audits(&self) -> AuditsApi {
        AuditsApi::new(self.clone())
    }

    /// Access the incidents API.
    pub fn incidents(&self) -> IncidentsApi {
        IncidentsApi::new(self.clone())
    }

    /// Access the contractors API.
    pub fn contractors(&self) -> ContractorsApi {
        ContractorsApi::new(self.clone())
    }

    /// Access the work permits API.
    pub fn work_permits(&self) -> WorkPermitsApi {
        WorkPermitsApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the usage API.
    pub fn usage(&self) -> UsageApi {
        UsageApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Perform one API call and return the parsed JSON body.
    ///
    /// An empty or 204 response yields `Value::Null`.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Value> {
        self.inner
            .dispatcher
            .execute(&self.inner.session, descriptor)
            .await
    }

    /// Run the refresh cycle now.
    pub(crate) async fn refresh(&self) -> Result<()> {
        self.inner.dispatcher.refresh(&self.inner.session).await
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.execute(RequestDescriptor::get(path)).await?)
    }

    /// Make a GET request for a list, with query parameters.
    pub(crate) async fn get_list<T, Q>(&self, path: &str, query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let descriptor = RequestDescriptor::get(path).query(query)?;
        decode_list(self.execute(descriptor).await?)
    }

    /// Make a GET request with query parameters, returning the raw body.
    pub(crate) async fn get_value<Q>(&self, path: &str, query: &Q) -> Result<Value>
    where
        Q: Serialize + ?Sized,
    {
        self.execute(RequestDescriptor::get(path).query(query)?)
            .await
    }

    /// Make a POST request, returning the raw body.
    pub(crate) async fn post_value<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.execute(RequestDescriptor::post(path).json(body)?)
            .await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode(self.post_value(path, body).await?)
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode(
            self.execute(RequestDescriptor::put(path).json(body)?)
                .await?,
        )
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(RequestDescriptor::delete(path)).await?;
        Ok(())
    }
}

impl fmt::Debug for HseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HseClient")
            .field("base_url", &self.base_url().as_str())
            .field("session", &self.inner.session)
            .finish()
    }
}

/// Builder for creating an HseClient.
pub struct ClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    tokens: Option<AuthTokens>,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: Option<String>,
    observer: Option<TokenObserver>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            access_token: None,
            tokens: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: None,
            observer: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Start with an access token and no refresh token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Start with a previously issued token pair. Takes precedence over
    /// [`access_token`](Self::access_token).
    pub fn tokens(mut self, tokens: AuthTokens) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many times transient failures are retried.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }

    /// Set the delay before the first transient retry (doubled each retry).
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry.backoff = backoff;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Register a callback run synchronously with every new token pair.
    pub fn on_token_refresh<F>(mut self, observer: F) -> Self
    where
        F: Fn(&AuthTokens) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HseClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::generic("base_url is required"))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)
            .map_err(|e| Error::generic(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("hse-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::generic(format!("Failed to build HTTP client: {}", e)))?;

        let session = match (self.tokens, self.access_token) {
            (Some(tokens), _) => SessionState::with_tokens(tokens, self.observer),
            (None, Some(token)) => SessionState::with_access_token(token, self.observer),
            (None, None) => SessionState::new(self.observer),
        };

        Ok(HseClient {
            inner: Arc::new(ClientInner {
                dispatcher: Dispatcher::new(
                    Transport::new(http, self.retry),
                    base_url,
                    self.timeout,
                ),
                session,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("tokens", &self.tokens)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("user_agent", &self.user_agent)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
