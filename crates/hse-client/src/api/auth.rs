//! Auth API.

use serde_json::json;
use tracing::info;

use crate::client::HseClient;
use crate::error::Result;
use crate::types::{AuthResponse, LoginRequest, SignupRequest, decode};

/// Auth API client.
///
/// Login and signup commit the returned token pair to the client's session.
pub struct AuthApi {
    client: HseClient,
}

impl AuthApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// Create an organization and its first user.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        organization_name: &str,
    ) -> Result<AuthResponse> {
        let request = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            organization_name: organization_name.to_string(),
        };
        let response = self
            .authenticate("/api/auth/signup-with-org", &request)
            .await?;
        info!("Signed up");
        Ok(response)
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.authenticate("/api/auth/login", &request).await?;
        info!("Logged in");
        Ok(response)
    }

    /// Revoke the refresh token server-side, then forget the session.
    ///
    /// Without a refresh token there is nothing to revoke and only the local
    /// session is cleared. If the server call fails the session is kept.
    pub async fn logout(&self) -> Result<()> {
        if let Some(refresh_token) = self.client.session().refresh_token() {
            self.client
                .post_value("/api/auth/logout", &json!({ "refreshToken": refresh_token }))
                .await?;
        }
        self.client.clear_credentials();
        info!("Logged out");
        Ok(())
    }

    /// Exchange the refresh token for a new pair now.
    ///
    /// Fails with an authentication error, without a request, when no
    /// refresh token is held. The session is left untouched on failure.
    pub async fn refresh(&self) -> Result<()> {
        self.client.refresh().await
    }

    async fn authenticate<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse> {
        let body = self.client.post_value(path, body).await?;
        let response: AuthResponse = decode(body)?;
        self.client.set_credentials(response.tokens.clone());
        Ok(response)
    }
}
