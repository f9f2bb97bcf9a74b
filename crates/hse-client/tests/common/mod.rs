//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hse_client::{AuthTokens, ClientBuilder, HseClient};
use wiremock::MockServer;

/// Builder pointed at the mock server, with retries that do not sleep.
pub fn builder_for(server: &MockServer) -> ClientBuilder {
    HseClient::builder()
        .base_url(server.uri())
        .retry_backoff(Duration::ZERO)
}

/// Client holding a full token pair.
pub fn logged_in_client(server: &MockServer, access: &str, refresh: &str) -> HseClient {
    builder_for(server)
        .tokens(AuthTokens::new(access, refresh))
        .build()
        .unwrap()
}

/// Records every pair passed to the token observer.
#[derive(Clone, Default)]
pub struct TokenLog(Arc<Mutex<Vec<AuthTokens>>>);

impl TokenLog {
    pub fn attach(&self, builder: ClientBuilder) -> ClientBuilder {
        let log = self.0.clone();
        builder.on_token_refresh(move |tokens| log.lock().unwrap().push(tokens.clone()))
    }

    pub fn seen(&self) -> Vec<AuthTokens> {
        self.0.lock().unwrap().clone()
    }
}
