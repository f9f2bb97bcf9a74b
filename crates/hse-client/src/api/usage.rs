//! Usage API.

use serde_json::Value;

use crate::client::HseClient;
use crate::error::Result;

/// Usage API client.
pub struct UsageApi {
    client: HseClient,
}

impl UsageApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// Current billing-period usage for the organization.
    ///
    /// The report's shape depends on the subscription plan, so it is
    /// returned as raw JSON.
    pub async fn current(&self) -> Result<Value> {
        self.client.get_value("/api/usage/current", &()).await
    }
}
