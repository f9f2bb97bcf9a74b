//! Users API.

use crate::client::HseClient;
use crate::error::Result;
use crate::types::User;

/// Users API client.
pub struct UsersApi {
    client: HseClient,
}

impl UsersApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List users in the caller's organization.
    pub async fn list(&self) -> Result<Vec<User>> {
        self.client.get_list("/api/users", &()).await
    }
}
