//! Contractors API.

use crate::client::HseClient;
use crate::error::Result;
use crate::types::Contractor;

/// Contractors API client.
pub struct ContractorsApi {
    client: HseClient,
}

impl ContractorsApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List all contractors.
    pub async fn list(&self) -> Result<Vec<Contractor>> {
        self.client.get_list("/api/contractors", &()).await
    }
}
