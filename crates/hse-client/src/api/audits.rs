//! Audits API.

use super::{DEFAULT_PAGE_LIMIT, record_path};
use crate::client::HseClient;
use crate::error::Result;
use crate::types::{Audit, CreateAuditRequest, Page, UpdateAuditRequest};

/// Query parameters for listing audits.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditsQuery {
    /// Filter by station.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    /// Filter by auditor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auditor_id: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Cursor from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Page size.
    pub limit: u32,
}

impl Default for ListAuditsQuery {
    fn default() -> Self {
        Self {
            station_id: None,
            auditor_id: None,
            status: None,
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Audits API client.
pub struct AuditsApi {
    client: HseClient,
}

impl AuditsApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List one page of audits.
    pub async fn list(&self, query: ListAuditsQuery) -> Result<Page<Audit>> {
        let body = self.client.get_value("/api/audits", &query).await?;
        Page::from_envelope(body, "audits")
    }

    /// Get an audit by ID.
    pub async fn get(&self, id: &str) -> Result<Audit> {
        self.client.get(&record_path("/api/audits", id)?).await
    }

    /// Schedule an audit.
    pub async fn create(&self, request: CreateAuditRequest) -> Result<Audit> {
        self.client.post("/api/audits", &request).await
    }

    /// Update an audit.
    pub async fn update(&self, id: &str, request: UpdateAuditRequest) -> Result<Audit> {
        self.client
            .put(&record_path("/api/audits", id)?, &request)
            .await
    }

    /// Delete an audit.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&record_path("/api/audits", id)?).await
    }
}
