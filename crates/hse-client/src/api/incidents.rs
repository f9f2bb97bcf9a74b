//! Incidents API.

use super::{DEFAULT_PAGE_LIMIT, record_path};
use crate::client::HseClient;
use crate::error::Result;
use crate::types::{CreateIncidentRequest, Incident, Page, UpdateIncidentRequest};

/// Query parameters for listing incidents.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIncidentsQuery {
    /// Filter by station.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    /// Filter by severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Cursor from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Page size.
    pub limit: u32,
}

impl Default for ListIncidentsQuery {
    fn default() -> Self {
        Self {
            station_id: None,
            severity: None,
            status: None,
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Incidents API client.
pub struct IncidentsApi {
    client: HseClient,
}

impl IncidentsApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List one page of incidents.
    pub async fn list(&self, query: ListIncidentsQuery) -> Result<Page<Incident>> {
        let body = self.client.get_value("/api/incidents", &query).await?;
        Page::from_envelope(body, "incidents")
    }

    /// Get an incident by ID.
    pub async fn get(&self, id: &str) -> Result<Incident> {
        self.client.get(&record_path("/api/incidents", id)?).await
    }

    /// Report an incident.
    pub async fn create(&self, request: CreateIncidentRequest) -> Result<Incident> {
        self.client.post("/api/incidents", &request).await
    }

    /// Update an incident.
    pub async fn update(&self, id: &str, request: UpdateIncidentRequest) -> Result<Incident> {
        self.client
            .put(&record_path("/api/incidents", id)?, &request)
            .await
    }

    /// Delete an incident.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&record_path("/api/incidents", id)?).await
    }
}
