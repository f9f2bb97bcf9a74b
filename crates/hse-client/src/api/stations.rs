//! Stations API.

use super::record_path;
use crate::client::HseClient;
use crate::error::Result;
use crate::types::{CreateStationRequest, Station, UpdateStationRequest};

#[derive(Debug, Default, serde::Serialize)]
struct ListStationsQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
}

/// Stations API client.
pub struct StationsApi {
    client: HseClient,
}

impl StationsApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List stations, optionally filtered by region.
    pub async fn list(&self, region: Option<&str>) -> Result<Vec<Station>> {
        self.client
            .get_list("/api/stations", &ListStationsQuery { region })
            .await
    }

    /// Get a station by ID.
    pub async fn get(&self, id: &str) -> Result<Station> {
        self.client.get(&record_path("/api/stations", id)?).await
    }

    /// Create a station.
    pub async fn create(&self, request: CreateStationRequest) -> Result<Station> {
        self.client.post("/api/stations", &request).await
    }

    /// Update a station.
    pub async fn update(&self, id: &str, request: UpdateStationRequest) -> Result<Station> {
        self.client
            .put(&record_path("/api/stations", id)?, &request)
            .await
    }

    /// Delete a station.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&record_path("/api/stations", id)?).await
    }
}
