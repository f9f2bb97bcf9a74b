//! Work permits API.

use crate::client::HseClient;
use crate::error::Result;
use crate::types::WorkPermit;

#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ListWorkPermitsQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    station_id: Option<&'a str>,
}

/// Work permits API client.
pub struct WorkPermitsApi {
    client: HseClient,
}

impl WorkPermitsApi {
    pub(crate) fn new(client: HseClient) -> Self {
        Self { client }
    }

    /// List work permits, optionally for one station.
    pub async fn list(&self, station_id: Option<&str>) -> Result<Vec<WorkPermit>> {
        self.client
            .get_list("/api/work-permits", &ListWorkPermitsQuery { station_id })
            .await
    }
}
