//! Request and response types for the HSE API.
//!
//! These types mirror the server's camelCase JSON. Records keep any fields
//! this crate does not model in `extra`, so nothing the server sends is lost.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::session::AuthTokens;

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /api/auth/signup-with-org`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from login, signup, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The issued token pair.
    #[serde(flatten)]
    pub tokens: AuthTokens,
    /// The authenticated user, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// The user's organization, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users & Organizations
// ─────────────────────────────────────────────────────────────────────────────

/// A user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub is_email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tenant organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub subscription_plan: String,
    pub subscription_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Stations
// ─────────────────────────────────────────────────────────────────────────────

/// A fuel station or site under HSE supervision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_frequency: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            id: String::new(),
            organization_id: String::new(),
            name: String::new(),
            brand: None,
            region: None,
            address: None,
            risk_category: None,
            audit_frequency: None,
            is_active: true,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

/// Request to create a station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_frequency: Option<String>,
}

/// Request to update a station. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Audits
// ─────────────────────────────────────────────────────────────────────────────

/// A scheduled or completed station audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub organization_id: String,
    pub station_id: String,
    pub auditor_id: String,
    pub audit_number: String,
    pub scheduled_date: String,
    pub status: String,
    pub form_id: String,
    pub findings: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<Station>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auditor: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to schedule an audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditRequest {
    pub station_id: String,
    pub auditor_id: String,
    pub scheduled_date: String,
    pub form_id: String,
}

/// Request to update an audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuditRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Incidents
// ─────────────────────────────────────────────────────────────────────────────

/// A reported safety incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub organization_id: String,
    pub station_id: String,
    pub reporter_id: String,
    pub incident_type: String,
    pub severity: String,
    pub description: String,
    pub status: String,
    pub reported_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<Station>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to report an incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    pub station_id: String,
    pub incident_type: String,
    pub severity: String,
    pub description: String,
}

/// Request to update an incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Contractors & Work Permits
// ─────────────────────────────────────────────────────────────────────────────

/// An external contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contractor {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Contractor {
    fn default() -> Self {
        Self {
            id: String::new(),
            organization_id: String::new(),
            name: String::new(),
            license_number: None,
            specialization: None,
            contact_person: None,
            email: None,
            status: "Active".to_string(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

/// A permit to perform hazardous work at a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkPermit {
    pub id: String,
    pub organization_id: String,
    pub station_id: String,
    pub requested_by: String,
    pub permit_type: String,
    pub description: String,
    pub status: String,
    pub valid_from: String,
    pub valid_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Cursor information returned alongside paged lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a cursor-paged list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: DeserializeOwned> Page<T> {
    /// Unwrap an `{<key>: [...], pagination: {...}}` envelope.
    ///
    /// A missing list or pagination object yields an empty one.
    pub(crate) fn from_envelope(body: Value, key: &str) -> Result<Self> {
        let mut envelope = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::generic(format!(
                    "Expected a '{}' envelope object, got {}",
                    key, other
                )));
            }
        };

        let data = match envelope.remove(key) {
            Some(Value::Null) | None => Vec::new(),
            Some(items) => decode(items)?,
        };
        let pagination = match envelope.remove("pagination") {
            Some(Value::Null) | None => Pagination::default(),
            Some(p) => decode(p)?,
        };

        Ok(Self { data, pagination })
    }
}

/// Decode a response body into a typed value.
pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| Error::generic(format!("Failed to decode response: {}", e)))
}

/// Decode a list response; an empty body is an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    match body {
        Value::Null => Ok(Vec::new()),
        other => decode(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_roundtrip_keeps_unknown_fields() {
        let body = json!({
            "id": "st-1",
            "organizationId": "org-1",
            "name": "Alpha Station",
            "riskCategory": "High",
            "isActive": false,
            "managerPhone": "555-0100"
        });
        let station: Station = serde_json::from_value(body).unwrap();
        assert_eq!(station.risk_category.as_deref(), Some("High"));
        assert!(!station.is_active);
        assert_eq!(station.extra.get("managerPhone"), Some(&json!("555-0100")));

        let out = serde_json::to_value(&station).unwrap();
        assert_eq!(out["managerPhone"], "555-0100");
        assert_eq!(out["organizationId"], "org-1");
    }

    #[test]
    fn test_station_defaults_active() {
        let station: Station = serde_json::from_value(json!({"id": "st-2"})).unwrap();
        assert!(station.is_active);
    }

    #[test]
    fn test_create_request_skips_unset_fields() {
        let request = CreateStationRequest {
            name: "Alpha".to_string(),
            risk_category: Some("High".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"name": "Alpha", "riskCategory": "High"}));
    }

    #[test]
    fn test_auth_response_flattens_tokens() {
        let response: AuthResponse = serde_json::from_value(json!({
            "accessToken": "A",
            "refreshToken": "R",
            "user": {"id": "u1", "name": "Admin", "email": "admin@example.com"}
        }))
        .unwrap();
        assert_eq!(response.tokens, AuthTokens::new("A", "R"));
        assert_eq!(response.user.unwrap().name, "Admin");
    }

    #[test]
    fn test_page_from_envelope() {
        let page: Page<Audit> = Page::from_envelope(
            json!({
                "audits": [{"id": "a1", "status": "Scheduled"}],
                "pagination": {"hasMore": true, "nextCursor": "c2"}
            }),
            "audits",
        )
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.pagination.has_more);
        assert_eq!(page.pagination.next_cursor.as_deref(), Some("c2"));
    }

    #[test]
    fn test_page_from_envelope_missing_fields() {
        let page: Page<Incident> = Page::from_envelope(json!({}), "incidents").unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination, Pagination::default());

        let page: Page<Incident> = Page::from_envelope(Value::Null, "incidents").unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_page_from_envelope_rejects_array() {
        let result: Result<Page<Audit>> = Page::from_envelope(json!([]), "audits");
        assert!(result.is_err());
    }
}
