//! Request dispatch: one logical API call, end to end.
//!
//! A call that comes back 401 gets exactly one refresh-and-resend when its
//! descriptor allows it and a refresh token is held. The resend and the
//! refresh request itself are both sent with the retry flag off, so there is
//! no path back into another refresh.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Error, Result, classify};
use crate::session::{AuthTokens, SessionState};
use crate::transport::{RawResponse, Transport};

/// Path of the token refresh endpoint.
pub(crate) const REFRESH_PATH: &str = "/api/auth/refresh";

/// One API call: method, path, optional JSON body and query.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, e.g. `/api/stations`.
    pub path: String,
    /// JSON request body.
    pub body: Option<Value>,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Whether a 401 may trigger one refresh-and-resend.
    pub allow_unauthorized_retry: bool,
}

impl RequestDescriptor {
    /// A descriptor with no body or query; unauthorized retry allowed.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            allow_unauthorized_retry: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::generic(format!("Failed to serialize request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach query parameters from a serializable struct or map.
    ///
    /// `None`/null fields are skipped; arrays repeat the key.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        let value = serde_json::to_value(query)
            .map_err(|e| Error::generic(format!("Failed to serialize query: {}", e)))?;
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    push_query_value(&mut self.query, &key, value);
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(Error::generic(format!(
                "Query must serialize to an object, got {}",
                other
            ))),
        }
    }

    /// Disable the unauthorized retry for this descriptor.
    pub fn without_unauthorized_retry(mut self) -> Self {
        self.allow_unauthorized_retry = false;
        self
    }
}

fn push_query_value(pairs: &mut Vec<(String, String)>, key: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => pairs.push((key.to_string(), s)),
        Value::Array(items) => {
            for item in items {
                push_query_value(pairs, key, item);
            }
        }
        other => pairs.push((key.to_string(), other.to_string())),
    }
}

/// Sends descriptors over the transport on behalf of a session.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    transport: Transport,
    base_url: Url,
    timeout: Duration,
}

impl Dispatcher {
    pub(crate) fn new(transport: Transport, base_url: Url, timeout: Duration) -> Self {
        Self {
            transport,
            base_url,
            timeout,
        }
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::generic(format!("Invalid URL for path '{}': {}", path, e)))
    }

    /// Perform one logical call, including the unauthorized retry.
    #[instrument(skip(self, session, descriptor), fields(method = %descriptor.method, path = %descriptor.path))]
    pub(crate) async fn execute(
        &self,
        session: &SessionState,
        descriptor: RequestDescriptor,
    ) -> Result<Value> {
        let mut response = self.send(session, &descriptor).await?;

        if response.status == StatusCode::UNAUTHORIZED
            && descriptor.allow_unauthorized_retry
            && session.refresh_token().is_some()
        {
            debug!("Unauthorized, attempting session refresh");
            if let Err(e) = self.refresh(session).await {
                warn!(error = %e, "Session refresh failed, clearing credentials");
                session.clear_credentials();
                return Err(e.into_authentication());
            }

            let resend = descriptor.without_unauthorized_retry();
            response = self.send(session, &resend).await?;
        }

        finish(response)
    }

    /// Exchange the refresh token for a new pair and commit it.
    ///
    /// Failures are returned as-is; clearing the session is the caller's
    /// decision.
    pub(crate) async fn refresh(&self, session: &SessionState) -> Result<()> {
        let refresh_token = session
            .refresh_token()
            .ok_or_else(|| Error::auth("No refresh token available"))?;

        let descriptor = RequestDescriptor::post(REFRESH_PATH)
            .json(&json!({ "refreshToken": refresh_token }))?
            .without_unauthorized_retry();

        let response = self.send(session, &descriptor).await?;
        let body = finish(response)?;
        let tokens = tokens_from_response(&body)?;
        session.set_credentials(tokens);

        info!("Session refreshed");
        Ok(())
    }

    async fn send(
        &self,
        session: &SessionState,
        descriptor: &RequestDescriptor,
    ) -> Result<RawResponse> {
        let url = self.url(&descriptor.path)?;

        let mut request = self
            .transport
            .request(descriptor.method.clone(), url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json");

        if let Some(auth) = session.current_auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }
        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        self.transport.send(request).await
    }
}

/// Turn a final response into a JSON value or a typed error.
fn finish(response: RawResponse) -> Result<Value> {
    if !response.status.is_success() {
        return Err(classify(response.status, &response.body));
    }

    if response.status == StatusCode::NO_CONTENT || response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&response.body)
        .map_err(|e| Error::generic(format!("Failed to parse response: {}", e)))
}

/// Pull the `accessToken`/`refreshToken` pair out of an auth response.
pub(crate) fn tokens_from_response(body: &Value) -> Result<AuthTokens> {
    AuthTokens::deserialize(body).map_err(|e| {
        Error::generic(format!(
            "Malformed token response (expected accessToken and refreshToken): {}",
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
        station_id: Option<String>,
        status: Option<String>,
        limit: u32,
        tags: Vec<String>,
    }

    #[test]
    fn test_query_flattening() {
        let descriptor = RequestDescriptor::get("/api/audits")
            .query(&Filter {
                station_id: Some("s1".to_string()),
                status: None,
                limit: 10,
                tags: vec!["a".to_string(), "b".to_string()],
            })
            .unwrap();

        let mut pairs = descriptor.query.clone();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("stationId".to_string(), "s1".to_string()),
                ("tags".to_string(), "a".to_string()),
                ("tags".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_rejects_non_object() {
        let result = RequestDescriptor::get("/api/audits").query(&vec![1, 2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = RequestDescriptor::delete("/api/stations/1");
        assert_eq!(descriptor.method, Method::DELETE);
        assert!(descriptor.allow_unauthorized_retry);
        assert!(descriptor.body.is_none());
        assert!(!descriptor.without_unauthorized_retry().allow_unauthorized_retry);
    }

    #[test]
    fn test_finish_success_and_empty() {
        assert_eq!(
            finish(raw(200, r#"{"id":"1"}"#)).unwrap(),
            json!({"id": "1"})
        );
        assert_eq!(finish(raw(204, "")).unwrap(), Value::Null);
        assert_eq!(finish(raw(200, "  ")).unwrap(), Value::Null);
    }

    #[test]
    fn test_finish_rejects_non_success() {
        let err = finish(raw(302, "")).unwrap_err();
        assert_eq!(err.status_code(), Some(302));
        assert_eq!(err.kind(), crate::error::ErrorKind::Generic);
    }

    #[test]
    fn test_finish_bad_json() {
        let err = finish(raw(200, "not json")).unwrap_err();
        assert!(err.message().starts_with("Failed to parse response"));
    }

    #[test]
    fn test_tokens_from_response() {
        let tokens =
            tokens_from_response(&json!({"accessToken": "A", "refreshToken": "R", "user": {}}))
                .unwrap();
        assert_eq!(tokens, AuthTokens::new("A", "R"));

        assert!(tokens_from_response(&json!({"accessToken": "A"})).is_err());
        assert!(tokens_from_response(&Value::Null).is_err());
    }
}
