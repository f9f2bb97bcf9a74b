//! HTTP transport with retry on transient failures.
//!
//! Retries connection-level failures and the statuses in
//! [`RETRY_STATUSES`] with exponential backoff. This sits beneath the
//! unauthorized-retry handling in the dispatcher and never looks at 401s.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Statuses retried by the transport.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Retry settings for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(8);
        self.backoff.saturating_mul(1u32 << shift)
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Pooled HTTP client plus retry policy.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    /// Start a request on the pooled client.
    pub(crate) fn request(&self, method: Method, url: reqwest::Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request, retrying transient failures, and read the body.
    ///
    /// When retries for a retryable status run out, the last response is
    /// returned so the caller can classify it.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<RawResponse> {
        let mut retry = 0u32;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| Error::generic("Request body cannot be cloned for retry"))?
                .build()
                .map_err(|e| Error::transport(&e))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = retry + 1, %method, %url, "sending HTTP request");

            match self.http.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = retry + 1, %method, %url, %status, "received HTTP response");

                    if is_retryable_status(status) && retry < self.policy.max_retries {
                        retry += 1;
                        let delay =
                            retry_after(&response).unwrap_or_else(|| self.policy.delay(retry));
                        warn!(
                            %method,
                            %url,
                            %status,
                            retry,
                            max_retries = self.policy.max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            "Retryable status, retrying"
                        );
                        sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.map_err(|e| Error::transport(&e))?;
                    return Ok(RawResponse { status, body });
                }
                Err(err) => {
                    if should_retry_error(&err) && retry < self.policy.max_retries {
                        retry += 1;
                        let delay = self.policy.delay(retry);
                        warn!(
                            %method,
                            %url,
                            error = %err,
                            retry,
                            max_retries = self.policy.max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            "Request failed, retrying"
                        );
                        sleep(delay).await;
                        continue;
                    }

                    debug!(%method, %url, error = %err, "HTTP request failed");
                    return Err(Error::transport(&err));
                }
            }
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

/// Server-requested wait for 429/503, in whole or fractional seconds.
fn retry_after(response: &Response) -> Option<Duration> {
    if !matches!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    ) {
        return None;
    }
    let value = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    parse_retry_after(value)
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())))
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::ErrorKind;

    fn transport(max_retries: u32) -> Transport {
        Transport::new(
            reqwest::Client::new(),
            RetryPolicy {
                max_retries,
                backoff: Duration::from_millis(5),
            },
        )
    }

    fn get(transport: &Transport, url: &str) -> RequestBuilder {
        transport.request(Method::GET, reqwest::Url::parse(url).unwrap())
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 5,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("3600"), Some(MAX_RETRY_AFTER));
        assert_eq!(parse_retry_after("1e20"), Some(MAX_RETRY_AFTER));
        assert_eq!(parse_retry_after("inf"), None);
        assert_eq!(parse_retry_after("NaN"), None);
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(3);
        let response = transport
            .send(get(&transport, &server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport(3);
        let response = transport
            .send(get(&transport, &server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_response_when_retries_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport(2);
        let response = transport
            .send(get(&transport, &server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.body, "slow down");
    }

    #[tokio::test]
    async fn waits_for_retry_after_before_retrying() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(429).insert_header("Retry-After", "0.3")
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let transport = transport(1);
        let started = std::time::Instant::now();
        let response = transport
            .send(get(&transport, &server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        for status in [400, 401, 404] {
            server.reset().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .expect(1)
                .mount(&server)
                .await;

            let transport = transport(3);
            let response = transport
                .send(get(&transport, &server.uri()))
                .await
                .unwrap();
            assert_eq!(response.status.as_u16(), status);
            server.verify().await;
        }
    }

    #[tokio::test]
    async fn network_failure_becomes_generic_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = transport(1);
        let err = transport
            .send(get(&transport, &format!("http://{}", addr)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err.status_code().is_none());
        assert!(err.message().starts_with("Request failed"));
    }
}
