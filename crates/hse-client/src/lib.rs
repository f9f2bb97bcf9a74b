//! HTTP client SDK for the HSE (health, safety, environment) management API.
//!
//! This crate provides a typed client for the HSE server: authentication
//! with automatic session refresh, CRUD for stations, audits and incidents,
//! and read access to contractors, work permits, users and usage.
//!
//! # Example
//!
//! ```no_run
//! use hse_client::{HseClient, ListAuditsQuery, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = HseClient::builder()
//!     .base_url("http://localhost:3001")
//!     .max_retries(3)
//!     .on_token_refresh(|_tokens| println!("tokens refreshed"))
//!     .build()?;
//!
//! let login = client.auth().login("admin@example.com", "password123").await?;
//! if let Some(user) = &login.user {
//!     println!("Logged in as {}", user.name);
//! }
//!
//! let stations = client.stations().list(None).await?;
//! if let Some(station) = stations.first() {
//!     let page = client
//!         .audits()
//!         .list(ListAuditsQuery {
//!             station_id: Some(station.id.clone()),
//!             limit: 10,
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("{} audits for {}", page.data.len(), station.name);
//! }
//!
//! client.auth().logout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every failure is an [`Error`] of one [`ErrorKind`]: authentication,
//! validation (400), not found (404), rate limit (429), server (5xx), or
//! generic. A 401 on an authenticated call triggers one refresh of the
//! session and one resend; if the refresh fails, the session is cleared and
//! an authentication error is returned.

pub mod api;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_BASE_URL, HseClient};
pub use dispatch::RequestDescriptor;
pub use error::{Error, ErrorKind, Failure, Result, classify};
pub use reqwest::StatusCode;
pub use session::{AuthTokens, SessionState, TokenObserver};
pub use transport::RetryPolicy;
pub use types::*;

// Re-export API types that are commonly used with query methods
pub use api::{ListAuditsQuery, ListIncidentsQuery};
