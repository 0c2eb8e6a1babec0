//! HTTP client for the storefront API.
//!
//! Thin wrapper over `reqwest` that replays the caller's `X-Session-Id` on
//! every request. Non-2xx responses are returned as [`ClientError::Status`]
//! so callers can tell a rejected request from a transport failure.

use std::time::Duration;

use cartwheel_core::{Order, PricedCart, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The HTTP header carrying the session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by [`ShopClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{endpoint} returned {status}")]
    Status { endpoint: &'static str, status: u16 },
}

/// A product as listed by `GET /catalog`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogBody {
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize)]
struct CartLine<'a> {
    item_id: &'a str,
    qty: u32,
}

/// Result of `GET /catalog`: the products and the session the service assigned.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub session_id: Option<SessionId>,
    pub products: Vec<CatalogEntry>,
}

/// Client for one storefront instance.
#[derive(Clone, Debug)]
pub struct ShopClient {
    http: reqwest::Client,
    base_url: String,
}

impl ShopClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /healthz`. Any transport error counts as unhealthy.
    pub async fn health(&self) -> bool {
        self.http
            .get(self.url("/healthz"))
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }

    /// `GET /catalog` without a session, returning the session id the
    /// service minted for this request.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn catalog(&self) -> Result<CatalogPage, ClientError> {
        let response = self.http.get(self.url("/catalog")).send().await?;
        let response = check_status("/catalog", response)?;

        let session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(SessionId::from);
        let body: CatalogBody = response.json().await?;

        Ok(CatalogPage {
            session_id,
            products: body.catalog,
        })
    }

    /// `POST /cart/add`, returning the priced cart after the add.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn add(
        &self,
        session_id: &SessionId,
        item_id: &str,
        qty: u32,
    ) -> Result<PricedCart, ClientError> {
        let response = self
            .http
            .post(self.url("/cart/add"))
            .header(SESSION_ID_HEADER, session_id.as_str())
            .json(&CartLine { item_id, qty })
            .send()
            .await?;
        Ok(check_status("/cart/add", response)?.json().await?)
    }

    /// `GET /cart`.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status.
    pub async fn view_cart(&self, session_id: &SessionId) -> Result<PricedCart, ClientError> {
        let response = self
            .http
            .get(self.url("/cart"))
            .header(SESSION_ID_HEADER, session_id.as_str())
            .send()
            .await?;
        Ok(check_status("/cart", response)?.json().await?)
    }

    /// `POST /checkout`.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or a non-success status; an empty
    /// cart comes back as a 400 status error.
    pub async fn checkout(&self, session_id: &SessionId) -> Result<Order, ClientError> {
        let response = self
            .http
            .post(self.url("/checkout"))
            .header(SESSION_ID_HEADER, session_id.as_str())
            .send()
            .await?;
        Ok(check_status("/checkout", response)?.json().await?)
    }
}

fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ShopClient::new("http://localhost:8080/", "test").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/cart"), "http://localhost:8080/cart");
    }

    #[test]
    fn test_status_error_message() {
        let err = ClientError::Status {
            endpoint: "/checkout",
            status: 400,
        };
        assert_eq!(err.to_string(), "/checkout returned 400");
    }
}
