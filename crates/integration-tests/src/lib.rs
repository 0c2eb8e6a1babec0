//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! Each test boots the full storefront router on an ephemeral local port
//! with [`TestServer::start`] and talks to it over real HTTP.
//!
//! # Test Categories
//!
//! - `http_contract` - Endpoint behavior, headers and error bodies
//! - `concurrency` - Parallel requests against shared sessions
//! - `loadgen` - Load generator runs against a live server

use std::net::SocketAddr;
use std::sync::Arc;

use cartwheel_core::Catalog;
use cartwheel_storefront::{routes, state::AppState};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A storefront served on `127.0.0.1` for the duration of a test.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the built-in catalog.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        Self::with_catalog(Catalog::builtin()).await
    }

    /// Serve a specific catalog.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn with_catalog(catalog: Catalog) -> Self {
        let state = AppState::new(Arc::new(catalog));
        let app = routes::app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
