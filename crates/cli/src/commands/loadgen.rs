//! Load generator for the storefront.
//!
//! Simulates concurrent shoppers. Each user gets its own session from
//! `GET /catalog` and then loops forever (or for a bounded number of
//! iterations): add a random catalog item, view the cart, and sometimes check
//! out, pausing between every call. Failures are logged and counted but never
//! stop a user.
//!
//! # Usage
//!
//! ```bash
//! cw-cli loadgen --base-url http://localhost:8080 --users 10 --checkout-rate 25
//! ```
//!
//! # Environment Variables
//!
//! - `BASE_URL` - Service base URL (default: `http://localhost:8080`)
//! - `USERS` - Number of concurrent users (default: 1)
//! - `CHECKOUT_RATE` - Percent chance to check out each loop (default: 10)

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use cartwheel_core::{Catalog, SessionId};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::{ClientError, ShopClient};

/// Errors that stop a load run before it starts.
#[derive(Debug, Error)]
pub enum LoadgenError {
    /// HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Startup health check failed.
    #[error("service not healthy or unreachable at {0}")]
    Unhealthy(String),
}

/// Load run parameters, already clamped to their valid ranges.
#[derive(Debug, Clone)]
pub struct LoadgenConfig {
    pub base_url: String,
    /// Concurrent users, at least 1.
    pub users: usize,
    /// Percent chance (0-100) to attempt checkout each loop.
    pub checkout_rate: u8,
    /// Pause after every action.
    pub wait: Duration,
    /// Loops per user; `None` runs until shutdown.
    pub iterations: Option<u64>,
    pub skip_health_check: bool,
}

impl LoadgenConfig {
    /// Build a config, clamping `users` to at least 1 and `checkout_rate` to
    /// 0-100.
    #[must_use]
    pub fn new(base_url: impl Into<String>, users: i64, checkout_rate: i64) -> Self {
        Self {
            base_url: base_url.into(),
            users: usize::try_from(users.max(1)).unwrap_or(usize::MAX),
            checkout_rate: u8::try_from(checkout_rate.clamp(0, 100)).unwrap_or(100),
            wait: Duration::from_secs(5),
            iterations: None,
            skip_health_check: false,
        }
    }

    /// Set the pause between actions.
    #[must_use]
    pub const fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Bound the number of loops per user.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Skip the startup health check.
    #[must_use]
    pub const fn with_skip_health_check(mut self, skip: bool) -> Self {
        self.skip_health_check = skip;
        self
    }
}

/// Aggregated statistics of a load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Requests sent, including failed ones.
    pub requests: u64,
    /// Requests that failed or were rejected.
    pub failures: u64,
    /// Successful checkouts.
    pub orders: u64,
}

impl LoadStats {
    fn record<T>(&mut self, result: &Result<T, ClientError>) {
        self.requests += 1;
        if result.is_err() {
            self.failures += 1;
        }
    }
}

impl AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.requests += other.requests;
        self.failures += other.failures;
        self.orders += other.orders;
    }
}

/// Run the load generator until every user finishes or `shutdown` flips to
/// `true`.
///
/// # Errors
///
/// Returns `LoadgenError::Unhealthy` if the startup health check fails, or
/// `LoadgenError::Client` if the HTTP client cannot be built.
pub async fn run(
    config: LoadgenConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<LoadStats, LoadgenError> {
    let probe = ShopClient::new(&config.base_url, "cartwheel-loadgen/1.0")?;
    if !config.skip_health_check {
        tracing::info!(base_url = %probe.base_url(), "Checking health");
        if !probe.health().await {
            return Err(LoadgenError::Unhealthy(probe.base_url().to_string()));
        }
    }

    tracing::info!(
        users = config.users,
        checkout_rate = config.checkout_rate,
        wait_ms = config.wait.as_millis(),
        iterations = ?config.iterations,
        "Starting load"
    );

    let config = Arc::new(config);
    let mut workers = JoinSet::new();
    for user in 1..=config.users {
        let client = ShopClient::new(
            &config.base_url,
            &format!("cartwheel-loadgen/1.0 worker/{user}"),
        )?;
        workers.spawn(simulate_user(
            user,
            client,
            Arc::clone(&config),
            shutdown.clone(),
        ));
    }

    let mut stats = LoadStats::default();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(user_stats) => stats += user_stats,
            Err(e) => tracing::error!(error = %e, "Load worker panicked"),
        }
    }

    tracing::info!(
        requests = stats.requests,
        failures = stats.failures,
        orders = stats.orders,
        "Load run finished"
    );
    Ok(stats)
}

/// Sleep for `wait`, returning `true` if shutdown was requested meanwhile.
async fn pause(wait: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(wait) => *shutdown.borrow(),
        // A dropped sender means nobody can request shutdown any more
        changed = shutdown.changed() => match changed {
            Ok(()) => *shutdown.borrow(),
            Err(_) => {
                tokio::time::sleep(wait).await;
                false
            }
        },
    }
}

/// Obtain a session id and the item ids to shop from.
async fn start_session(
    user: usize,
    client: &ShopClient,
    stats: &mut LoadStats,
) -> (SessionId, Vec<String>) {
    let page = client.catalog().await;
    stats.record(&page);

    let (session_id, products) = match page {
        Ok(page) => (page.session_id, page.products),
        Err(e) => {
            tracing::warn!(user, error = %e, "GET /catalog failed");
            (None, Vec::new())
        }
    };

    let session_id = session_id.unwrap_or_else(|| {
        let fallback = SessionId::generate();
        tracing::warn!(user, session_id = %fallback, "Using fallback session id");
        fallback
    });

    let mut item_ids: Vec<String> = products.into_iter().map(|p| p.id).collect();
    if item_ids.is_empty() {
        item_ids = Catalog::builtin()
            .products()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
    }

    (session_id, item_ids)
}

/// One simulated shopper.
async fn simulate_user(
    user: usize,
    client: ShopClient,
    config: Arc<LoadgenConfig>,
    mut shutdown: watch::Receiver<bool>,
) -> LoadStats {
    let mut stats = LoadStats::default();
    let (session_id, item_ids) = start_session(user, &client, &mut stats).await;
    tracing::info!(user, session_id = %session_id, "User started");

    if pause(config.wait, &mut shutdown).await {
        return stats;
    }

    let mut iteration = 0_u64;
    while config.iterations.is_none_or(|max| iteration < max) {
        iteration += 1;

        let item_id = item_ids
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default();
        let added = client.add(&session_id, &item_id, 1).await;
        stats.record(&added);
        if let Err(e) = added {
            tracing::warn!(user, item_id = %item_id, error = %e, "Add to cart failed");
        }
        if pause(config.wait, &mut shutdown).await {
            break;
        }

        let viewed = client.view_cart(&session_id).await;
        stats.record(&viewed);
        if let Err(e) = viewed {
            tracing::warn!(user, error = %e, "View cart failed");
        }
        if pause(config.wait, &mut shutdown).await {
            break;
        }

        let roll: u8 = rand::rng().random_range(1..=100);
        if roll <= config.checkout_rate {
            let checkout = client.checkout(&session_id).await;
            stats.record(&checkout);
            match checkout {
                Ok(order) => {
                    stats.orders += 1;
                    tracing::info!(
                        user,
                        order_id = %order.order_id,
                        total = %order.total,
                        "Checkout succeeded"
                    );
                }
                // Usually an empty cart
                Err(e) => tracing::warn!(user, error = %e, "Checkout did not succeed"),
            }
            if pause(config.wait, &mut shutdown).await {
                break;
            }
        }
    }

    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_clamps_bounds() {
        let config = LoadgenConfig::new("http://localhost:8080", 0, 250);
        assert_eq!(config.users, 1);
        assert_eq!(config.checkout_rate, 100);

        let config = LoadgenConfig::new("http://localhost:8080", -4, -1);
        assert_eq!(config.users, 1);
        assert_eq!(config.checkout_rate, 0);

        let config = LoadgenConfig::new("http://localhost:8080", 12, 10);
        assert_eq!(config.users, 12);
        assert_eq!(config.checkout_rate, 10);
        assert_eq!(config.wait, Duration::from_secs(5));
        assert!(config.iterations.is_none());
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = LoadStats::default();
        stats.record::<()>(&Ok(()));
        stats.record::<()>(&Err(ClientError::Status {
            endpoint: "/checkout",
            status: 400,
        }));
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.failures, 1);

        stats += LoadStats {
            requests: 3,
            failures: 0,
            orders: 1,
        };
        assert_eq!(
            stats,
            LoadStats {
                requests: 5,
                failures: 1,
                orders: 1
            }
        );
    }

    #[tokio::test]
    async fn test_pause_returns_early_on_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { pause(Duration::from_secs(60), &mut rx).await });
        tx.send(true).unwrap();
        let stopped = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_health_check() {
        let (_tx, rx) = watch::channel(false);
        let config = LoadgenConfig::new("http://127.0.0.1:9", 1, 0);
        let err = run(config, rx).await.unwrap_err();
        assert!(matches!(err, LoadgenError::Unhealthy(_)));
    }
}
