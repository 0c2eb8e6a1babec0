//! Idle session eviction.
//!
//! Sessions live in memory for the life of the process unless an idle
//! timeout is configured, in which case a background task periodically drops
//! every session that has not been touched within the timeout.

use std::sync::Arc;
use std::time::Duration;

use cartwheel_core::SessionStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Upper bound on the sweep period.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Sweep period for a given idle timeout.
#[must_use]
pub fn sweep_interval(max_idle: Duration) -> Duration {
    max_idle.min(MAX_SWEEP_INTERVAL)
}

/// Spawn the idle session reaper.
///
/// The task runs until the returned handle is aborted or the runtime shuts
/// down. A session is evicted at most one sweep period after it goes idle.
pub fn spawn_idle_session_reaper(store: Arc<SessionStore>, max_idle: Duration) -> JoinHandle<()> {
    let period = sweep_interval(max_idle);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = store.evict_idle(max_idle);
            if evicted > 0 {
                tracing::info!(
                    event = "session.evict",
                    evicted,
                    remaining = store.session_count(),
                    "Evicted idle sessions"
                );
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::{Catalog, SessionId};

    use super::*;

    #[test]
    fn test_sweep_interval_is_capped() {
        assert_eq!(
            sweep_interval(Duration::from_secs(5)),
            Duration::from_secs(5)
        );
        assert_eq!(sweep_interval(Duration::from_secs(1800)), MAX_SWEEP_INTERVAL);
    }

    #[tokio::test]
    async fn test_reaper_evicts_idle_sessions() {
        let store = Arc::new(SessionStore::new(Arc::new(Catalog::builtin())));
        store.add(&SessionId::from("idle"), "1", 1).unwrap();
        assert_eq!(store.session_count(), 1);

        let handle = spawn_idle_session_reaper(Arc::clone(&store), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        assert_eq!(store.session_count(), 0);
    }
}
