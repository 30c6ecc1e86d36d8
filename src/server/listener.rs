use std::future::pending;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, info, info_span, warn};

use crate::portal::Portal;
use crate::server::registry::Registry;
use crate::server::session::Session;
use crate::storage::RecordStorage;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// TCP server for portal clients.
///
/// Each accepted connection runs as its own task. At most `max_connections`
/// sessions are served at once; further clients wait in the listen backlog
/// until a slot frees up.
pub struct Server<S: RecordStorage> {
    listener: TcpListener,
    next_session: AtomicU64,
    registry: Arc<Registry>,
    portal: Arc<Portal<S>>,
    limit: Arc<Semaphore>,
}

impl<S: RecordStorage + 'static> Server<S> {
    /// Creates a new server with a given listener and portal.
    pub fn new(listener: TcpListener, portal: Arc<Portal<S>>, max_connections: usize) -> Self {
        Self {
            listener,
            next_session: AtomicU64::new(1),
            registry: Arc::new(Registry::new()),
            portal,
            limit: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves clients until the process exits.
    pub async fn serve(self) {
        self.serve_with_shutdown(pending()).await
    }

    /// Serves clients until `shutdown` completes.
    ///
    /// On shutdown every session waiting for client input is cancelled, and
    /// this returns once all session tasks have finished. An operation that
    /// is already running completes first.
    pub async fn serve_with_shutdown(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut sessions = JoinSet::new();

        loop {
            // Reap finished sessions so the set does not grow unbounded.
            while sessions.try_join_next().is_some() {}

            let permit = tokio::select! {
                permit = Arc::clone(&self.limit).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = &mut shutdown => break,
            };

            let (socket, peer_addr) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };

            let id = self.next_session.fetch_add(1, Ordering::Relaxed);
            let registry = Arc::clone(&self.registry);
            let portal = Arc::clone(&self.portal);
            let cancel = registry.register(id);

            sessions.spawn(
                async move {
                    info!(%peer_addr, "connection accepted");
                    if let Err(e) = socket.set_nodelay(true) {
                        warn!(error = %e, "failed to set TCP_NODELAY");
                    }
                    if let Err(e) = Session::new(socket, portal, cancel).run().await {
                        warn!(error = %e, "session error");
                    }
                    registry.unregister(id);
                    drop(permit);
                    info!("connection closed");
                }
                .instrument(info_span!("session", id)),
            );
        }

        info!(active = self.registry.len(), "shutting down");
        self.registry.cancel_all();
        while sessions.join_next().await.is_some() {}

        if let Err(e) = self.portal.sync_all().await {
            warn!(error = %e, "failed to sync stores");
        }
        info!("server stopped");
    }
}
