//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `SessionId` and registers it.
//! - Spawns:
//!   - a per-connection session task,
//!   - a single coordinator task that owns the round state,
//!   - a single round clock task.
//!
//! The per-session logic, coordinator loop and clock live in the
//! `session`, `round_task` and `round_clock` modules respectively.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rps_core::{InMemoryPlayerStore, PlayerStore, RoundCoordinator};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::types::{
    OutboundRx, OutboundTx, RoundRx, RoundTx, SessionHandle, SessionId, SessionRegistry,
};
use crate::{round_clock, round_task, session};

/// Pause after a failed `accept` so a persistent error (e.g. out of
/// file descriptors) does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
    SessionId(id)
}

/// Bind the configured address and serve with a fresh in-memory store.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    serve(listener, config, Arc::new(InMemoryPlayerStore::new())).await
}

/// Run the server on an already-bound listener.
///
/// Only returns on a fatal error (including an unusable `config`);
/// accept failures are logged and the loop keeps going.
pub async fn serve(
    listener: TcpListener,
    config: Config,
    store: Arc<dyn PlayerStore>,
) -> anyhow::Result<()> {
    config.validate()?;

    // Shared registry of sessions → outbound channels.
    let sessions: SessionRegistry = Arc::new(RwLock::new(Default::default()));

    // Channel from sessions and the clock → coordinator task.
    let (round_tx, round_rx): (RoundTx, RoundRx) = mpsc::unbounded_channel();

    // Spawn the coordinator task.
    {
        let coordinator = RoundCoordinator::new(store, config.round_seconds);
        tokio::spawn(async move {
            round_task::run_round_loop(round_rx, coordinator).await;
        });
    }

    // Spawn the round clock.
    {
        let round_tx = round_tx.clone();
        let sessions = sessions.clone();
        let tick_interval = config.tick_interval;
        tokio::spawn(async move {
            round_clock::run_round_clock(round_tx, sessions, tick_interval).await;
        });
    }

    info!(
        round_seconds = config.round_seconds,
        tick_ms = config.tick_interval.as_millis() as u64,
        max_clients = config.max_clients,
        "round server ready"
    );

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let current_sessions = {
            let guard = sessions.read().await;
            guard.len()
        };

        if current_sessions >= config.max_clients {
            warn!(
                peer = %peer_addr,
                max_clients = config.max_clients,
                "rejecting connection: max_clients reached"
            );
            // Just drop the stream; client will see the connection closed.
            continue;
        }

        let session_id = next_session_id();
        info!(session = session_id.0, peer = %peer_addr, "accepted connection");

        // Create outbound channel for this session.
        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

        // Register session.
        {
            let mut guard = sessions.write().await;
            guard.insert(session_id, SessionHandle { peer_addr, tx: out_tx });
        }

        let sessions = sessions.clone();
        let round_tx = round_tx.clone();

        tokio::spawn(async move {
            match session::run_session(session_id, stream, peer_addr, round_tx, out_rx, sessions).await {
                Ok(()) => info!(session = session_id.0, peer = %peer_addr, "session closed"),
                Err(SessionError::ConnectionFault(e)) => {
                    warn!(session = session_id.0, peer = %peer_addr, error = %e, "session torn down after I/O failure")
                }
                Err(e @ SessionError::CoordinatorGone) => {
                    error!(session = session_id.0, peer = %peer_addr, error = %e, "session stopped")
                }
            }
        });
    }
}
