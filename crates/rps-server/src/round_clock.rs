//! Round clock.
//!
//! Ticks the coordinator once per `tick_interval`, pushes a countdown
//! to every live session after each tick, and when a round runs out
//! asks the coordinator to finalize it and pushes the outcome.
//!
//! The interval is fixed-period: each tick is scheduled from the
//! previous deadline, so a slow broadcast delays one tick instead of
//! shifting every later round boundary.

use std::time::Duration;

use rps_core::{RoundOutcome, RoundStatus, ServerMessage};
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::types::{RoundRequest, RoundTx, SessionId, SessionRegistry};

/// Drive rounds forever, or until the coordinator goes away.
pub async fn run_round_clock(round_tx: RoundTx, sessions: SessionRegistry, tick_interval: Duration) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick fires immediately; a round starts with its full countdown.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Some(status) = ask(&round_tx, |reply| RoundRequest::Tick { reply }).await else {
            error!("coordinator gone, stopping round clock");
            return;
        };

        match status {
            RoundStatus::Ongoing { remaining } => {
                if remaining % 5 == 0 {
                    debug!(remaining, "round countdown");
                }
                broadcast(&sessions, ServerMessage::Countdown(remaining)).await;
            }
            RoundStatus::JustEnded => {
                broadcast(&sessions, ServerMessage::Countdown(0)).await;
                if !finish_round(&round_tx, &sessions).await {
                    return;
                }
            }
            RoundStatus::Expired => {
                warn!("tick found an unfinalized round, finalizing now");
                if !finish_round(&round_tx, &sessions).await {
                    return;
                }
            }
        }
    }
}

async fn finish_round(round_tx: &RoundTx, sessions: &SessionRegistry) -> bool {
    info!("round ends");
    let Some(RoundOutcome { standings, deltas }) =
        ask(round_tx, |reply| RoundRequest::Finalize { reply }).await
    else {
        error!("coordinator gone while finalizing, stopping round clock");
        return false;
    };

    info!(?deltas, ?standings, "round results");
    broadcast(sessions, ServerMessage::Outcome(standings)).await;
    true
}

async fn ask<T>(
    round_tx: &RoundTx,
    make: impl FnOnce(oneshot::Sender<T>) -> RoundRequest,
) -> Option<T> {
    let (reply, response) = oneshot::channel();
    round_tx.send(make(reply)).ok()?;
    response.await.ok()
}

/// Push `msg` to every live session.
///
/// A session whose channel is closed is dropped from the registry; the
/// rest still get the message.
pub async fn broadcast(sessions: &SessionRegistry, msg: ServerMessage) {
    // Snapshot of current sessions to minimize lock hold time.
    let current = {
        let guard = sessions.read().await;
        guard.clone()
    };

    let mut dead: Vec<SessionId> = Vec::new();
    for (id, handle) in &current {
        if handle.tx.send(msg.clone()).is_err() {
            warn!(session = id.0, peer = %handle.peer_addr, "push failed, dropping session");
            dead.push(*id);
        }
    }

    if !dead.is_empty() {
        let mut guard = sessions.write().await;
        for id in dead {
            guard.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::{mpsc, RwLock};

    use super::*;
    use crate::types::SessionHandle;

    #[tokio::test]
    async fn broadcast_skips_and_removes_closed_sessions() {
        let sessions: SessionRegistry = Arc::new(RwLock::new(HashMap::new()));
        let peer = "127.0.0.1:4000".parse().unwrap();

        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_rx);
        {
            let mut guard = sessions.write().await;
            guard.insert(SessionId(1), SessionHandle { peer_addr: peer, tx: dead_tx });
            guard.insert(SessionId(2), SessionHandle { peer_addr: peer, tx: live_tx });
        }

        broadcast(&sessions, ServerMessage::Countdown(12)).await;

        assert_eq!(live_rx.recv().await, Some(ServerMessage::Countdown(12)));
        let guard = sessions.read().await;
        assert_eq!(guard.len(), 1);
        assert!(guard.contains_key(&SessionId(2)));
    }
}
