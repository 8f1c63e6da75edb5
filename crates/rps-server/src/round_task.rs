//! Central coordinator loop.
//!
//! This task owns the `RoundCoordinator` (and through it the round
//! state and player store handle) and processes every `RoundRequest`
//! one at a time, so connects, plays, ticks and finalization never
//! interleave.

use rps_core::RoundCoordinator;
use tracing::{debug, info, warn};

use crate::types::{RoundRequest, RoundRx};

/// Run the coordinator processing loop until every sender is dropped.
pub async fn run_round_loop(mut round_rx: RoundRx, mut coordinator: RoundCoordinator) {
    while let Some(req) = round_rx.recv().await {
        handle_request(&mut coordinator, req);
    }

    info!("round loop shutting down (round_rx closed)");
}

fn handle_request(coordinator: &mut RoundCoordinator, req: RoundRequest) {
    match req {
        RoundRequest::Connect {
            session_id,
            alias,
            remote_ip,
            reply,
        } => {
            let result = coordinator
                .submit_connect(&alias, Some(remote_ip))
                .map(|record| {
                    debug!(session = session_id.0, %alias, score = record.score, "connect accepted");
                });
            if let Err(error) = &result {
                warn!(session = session_id.0, %alias, %error, "connect rejected");
            }
            // the session may have gone away while waiting; nothing to undo
            if reply.send(result).is_err() {
                debug!(session = session_id.0, %alias, "connect reply dropped, session gone");
            }
        }
        RoundRequest::Play {
            session_id,
            alias,
            answer,
            reply,
        } => {
            let result = coordinator.submit_play(&alias, &answer);
            if let Err(error) = &result {
                warn!(session = session_id.0, %alias, %answer, %error, "play rejected");
            }
            if reply.send(result).is_err() {
                debug!(session = session_id.0, %alias, "play reply dropped, session gone");
            }
        }
        RoundRequest::Tick { reply } => {
            if let Err(status) = reply.send(coordinator.tick()) {
                warn!(?status, "tick reply dropped, round clock gone");
            }
        }
        RoundRequest::Finalize { reply } => {
            if let Err(outcome) = reply.send(coordinator.finalize_round()) {
                warn!(standings = ?outcome.standings, "outcome dropped, round clock gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rps_core::{InMemoryPlayerStore, RoundError, RoundStatus};
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::types::SessionId;

    #[tokio::test]
    async fn serializes_requests_through_one_coordinator() {
        let store = Arc::new(InMemoryPlayerStore::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_round_loop(rx, RoundCoordinator::new(store, 2)));

        let (reply, connected) = oneshot::channel();
        tx.send(RoundRequest::Connect {
            session_id: SessionId(1),
            alias: "alice".into(),
            remote_ip: "127.0.0.1".parse().unwrap(),
            reply,
        })
        .unwrap();
        assert_eq!(connected.await.unwrap(), Ok(()));

        let (reply, played) = oneshot::channel();
        tx.send(RoundRequest::Play {
            session_id: SessionId(1),
            alias: "alice".into(),
            answer: "paper".into(),
            reply,
        })
        .unwrap();
        assert!(played.await.unwrap().is_ok());

        let (reply, played_again) = oneshot::channel();
        tx.send(RoundRequest::Play {
            session_id: SessionId(1),
            alias: "alice".into(),
            answer: "rock".into(),
            reply,
        })
        .unwrap();
        assert_eq!(
            played_again.await.unwrap(),
            Err(RoundError::DuplicatePlay("alice".into()))
        );

        for expected in [RoundStatus::Ongoing { remaining: 1 }, RoundStatus::JustEnded] {
            let (reply, status) = oneshot::channel();
            tx.send(RoundRequest::Tick { reply }).unwrap();
            assert_eq!(status.await.unwrap(), expected);
        }

        let (reply, outcome) = oneshot::channel();
        tx.send(RoundRequest::Finalize { reply }).unwrap();
        let outcome = outcome.await.unwrap();
        assert_eq!(outcome.standings.len(), 1);
        assert_eq!(outcome.standings[0].alias, "alice");

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_reply_does_not_stop_the_loop() {
        let store = Arc::new(InMemoryPlayerStore::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_round_loop(rx, RoundCoordinator::new(store, 3)));

        // requester gives up before the answer arrives
        let (reply, abandoned) = oneshot::channel();
        drop(abandoned);
        tx.send(RoundRequest::Tick { reply }).unwrap();

        let (reply, status) = oneshot::channel();
        tx.send(RoundRequest::Tick { reply }).unwrap();
        // the abandoned tick still counted
        assert_eq!(status.await.unwrap(), RoundStatus::Ongoing { remaining: 1 });

        drop(tx);
        handle.await.unwrap();
    }
}
