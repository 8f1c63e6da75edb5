//! Shared types for the round server.
//!
//! This module defines:
//! - `SessionId`: a lightweight handle for connected sessions
//! - the ActiveSessionSet registry of outbound channels
//! - `RoundRequest`: messages flowing into the coordinator task

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use rps_core::{Choice, RoundError, RoundOutcome, RoundStatus, ServerMessage};
use tokio::sync::{mpsc, oneshot, RwLock};

/// Identifier for a connected session.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Pushes from the round clock to a given session.
pub type OutboundTx = mpsc::UnboundedSender<ServerMessage>;
pub type OutboundRx = mpsc::UnboundedReceiver<ServerMessage>;

/// Registry entry for one live session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub peer_addr: SocketAddr,
    pub tx: OutboundTx,
}

/// ActiveSessionSet: live sessions keyed by `SessionId`.
///
/// Inserted by the acceptor, removed by the session's own teardown (or
/// by the clock when a push finds the session's channel closed).
pub type SessionRegistry = Arc<RwLock<HashMap<SessionId, SessionHandle>>>;

/// A request into the coordinator task. Every variant carries a
/// one-shot reply channel; the task answers each request in arrival
/// order.
#[derive(Debug)]
pub enum RoundRequest {
    Connect {
        session_id: SessionId,
        alias: String,
        remote_ip: IpAddr,
        reply: oneshot::Sender<Result<(), RoundError>>,
    },
    Play {
        session_id: SessionId,
        alias: String,
        answer: String,
        reply: oneshot::Sender<Result<Choice, RoundError>>,
    },
    Tick {
        reply: oneshot::Sender<RoundStatus>,
    },
    Finalize {
        reply: oneshot::Sender<RoundOutcome>,
    },
}

/// Channel from sessions and the clock → coordinator task.
pub type RoundTx = mpsc::UnboundedSender<RoundRequest>;
pub type RoundRx = mpsc::UnboundedReceiver<RoundRequest>;
