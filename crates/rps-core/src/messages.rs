//! Message types exchanged between clients and the round server.
//!
//! These are **transport-agnostic** logical messages:
//! - [`ClientMessage`]: what the server consumes.
//! - [`ServerMessage`]: what the server produces.
//!
//! Note: the text encoder/decoder lives in the `rps-protocol` crate;
//! this module is purely logical.

/// A request from a connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Bind this session to `alias`, creating the player if needed.
    Connect { alias: String },

    /// Submit a play for the current round.
    ///
    /// `answer` is kept as the raw field value; it is validated when the
    /// round ingests it so the client gets an `InvalidAnswer` rejection
    /// instead of a codec error.
    Play { alias: String, answer: String },
}

impl ClientMessage {
    /// The `msgtype` field value for this message.
    pub fn msgtype(&self) -> &'static str {
        match self {
            ClientMessage::Connect { .. } => "connect",
            ClientMessage::Play { .. } => "play",
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            ClientMessage::Connect { alias } | ClientMessage::Play { alias, .. } => alias,
        }
    }
}

/// A cumulative score line in an outcome broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub alias: String,
    pub score: u64,
}

/// An acknowledgement or broadcast pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// A `connect` was accepted.
    ConnectAck,

    /// A `play` was recorded.
    PlayAck,

    /// The message could not be decoded.
    WrongFields,

    /// The message decoded but was rejected.
    ErrorInMsg,

    /// Seconds left in the current round.
    Countdown(u32),

    /// Cumulative scores of everyone who played the round just finished.
    Outcome(Vec<Standing>),
}
