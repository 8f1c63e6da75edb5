//! Error types for round coordination and the player store.
//!
//! Every variant here is recoverable: the server acknowledges the
//! offending client with an error line and keeps the session open.

use thiserror::Error;

/// Failures reported by a [`PlayerStore`](crate::PlayerStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record with this alias already exists (a concurrent create won).
    #[error("alias `{0}` already exists")]
    DuplicateAlias(String),

    /// No record exists for this alias.
    #[error("no player record for alias `{0}`")]
    UnknownAlias(String),

    /// The backing store cannot be used (e.g. a poisoned lock).
    #[error("player store unavailable: {0}")]
    Unavailable(String),
}

/// Client-level failures while ingesting `connect` / `play`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// `play` from a session that never connected with this alias.
    #[error("alias `{0}` has not connected")]
    UnknownAlias(String),

    /// `answer` was not one of rock, paper, scissors.
    #[error("invalid answer `{0}`")]
    InvalidAnswer(String),

    /// The alias already has an answer recorded for this round.
    #[error("alias `{0}` already played this round")]
    DuplicatePlay(String),

    /// The round has expired and is waiting to be finalized.
    #[error("round is closed for new answers")]
    RoundClosed,

    /// The session is already bound to a different alias.
    #[error("session already bound to alias `{bound}`, cannot rebind to `{requested}`")]
    AliasAlreadySet { bound: String, requested: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
