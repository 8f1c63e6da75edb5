//! rps-core
//!
//! Pure round logic for the rock-paper-scissors server:
//! - choices and answers
//! - the scoring engine
//! - the player store seam (plus an in-memory store)
//! - the shared round state and its coordinator
//! - logical client/server messages

pub mod choice;
pub mod answer;
pub mod messages;
pub mod scoring;
pub mod player_store;
pub mod round;
pub mod coordinator;
pub mod error;

pub use choice::Choice;
pub use answer::Answer;

pub use messages::{ClientMessage, ServerMessage, Standing};

pub use scoring::score;
pub use player_store::{InMemoryPlayerStore, PlayerRecord, PlayerStore};
pub use round::{RoundOutcome, RoundPhase, RoundState, RoundStatus, DEFAULT_ROUND_SECONDS};
pub use coordinator::RoundCoordinator;
pub use error::{RoundError, StoreError};
