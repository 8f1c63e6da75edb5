//! The in-progress round.
//!
//! Per-round state machine:
//!
//! ```text
//! Collecting (remaining > 0) --tick to 0--> Expired --finalize--> Collecting
//! ```
//!
//! `RoundState` itself is plain data with no locking; the server keeps
//! exactly one instance inside the coordinator task, which serializes
//! every access.

use std::collections::HashMap;

use crate::answer::Answer;
use crate::choice::Choice;
use crate::error::RoundError;
use crate::messages::Standing;

/// Length of a round when nothing else is configured.
pub const DEFAULT_ROUND_SECONDS: u32 = 30;

/// Result of advancing the round by one second.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    /// Still collecting; `remaining` seconds left.
    Ongoing { remaining: u32 },

    /// This tick brought the round to zero. Reported once per round.
    JustEnded,

    /// Already at zero and waiting for finalization; nothing changed.
    Expired,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    Collecting,
    Expired,
}

/// What a finalized round produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Cumulative scores of the round's players, in store order.
    pub standings: Vec<Standing>,

    /// Points earned this round, per alias.
    pub deltas: HashMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    answers: Vec<Answer>,
    remaining_seconds: u32,
    round_over: bool,
    last_results: Vec<Standing>,
    round_seconds: u32,
}

impl Default for RoundState {
    fn default() -> Self {
        RoundState::new(DEFAULT_ROUND_SECONDS)
    }
}

impl RoundState {
    /// A fresh round of `round_seconds` (clamped to at least one second).
    pub fn new(round_seconds: u32) -> Self {
        let round_seconds = round_seconds.max(1);
        RoundState {
            answers: Vec::new(),
            remaining_seconds: round_seconds,
            round_over: false,
            last_results: Vec::new(),
            round_seconds,
        }
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }

    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    /// Standings broadcast at the end of the previous round.
    pub fn last_results(&self) -> &[Standing] {
        &self.last_results
    }

    pub fn phase(&self) -> RoundPhase {
        if self.round_over {
            RoundPhase::Expired
        } else {
            RoundPhase::Collecting
        }
    }

    pub fn has_answered(&self, alias: &str) -> bool {
        self.answers.iter().any(|a| a.alias == alias)
    }

    /// Record `alias`'s play. First play wins; later ones are rejected.
    pub fn record_answer(&mut self, alias: &str, choice: Choice) -> Result<(), RoundError> {
        if self.round_over {
            return Err(RoundError::RoundClosed);
        }
        if self.has_answered(alias) {
            return Err(RoundError::DuplicatePlay(alias.to_string()));
        }

        self.answers.push(Answer::new(alias, choice));
        Ok(())
    }

    /// Advance one second.
    pub fn tick(&mut self) -> RoundStatus {
        if self.round_over {
            return RoundStatus::Expired;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.round_over = true;
            RoundStatus::JustEnded
        } else {
            RoundStatus::Ongoing {
                remaining: self.remaining_seconds,
            }
        }
    }

    /// Hand over this round's answers and start the next round.
    ///
    /// Clears answers, restores the full countdown and reopens the round
    /// in a single step.
    pub fn reset(&mut self, results: Vec<Standing>) -> Vec<Answer> {
        self.remaining_seconds = self.round_seconds;
        self.round_over = false;
        self.last_results = results;
        std::mem::take(&mut self.answers)
    }
}
