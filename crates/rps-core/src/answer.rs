//! One player's submitted play for the current round.

use crate::choice::Choice;

/// `(alias, choice)` pair, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub alias: String,
    pub choice: Choice,
}

impl Answer {
    pub fn new(alias: impl Into<String>, choice: Choice) -> Self {
        Answer {
            alias: alias.into(),
            choice,
        }
    }
}
