//! The three hand shapes and the cyclic rule between them.

use std::fmt;
use std::str::FromStr;

use crate::error::RoundError;

/// A player's play for one round.
///
/// Rock beats scissors, scissors beats paper, paper beats rock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    /// Wire spelling (`rock` / `paper` / `scissors`).
    pub fn as_str(self) -> &'static str {
        match self {
            Choice::Rock => "rock",
            Choice::Paper => "paper",
            Choice::Scissors => "scissors",
        }
    }

    /// `true` if `self` wins against `other`. Ties are never a win.
    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Scissors, Choice::Paper)
                | (Choice::Paper, Choice::Rock)
        )
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = RoundError;

    /// Case-sensitive, exactly as clients send it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rock" => Ok(Choice::Rock),
            "paper" => Ok(Choice::Paper),
            "scissors" => Ok(Choice::Scissors),
            other => Err(RoundError::InvalidAnswer(other.to_string())),
        }
    }
}
