//! Scoring engine.
//!
//! Every answer is compared against every *other* answer in the round;
//! a player earns one point per opponent their choice beats. Ties and
//! losses are worth nothing, so with `n` answers each player ends up
//! in `[0, n - 1]`.

use std::collections::HashMap;

use crate::answer::Answer;

/// Compute per-alias points for one round.
///
/// Pure: no I/O, no store access. Every alias in `answers` appears in
/// the result, including those that scored zero.
pub fn score(answers: &[Answer]) -> HashMap<String, u32> {
    let mut points: HashMap<String, u32> = HashMap::with_capacity(answers.len());

    for (i, a) in answers.iter().enumerate() {
        let wins = answers
            .iter()
            .enumerate()
            .filter(|&(j, b)| j != i && a.choice.beats(b.choice))
            .count() as u32;

        *points.entry(a.alias.clone()).or_insert(0) += wins;
    }

    points
}
