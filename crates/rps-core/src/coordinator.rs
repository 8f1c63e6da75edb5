//! Round coordinator.
//!
//! Owns the single [`RoundState`] and a handle to the [`PlayerStore`],
//! and implements the four operations everything else goes through:
//! `submit_connect`, `submit_play`, `tick` and `finalize_round`.
//!
//! Takes `&mut self` everywhere; callers must serialize access (the
//! server runs it inside one actor task).

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::choice::Choice;
use crate::error::{RoundError, StoreError};
use crate::messages::Standing;
use crate::player_store::{PlayerRecord, PlayerStore};
use crate::round::{RoundOutcome, RoundState, RoundStatus};
use crate::scoring;

pub struct RoundCoordinator {
    state: RoundState,
    store: Arc<dyn PlayerStore>,
}

impl RoundCoordinator {
    pub fn new(store: Arc<dyn PlayerStore>, round_seconds: u32) -> Self {
        RoundCoordinator {
            state: RoundState::new(round_seconds),
            store,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Look up `alias`, creating it with score 0 if unknown.
    ///
    /// Idempotent for known aliases. Losing a creation race to another
    /// writer counts as success: the winner's record is returned.
    pub fn submit_connect(
        &mut self,
        alias: &str,
        remote_ip: Option<IpAddr>,
    ) -> Result<PlayerRecord, RoundError> {
        if let Some(existing) = self.store.find_by_alias(alias)? {
            debug!(alias, "known alias reconnected");
            return Ok(existing);
        }

        match self.store.create(alias, remote_ip) {
            Ok(record) => {
                info!(alias, ip = ?remote_ip, "created player");
                Ok(record)
            }
            Err(StoreError::DuplicateAlias(_)) => {
                debug!(alias, "lost create race, using existing record");
                self.store
                    .find_by_alias(alias)?
                    .ok_or_else(|| StoreError::UnknownAlias(alias.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate and record a play for the current round.
    pub fn submit_play(&mut self, alias: &str, answer: &str) -> Result<Choice, RoundError> {
        if self.store.find_by_alias(alias)?.is_none() {
            return Err(RoundError::UnknownAlias(alias.to_string()));
        }

        let choice: Choice = answer.parse()?;
        self.state.record_answer(alias, choice)?;
        debug!(alias, %choice, answers = self.state.answers().len(), "recorded answer");
        Ok(choice)
    }

    pub fn tick(&mut self) -> RoundStatus {
        self.state.tick()
    }

    /// Score the round, persist the points and start the next round.
    ///
    /// Meant to run after `tick` reported [`RoundStatus::JustEnded`];
    /// calling it earlier simply ends the round early. A store failure
    /// for one alias is logged and that alias is left out of the
    /// standings; the round resets regardless.
    pub fn finalize_round(&mut self) -> RoundOutcome {
        let deltas = scoring::score(self.state.answers());

        let mut new_scores: HashMap<&str, u64> = HashMap::with_capacity(deltas.len());
        for (alias, &points) in &deltas {
            match self.store.increment_score(alias, u64::from(points)) {
                Ok(score) => {
                    new_scores.insert(alias.as_str(), score);
                }
                Err(error) => warn!(alias = alias.as_str(), %error, "failed to persist round points"),
            }
        }

        let standings = self.standings_in_store_order(&new_scores);
        info!(
            answers = self.state.answers().len(),
            players = standings.len(),
            "round finalized"
        );

        self.state.reset(standings.clone());
        RoundOutcome { standings, deltas }
    }

    fn standings_in_store_order(&self, new_scores: &HashMap<&str, u64>) -> Vec<Standing> {
        let order: Vec<String> = match self.store.players() {
            Ok(players) => players.into_iter().map(|p| p.username).collect(),
            Err(error) => {
                warn!(%error, "cannot list players, using answer order");
                self.state.answers().iter().map(|a| a.alias.clone()).collect()
            }
        };

        order
            .into_iter()
            .filter_map(|alias| {
                new_scores
                    .get(alias.as_str())
                    .map(|&score| Standing { alias, score })
            })
            .collect()
    }
}
