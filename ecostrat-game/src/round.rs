//! Per-round action collection.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{ActionId, Catalog, Scenario, SpeciesId};
use crate::config::ScoringConfig;
use crate::error::GameError;
use crate::scoring::{ActionChoice, Entrant, RoundOutcome, score_round};
use crate::state::{GameState, PlayerId};

/// Roster slot frozen for the duration of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub player: PlayerId,
    pub species: SpeciesId,
}

/// Whether a player has locked in an action this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub player: PlayerId,
    pub submitted: bool,
    pub has_reasoning: bool,
}

/// Collects one action per seat and scores the round once everyone is in.
#[derive(Debug, Clone)]
pub struct RoundController {
    round: u32,
    scenario: Scenario,
    seats: Vec<Seat>,
    choices: BTreeMap<PlayerId, ActionChoice>,
    active: Option<PlayerId>,
    catalog: Arc<Catalog>,
    scoring: ScoringConfig,
    outcome: Option<RoundOutcome>,
}

impl RoundController {
    #[must_use]
    pub fn new(round: u32, catalog: Arc<Catalog>, scoring: ScoringConfig, seats: Vec<Seat>) -> Self {
        let scenario = catalog.scenario_at(round).clone();
        let active = seats.first().map(|seat| seat.player);
        Self {
            round,
            scenario,
            seats,
            choices: BTreeMap::new(),
            active,
            catalog,
            scoring,
            outcome: None,
        }
    }

    /// Build the controller for the state's current round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SpeciesUnassigned`] if any player still lacks a species.
    pub fn for_state(state: &GameState) -> Result<Self, GameError> {
        let missing = state.unassigned();
        if !missing.is_empty() {
            return Err(GameError::SpeciesUnassigned { players: missing });
        }
        let seats = state
            .players()
            .iter()
            .filter_map(|p| {
                p.species.map(|species| Seat {
                    player: p.id,
                    species,
                })
            })
            .collect();
        Ok(Self::new(
            state.current_round(),
            state.catalog_handle(),
            state.config().scoring.clone(),
            seats,
        ))
    }

    fn seat_index(&self, player: PlayerId) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|seat| seat.player == player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    /// Record (or replace) a player's action and move the active pointer to
    /// the next seat still waiting, wrapping to the first seat when none are.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] without touching state if the id is not seated.
    pub fn select_action(&mut self, player: PlayerId, action: ActionId) -> Result<(), GameError> {
        let idx = self.seat_index(player)?;
        self.choices
            .entry(player)
            .and_modify(|choice| choice.action = action)
            .or_insert_with(|| ActionChoice::new(action));
        self.outcome = None;

        let len = self.seats.len();
        self.active = (1..=len)
            .map(|step| self.seats[(idx + step) % len].player)
            .find(|id| !self.choices.contains_key(id))
            .or_else(|| self.seats.first().map(|seat| seat.player));
        Ok(())
    }

    /// Attach reasoning to an already chosen action. Blank text clears it.
    /// Returns `false` when the player has not chosen an action yet.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not seated.
    pub fn set_reasoning(&mut self, player: PlayerId, text: &str) -> Result<bool, GameError> {
        self.seat_index(player)?;
        let Some(choice) = self.choices.get_mut(&player) else {
            return Ok(false);
        };
        let trimmed = text.trim();
        choice.reasoning = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.outcome = None;
        Ok(true)
    }

    #[must_use]
    pub fn all_submitted(&self) -> bool {
        self.seats
            .iter()
            .all(|seat| self.choices.contains_key(&seat.player))
    }

    #[must_use]
    pub fn pending_players(&self) -> Vec<PlayerId> {
        self.seats
            .iter()
            .map(|seat| seat.player)
            .filter(|id| !self.choices.contains_key(id))
            .collect()
    }

    #[must_use]
    pub fn submission_status(&self) -> Vec<Submission> {
        self.seats
            .iter()
            .map(|seat| {
                let choice = self.choices.get(&seat.player);
                Submission {
                    player: seat.player,
                    submitted: choice.is_some(),
                    has_reasoning: choice.is_some_and(|c| c.reasoning.is_some()),
                }
            })
            .collect()
    }

    /// Score the round, caching the outcome until the next edit.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActionsPending`] while any seat has no action, or
    /// any error raised by the scoring engine.
    pub fn finalize(&mut self) -> Result<&RoundOutcome, GameError> {
        if self.outcome.is_none() {
            let outcome = self.score()?;
            self.outcome = Some(outcome);
        }
        self.outcome
            .as_ref()
            .ok_or(GameError::ActionsPending { missing: Vec::new() })
    }

    fn score(&self) -> Result<RoundOutcome, GameError> {
        let missing = self.pending_players();
        if !missing.is_empty() {
            return Err(GameError::ActionsPending { missing });
        }
        let entrants: Vec<Entrant<'_>> = self
            .seats
            .iter()
            .map(|seat| Entrant {
                player: seat.player,
                species: seat.species,
                choice: self.choices.get(&seat.player),
            })
            .collect();
        score_round(
            &self.catalog,
            &self.scoring,
            self.round,
            &self.scenario,
            &entrants,
        )
    }

    /// Consume the controller, yielding the finalized outcome.
    pub(crate) fn into_outcome(mut self) -> Result<RoundOutcome, (Self, GameError)> {
        if let Err(err) = self.finalize().map(|_| ()) {
            return Err((self, err));
        }
        match self.outcome.take() {
            Some(outcome) => Ok(outcome),
            None => {
                let missing = self.pending_players();
                Err((self, GameError::ActionsPending { missing }))
            }
        }
    }

    #[must_use]
    pub const fn active_player(&self) -> Option<PlayerId> {
        self.active
    }

    /// Point the active marker at a seated player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not seated.
    pub fn set_active(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.seat_index(player)?;
        self.active = Some(player);
        Ok(())
    }

    #[must_use]
    pub fn choice(&self, player: PlayerId) -> Option<&ActionChoice> {
        self.choices.get(&player)
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }
}
