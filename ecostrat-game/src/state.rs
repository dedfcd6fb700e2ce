//! Roster, counters and history shared by every session phase.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{Catalog, Scenario, SpeciesId};
use crate::config::GameConfig;
use crate::constants::{DEFAULT_PLAYER_NAME_PREFIX, PLAYER_ID_PREFIX};
use crate::scoring::{PlayerResult, RoundOutcome};

/// Stable roster identifier, rendered as `player-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u32);

impl PlayerId {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PLAYER_ID_PREFIX}{}", self.0)
    }
}

/// Lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    Waiting,
    SpeciesSelection,
    RoundInProgress,
    RoundResults,
    GameComplete,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Waiting => "waiting",
            Self::SpeciesSelection => "species-selection",
            Self::RoundInProgress => "round-in-progress",
            Self::RoundResults => "round-results",
            Self::GameComplete => "game-complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub species: Option<SpeciesId>,
    pub population: i32,
    pub total_score: i32,
}

impl Player {
    fn new(id: PlayerId, name: String, population: i32) -> Self {
        Self {
            id,
            name,
            species: None,
            population,
            total_score: 0,
        }
    }

    /// Fold one round result into the running totals. Population never drops below zero.
    pub(crate) fn apply_result(&mut self, result: &PlayerResult) {
        self.population = self
            .population
            .saturating_add(result.population_delta)
            .max(0);
        self.total_score = self.total_score.saturating_add(result.score);
    }
}

/// Name given to a roster slot left blank, 1-based.
#[must_use]
pub fn default_player_name(position: usize) -> String {
    format!("{DEFAULT_PLAYER_NAME_PREFIX} {position}")
}

#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    catalog: Arc<Catalog>,
    players: Vec<Player>,
    current_round: u32,
    history: Vec<RoundOutcome>,
}

impl GameState {
    #[must_use]
    pub(crate) fn new(config: GameConfig, catalog: Arc<Catalog>) -> Self {
        Self {
            config,
            catalog,
            players: Vec::new(),
            current_round: 0,
            history: Vec::new(),
        }
    }

    /// Replace the roster with exactly `roster_size` players. Blank names fall
    /// back to `Player <n>`; extra names are ignored.
    pub(crate) fn register<S: AsRef<str>>(&mut self, names: &[S]) {
        let population = self.config.starting_population;
        self.players = (0..self.config.roster_size)
            .map(|idx| {
                let position = idx + 1;
                let name = names
                    .get(idx)
                    .map(|raw| raw.as_ref().trim())
                    .filter(|trimmed| !trimmed.is_empty())
                    .map_or_else(|| default_player_name(position), str::to_string);
                let id = PlayerId::new(u32::try_from(position).unwrap_or(u32::MAX));
                Player::new(id, name, population)
            })
            .collect();
        self.current_round = 0;
        self.history.clear();
    }

    pub(crate) fn begin(&mut self) {
        self.current_round = 1;
    }

    /// Merge a scored round into the roster and history. Returns true when
    /// another round follows.
    pub(crate) fn apply_outcome(&mut self, outcome: RoundOutcome) -> bool {
        for player in &mut self.players {
            if let Some(result) = outcome.results.get(&player.id) {
                player.apply_result(result);
            }
        }
        self.history.push(outcome);
        if self.current_round.saturating_add(1) > self.config.total_rounds {
            false
        } else {
            self.current_round += 1;
            true
        }
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Players without a species, in roster order.
    #[must_use]
    pub fn unassigned(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.species.is_none())
            .map(|p| p.id)
            .collect()
    }

    #[must_use]
    pub const fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub const fn total_rounds(&self) -> u32 {
        self.config.total_rounds
    }

    #[must_use]
    pub fn history(&self) -> &[RoundOutcome] {
        &self.history
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.history.last()
    }

    /// Scenario for the current round, once the game has started.
    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        (self.current_round > 0).then(|| self.catalog.scenario_at(self.current_round))
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn catalog_handle(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }
}
