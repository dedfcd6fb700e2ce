//! Typed session state machine.
//!
//! Each phase is a separate type that owns the [`GameState`]; transitions
//! consume the current phase and return the next one, so an operation can only
//! be called in the phase it belongs to. Rejected transitions hand the
//! unchanged phase back inside [`Rejected`].
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::{ActionId, Catalog, Scenario, SpeciesId};
use crate::config::{CapOverflow, ConfigError, GameConfig};
use crate::error::GameError;
use crate::round::{RoundController, Seat, Submission};
use crate::scoring::RoundOutcome;
use crate::standings::FinalStandings;
use crate::state::{GamePhase, GameState, Player, PlayerId};

/// A refused transition: the phase value comes back untouched with the reason.
#[derive(Debug)]
pub struct Rejected<S> {
    pub state: S,
    pub error: GameError,
}

impl<S> Rejected<S> {
    const fn new(state: S, error: GameError) -> Self {
        Self { state, error }
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.state
    }
}

impl<S> fmt::Display for Rejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<S: fmt::Debug> std::error::Error for Rejected<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// `waiting`: no roster yet.
#[derive(Debug, Clone)]
pub struct Lobby {
    state: GameState,
}

impl Lobby {
    /// Open a lobby for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first range violation found in `config`.
    pub fn new(config: GameConfig, catalog: Arc<Catalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: GameState::new(config, catalog),
        })
    }

    /// # Errors
    ///
    /// See [`Lobby::new`].
    pub fn with_builtin_catalog(config: GameConfig) -> Result<Self, ConfigError> {
        Self::new(config, Catalog::builtin())
    }

    /// Create the roster and open species selection.
    #[must_use]
    pub fn register_players<S: AsRef<str>>(mut self, names: &[S]) -> SpeciesSelection {
        self.state.register(names);
        log::info!(
            "registered {} players ({} named)",
            self.state.players().len(),
            names
                .iter()
                .take(self.state.players().len())
                .filter(|n| !n.as_ref().trim().is_empty())
                .count()
        );
        SpeciesSelection { state: self.state }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }
}

/// `species-selection`: players pick strategies before round one.
#[derive(Debug, Clone)]
pub struct SpeciesSelection {
    state: GameState,
}

impl SpeciesSelection {
    /// Set or overwrite a player's species.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not on the roster.
    pub fn assign_species(&mut self, player: PlayerId, species: SpeciesId) -> Result<(), GameError> {
        let slot = self
            .state
            .player_mut(player)
            .ok_or(GameError::UnknownPlayer { player })?;
        slot.species = Some(species);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not on the roster.
    pub fn clear_species(&mut self, player: PlayerId) -> Result<(), GameError> {
        let slot = self
            .state
            .player_mut(player)
            .ok_or(GameError::UnknownPlayer { player })?;
        slot.species = None;
        Ok(())
    }

    /// Give every undecided player a species, in roster order.
    ///
    /// Candidates are species held by fewer than `species_cap` decided players,
    /// counting manual picks and picks made earlier in this pass. Once every
    /// species is at the cap the [`CapOverflow`] policy picks the pool.
    /// Returns the assignments made.
    pub fn auto_assign_remaining<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Vec<(PlayerId, SpeciesId)> {
        let cap = self.state.config().species_cap;
        let overflow = self.state.config().cap_overflow;
        let all: Vec<SpeciesId> = self.state.catalog().species().iter().map(|s| s.id).collect();
        let mut counts = self.species_distribution();
        let mut picks = Vec::new();

        for player in self.state.unassigned() {
            let count_of = |id: &SpeciesId| counts.get(id).copied().unwrap_or(0);
            let mut pool: Vec<SpeciesId> =
                all.iter().copied().filter(|id| count_of(id) < cap).collect();
            if pool.is_empty() {
                pool = match overflow {
                    CapOverflow::Uniform => all.clone(),
                    CapOverflow::LeastUsed => {
                        let least = all.iter().map(count_of).min().unwrap_or(0);
                        all.iter().copied().filter(|id| count_of(id) == least).collect()
                    }
                };
                log::debug!("species cap {cap} exhausted, relaxing with {overflow:?}");
            }
            let Some(&species) = pool.choose(rng) else {
                break;
            };
            *counts.entry(species).or_insert(0) += 1;
            if let Some(slot) = self.state.player_mut(player) {
                slot.species = Some(species);
            }
            log::debug!("auto-assigned {player} -> {species}");
            picks.push((player, species));
        }
        picks
    }

    /// Number of decided players per species.
    #[must_use]
    pub fn species_distribution(&self) -> BTreeMap<SpeciesId, usize> {
        let mut counts = BTreeMap::new();
        for species in self.state.players().iter().filter_map(|p| p.species) {
            *counts.entry(species).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.state
            .players()
            .iter()
            .filter(|p| p.species.is_some())
            .count()
    }

    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.ready_count() == self.state.players().len()
    }

    /// Begin round one. Every player must already have a species.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SpeciesUnassigned`] with this phase handed back
    /// when any player is undecided.
    pub fn start_game(mut self) -> Result<RoundInProgress, Rejected<Self>> {
        let missing = self.state.unassigned();
        if !missing.is_empty() {
            return Err(Rejected::new(
                self,
                GameError::SpeciesUnassigned { players: missing },
            ));
        }
        self.state.begin();
        match RoundController::for_state(&self.state) {
            Ok(controller) => {
                log::info!(
                    "game started: {} players, {} rounds",
                    self.state.players().len(),
                    self.state.total_rounds()
                );
                Ok(RoundInProgress {
                    state: self.state,
                    controller,
                })
            }
            Err(error) => Err(Rejected::new(self, error)),
        }
    }

    /// Auto-assign anyone undecided, then begin round one.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::start_game`] failures; with a non-empty catalog
    /// every player ends up assigned, so none are expected.
    pub fn start_game_autofill<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
    ) -> Result<RoundInProgress, Rejected<Self>> {
        self.auto_assign_remaining(rng);
        self.start_game()
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }
}

/// `round-in-progress`: collecting actions for the current round.
#[derive(Debug, Clone)]
pub struct RoundInProgress {
    state: GameState,
    controller: RoundController,
}

impl RoundInProgress {
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not on the roster.
    pub fn select_action(&mut self, player: PlayerId, action: ActionId) -> Result<(), GameError> {
        self.controller.select_action(player, action)
    }

    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not on the roster.
    pub fn set_reasoning(&mut self, player: PlayerId, text: &str) -> Result<bool, GameError> {
        self.controller.set_reasoning(player, text)
    }

    #[must_use]
    pub fn all_submitted(&self) -> bool {
        self.controller.all_submitted()
    }

    /// Score the round without leaving the phase; repeated calls agree.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActionsPending`] while anyone has not chosen.
    pub fn finalize(&mut self) -> Result<&RoundOutcome, GameError> {
        self.controller.finalize()
    }

    /// Lock in the round and move to its results.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ActionsPending`] with this phase handed back
    /// while anyone has not chosen.
    pub fn end_round(self) -> Result<RoundResults, Rejected<Self>> {
        let Self { state, controller } = self;
        let seats = controller.seats().to_vec();
        match controller.into_outcome() {
            Ok(outcome) => {
                log::info!(
                    "round {}/{} scored in '{}'",
                    outcome.round,
                    state.total_rounds(),
                    outcome.scenario.id
                );
                Ok(RoundResults {
                    state,
                    seats,
                    outcome,
                })
            }
            Err((controller, error)) => Err(Rejected::new(Self { state, controller }, error)),
        }
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        self.controller.scenario()
    }

    #[must_use]
    pub fn submission_status(&self) -> Vec<Submission> {
        self.controller.submission_status()
    }

    #[must_use]
    pub const fn active_player(&self) -> Option<PlayerId> {
        self.controller.active_player()
    }

    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if the id is not on the roster.
    pub fn set_active(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.controller.set_active(player)
    }

    #[must_use]
    pub const fn controller(&self) -> &RoundController {
        &self.controller
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.state.current_round()
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }
}

/// `round-results`: the round is scored but not yet merged into totals.
#[derive(Debug, Clone)]
pub struct RoundResults {
    state: GameState,
    seats: Vec<Seat>,
    outcome: RoundOutcome,
}

/// Where the session goes after a round is merged.
#[derive(Debug, Clone)]
pub enum Advance {
    NextRound(RoundInProgress),
    Complete(GameComplete),
}

impl RoundResults {
    #[must_use]
    pub const fn outcome(&self) -> &RoundOutcome {
        &self.outcome
    }

    /// Merge the outcome into population and score totals, append it to the
    /// history, and open the next round or finish the game.
    #[must_use]
    pub fn complete_round(self) -> Advance {
        let Self {
            mut state,
            seats,
            outcome,
        } = self;
        if state.apply_outcome(outcome) {
            let controller = RoundController::new(
                state.current_round(),
                state.catalog_handle(),
                state.config().scoring.clone(),
                seats,
            );
            Advance::NextRound(RoundInProgress { state, controller })
        } else {
            log::info!("game complete after {} rounds", state.history().len());
            Advance::Complete(GameComplete { state })
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }
}

/// `game-complete`: terminal until reset.
#[derive(Debug, Clone)]
pub struct GameComplete {
    state: GameState,
}

impl GameComplete {
    #[must_use]
    pub fn final_standings(&self) -> FinalStandings {
        FinalStandings::from_state(&self.state)
    }

    /// Start over with a fresh default roster and the same configuration.
    #[must_use]
    pub fn reset(self) -> SpeciesSelection {
        fresh_selection(&self.state)
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }
}

fn fresh_selection(state: &GameState) -> SpeciesSelection {
    log::info!("session reset");
    Lobby {
        state: GameState::new(state.config().clone(), state.catalog_handle()),
    }
    .register_players::<&str>(&[])
}

/// A session in any phase, for callers that keep one value across transitions.
#[derive(Debug, Clone)]
pub enum GameSession {
    Waiting(Lobby),
    SpeciesSelection(SpeciesSelection),
    RoundInProgress(RoundInProgress),
    RoundResults(RoundResults),
    Complete(GameComplete),
}

impl GameSession {
    /// # Errors
    ///
    /// See [`Lobby::new`].
    pub fn new(config: GameConfig, catalog: Arc<Catalog>) -> Result<Self, ConfigError> {
        Lobby::new(config, catalog).map(Self::Waiting)
    }

    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        match self {
            Self::Waiting(_) => GamePhase::Waiting,
            Self::SpeciesSelection(_) => GamePhase::SpeciesSelection,
            Self::RoundInProgress(_) => GamePhase::RoundInProgress,
            Self::RoundResults(_) => GamePhase::RoundResults,
            Self::Complete(_) => GamePhase::GameComplete,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        match self {
            Self::Waiting(phase) => phase.state(),
            Self::SpeciesSelection(phase) => phase.state(),
            Self::RoundInProgress(phase) => phase.state(),
            Self::RoundResults(phase) => phase.state(),
            Self::Complete(phase) => phase.state(),
        }
    }

    #[must_use]
    pub const fn current_round(&self) -> u32 {
        self.state().current_round()
    }

    #[must_use]
    pub const fn total_rounds(&self) -> u32 {
        self.state().total_rounds()
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.state().players()
    }

    /// Outcome awaiting merge in `round-results`, otherwise the last merged one.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        match self {
            Self::RoundResults(phase) => Some(phase.outcome()),
            other => other.state().last_outcome(),
        }
    }

    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self {
            Self::RoundInProgress(phase) => Some(phase.scenario()),
            Self::RoundResults(phase) => Some(&phase.outcome().scenario),
            _ => None,
        }
    }

    /// Discard everything and return to species selection with a default roster.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::SpeciesSelection(fresh_selection(self.state()))
    }
}

impl From<Lobby> for GameSession {
    fn from(value: Lobby) -> Self {
        Self::Waiting(value)
    }
}

impl From<SpeciesSelection> for GameSession {
    fn from(value: SpeciesSelection) -> Self {
        Self::SpeciesSelection(value)
    }
}

impl From<RoundInProgress> for GameSession {
    fn from(value: RoundInProgress) -> Self {
        Self::RoundInProgress(value)
    }
}

impl From<RoundResults> for GameSession {
    fn from(value: RoundResults) -> Self {
        Self::RoundResults(value)
    }
}

impl From<GameComplete> for GameSession {
    fn from(value: GameComplete) -> Self {
        Self::Complete(value)
    }
}

impl From<Advance> for GameSession {
    fn from(value: Advance) -> Self {
        match value {
            Advance::NextRound(phase) => Self::RoundInProgress(phase),
            Advance::Complete(phase) => Self::Complete(phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn selection(names: &[&str]) -> SpeciesSelection {
        Lobby::with_builtin_catalog(GameConfig::default()).unwrap().register_players(names)
    }

    fn id(n: u32) -> PlayerId {
        PlayerId::new(n)
    }

    #[test]
    fn lobby_refuses_out_of_range_config() {
        let zero_rounds = GameConfig::default().with_roster_size(1).with_total_rounds(0);
        assert!(matches!(
            Lobby::with_builtin_catalog(zero_rounds.clone()),
            Err(ConfigError::RangeViolation {
                field: "total_rounds",
                ..
            })
        ));
        assert!(GameSession::new(zero_rounds, Catalog::builtin()).is_err());
        assert!(Lobby::with_builtin_catalog(GameConfig::default().with_roster_size(0)).is_err());

        let session =
            GameSession::new(GameConfig::default().with_total_rounds(1), Catalog::builtin())
                .unwrap();
        assert_eq!(session.phase(), GamePhase::Waiting);
        assert_eq!(session.total_rounds(), 1);
    }

    #[test]
    fn single_round_game_records_exactly_one_round() {
        let config = GameConfig::default().with_roster_size(1).with_total_rounds(1);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let round = Lobby::with_builtin_catalog(config)
            .unwrap()
            .register_players(&["solo"])
            .start_game_autofill(&mut rng)
            .unwrap();
        let Advance::Complete(done) = play_round(round, ActionId::WaitAndObserve).complete_round()
        else {
            panic!("one-round game should complete");
        };
        assert_eq!(done.state().history().len(), 1);
        assert_eq!(done.state().total_rounds(), 1);
    }

    fn play_round(mut round: RoundInProgress, action: ActionId) -> RoundResults {
        let ids: Vec<_> = round.state().players().iter().map(|p| p.id).collect();
        for player in ids {
            round.select_action(player, action).unwrap();
        }
        round.end_round().unwrap()
    }

    #[test]
    fn registration_fills_default_names() {
        let selection = selection(&["Alice", "", "Bob"]);
        let names: Vec<_> = selection
            .state()
            .players()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Alice", "Player 2", "Bob", "Player 4", "Player 5", "Player 6", "Player 7",
                "Player 8"
            ]
        );
        assert_eq!(GameSession::from(selection).phase(), GamePhase::SpeciesSelection);
    }

    #[test]
    fn assign_species_overwrites_and_rejects_unknown_ids() {
        let mut selection = selection(&[]);
        selection.assign_species(id(1), SpeciesId::KSelected).unwrap();
        selection.assign_species(id(1), SpeciesId::Ruderal).unwrap();
        assert_eq!(
            selection.state().player(id(1)).unwrap().species,
            Some(SpeciesId::Ruderal)
        );
        assert_eq!(
            selection.assign_species(id(99), SpeciesId::Ruderal),
            Err(GameError::UnknownPlayer { player: id(99) })
        );
        selection.clear_species(id(1)).unwrap();
        assert_eq!(selection.ready_count(), 0);
    }

    #[test]
    fn strict_start_hands_back_selection() {
        let mut selection = selection(&[]);
        selection.assign_species(id(1), SpeciesId::RSelected).unwrap();
        let rejected = selection.start_game().unwrap_err();
        match &rejected.error {
            GameError::SpeciesUnassigned { players } => assert_eq!(players.len(), 7),
            other => panic!("unexpected error {other:?}"),
        }
        let selection = rejected.into_inner();
        assert_eq!(selection.ready_count(), 1);
        assert_eq!(selection.state().current_round(), 0);
    }

    #[test]
    fn auto_assign_respects_cap() {
        for seed in 0..64 {
            let mut selection = selection(&[]);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let picks = selection.auto_assign_remaining(&mut rng);
            assert_eq!(picks.len(), 8);
            let mut counts: BTreeMap<SpeciesId, usize> = BTreeMap::new();
            for (_, species) in picks {
                *counts.entry(species).or_insert(0) += 1;
            }
            assert!(counts.values().all(|&n| n <= 2), "seed {seed}: {counts:?}");
            assert!(selection.all_assigned());
        }
    }

    #[test]
    fn auto_assign_counts_manual_picks_and_keeps_them() {
        let mut selection = selection(&[]);
        for n in 1..=3 {
            selection.assign_species(id(n), SpeciesId::KSelected).unwrap();
        }
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let picks = selection.auto_assign_remaining(&mut rng);
        assert_eq!(picks.len(), 5);
        assert!(picks.iter().all(|(_, s)| *s != SpeciesId::KSelected));
        for n in 1..=3 {
            assert_eq!(
                selection.state().player(id(n)).unwrap().species,
                Some(SpeciesId::KSelected)
            );
        }
    }

    #[test]
    fn cap_overflow_least_used_balances_large_rosters() {
        let config = GameConfig::default().with_roster_size(14);
        let mut selection =
            Lobby::with_builtin_catalog(config).unwrap().register_players::<&str>(&[]);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        selection.auto_assign_remaining(&mut rng);
        let counts = selection.species_distribution();
        assert_eq!(counts.values().sum::<usize>(), 14);
        assert!(counts.values().all(|&n| n == 2 || n == 3), "{counts:?}");
    }

    #[test]
    fn cap_overflow_uniform_still_assigns_everyone() {
        let mut config = GameConfig::default().with_roster_size(20);
        config.cap_overflow = CapOverflow::Uniform;
        let mut selection =
            Lobby::with_builtin_catalog(config).unwrap().register_players::<&str>(&[]);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let picks = selection.auto_assign_remaining(&mut rng);
        assert_eq!(picks.len(), 20);
        assert!(selection.all_assigned());
    }

    #[test]
    fn auto_assign_is_deterministic_per_seed() {
        let run = |seed| {
            let mut selection = selection(&[]);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            selection.auto_assign_remaining(&mut rng)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn full_game_walks_phases_in_order() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut session = GameSession::from(selection(&["Ada"]));
        let mut phases = vec![GamePhase::Waiting, session.phase()];

        session = match session {
            GameSession::SpeciesSelection(sel) => sel.start_game_autofill(&mut rng).unwrap().into(),
            other => panic!("unexpected phase {:?}", other.phase()),
        };
        loop {
            phases.push(session.phase());
            session = match session {
                GameSession::RoundInProgress(round) => {
                    assert_eq!(
                        round.state().history().len() + 1,
                        round.round() as usize
                    );
                    play_round(round, ActionId::BuildDefenses).into()
                }
                GameSession::RoundResults(results) => results.complete_round().into(),
                GameSession::Complete(_) => break,
                other => panic!("unexpected phase {:?}", other.phase()),
            };
        }

        let mut expected = vec![GamePhase::Waiting, GamePhase::SpeciesSelection];
        for _ in 0..4 {
            expected.push(GamePhase::RoundInProgress);
            expected.push(GamePhase::RoundResults);
        }
        expected.push(GamePhase::GameComplete);
        assert_eq!(phases, expected);
        assert_eq!(session.state().history().len(), 4);
        assert_eq!(session.current_round(), 4);

        let reset = session.reset();
        assert_eq!(reset.phase(), GamePhase::SpeciesSelection);
        assert_eq!(reset.players()[0].name, "Player 1");
        assert!(reset.state().history().is_empty());
        assert_eq!(reset.current_round(), 0);
    }

    #[test]
    fn end_round_hands_back_incomplete_round() {
        let mut sel = selection(&[]);
        for n in 1..=8 {
            sel.assign_species(id(n), SpeciesId::RSelected).unwrap();
        }
        let mut round = sel.start_game().unwrap();
        round.select_action(id(1), ActionId::ReproduceQuickly).unwrap();
        let rejected = round.end_round().unwrap_err();
        assert!(matches!(rejected.error, GameError::ActionsPending { ref missing } if missing.len() == 7));
        let round = rejected.into_inner();
        assert_eq!(
            round.controller().choice(id(1)).unwrap().action,
            ActionId::ReproduceQuickly
        );
    }

    #[test]
    fn merge_applies_scores_and_floors_population() {
        let config = GameConfig::default().with_roster_size(2).with_total_rounds(12);
        let mut sel = Lobby::with_builtin_catalog(config).unwrap().register_players(&["K", "r"]);
        sel.assign_species(id(1), SpeciesId::KSelected).unwrap();
        sel.assign_species(id(2), SpeciesId::RSelected).unwrap();
        let mut round = sel.start_game().unwrap();

        // Forest fire first: r thrives, K flounders.
        let mut totals = Vec::new();
        loop {
            round.select_action(id(1), ActionId::ReproduceQuickly).unwrap();
            round.select_action(id(2), ActionId::ReproduceQuickly).unwrap();
            let results = round.end_round().unwrap();
            if results.outcome().round == 1 {
                assert_eq!(results.outcome().winners.as_slice(), &[id(2)]);
                assert_eq!(results.state().player(id(1)).unwrap().population, 100);
            }
            match results.complete_round() {
                Advance::NextRound(next) => {
                    totals.push(next.state().player(id(1)).unwrap().population);
                    round = next;
                }
                Advance::Complete(done) => {
                    let k = done.state().player(id(1)).unwrap();
                    assert!(k.population >= 0);
                    assert_eq!(done.state().history().len(), 12);
                    break;
                }
            }
        }
        assert_eq!(totals[0], 90);
        assert!(totals.iter().all(|p| *p >= 0));
    }

    #[test]
    fn session_queries_follow_phase() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let round = selection(&[]).start_game_autofill(&mut rng).unwrap();
        let session = GameSession::from(round);
        assert_eq!(session.current_scenario().unwrap().id, "forest-fire");
        assert!(session.last_outcome().is_none());
        let GameSession::RoundInProgress(round) = session else {
            panic!("expected round in progress");
        };
        let results = play_round(round, ActionId::ColonizeQuickly);
        let session = GameSession::from(results);
        assert_eq!(session.last_outcome().unwrap().round, 1);
        assert_eq!(session.total_rounds(), 4);
        assert!(session.state().history().is_empty());
    }

    #[test]
    fn rejected_displays_underlying_error() {
        let rejected = selection(&[]).start_game().unwrap_err();
        assert!(rejected.to_string().starts_with("game cannot start"));
        let as_error: &dyn std::error::Error = &rejected;
        assert!(as_error.source().is_some());
    }
}
