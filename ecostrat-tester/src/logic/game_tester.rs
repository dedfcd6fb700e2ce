use std::sync::Arc;

use anyhow::{Context, Result};
use ecostrat_game::{
    Catalog, FinalStandings, GameConfig, GamePhase, GameSession, Player, PlayerId, RoundOutcome,
    SpeciesId, SpeciesSelection, seeded_rng,
};

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

/// Species picks made before auto-assignment fills the rest.
type SelectionSetup = fn(&mut SpeciesSelection) -> Result<()>;

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub rounds: Option<u32>,
    pub names: Vec<String>,
    pub setup: Option<fn(&mut GameConfig)>,
    pub selection: Option<SelectionSetup>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            rounds: None,
            names: Vec::new(),
            setup: None,
            selection: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameConfig)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SelectionSetup) -> Self {
        self.selection = Some(selection);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the failure reported by the wrapped check.
    pub fn check(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Everything observed while playing one seeded game to completion.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub config: GameConfig,
    pub catalog: Arc<Catalog>,
    /// `GameSession::phase()` after every transition, starting in `waiting`.
    pub phases: Vec<GamePhase>,
    pub auto_assigned: Vec<(PlayerId, SpeciesId)>,
    pub history: Vec<RoundOutcome>,
    pub players: Vec<Player>,
    pub standings: FinalStandings,
}

impl SimulationSummary {
    #[must_use]
    pub fn champion_label(&self) -> String {
        self.standings.champion().map_or_else(
            || "none".to_string(),
            |s| format!("{} ({})", s.player.name, s.player.total_score),
        )
    }
}

/// Headless deterministic runner for the core game logic.
#[derive(Clone)]
pub struct GameTester {
    verbose: bool,
    config: GameConfig,
    rounds_override: Option<u32>,
    catalog: Arc<Catalog>,
}

impl GameTester {
    #[must_use]
    pub fn new(config: GameConfig, verbose: bool) -> Self {
        Self {
            verbose,
            config,
            rounds_override: None,
            catalog: Catalog::builtin(),
        }
    }

    #[must_use]
    pub const fn with_rounds_override(mut self, rounds: Option<u32>) -> Self {
        self.rounds_override = rounds;
        self
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    fn config_for(&self, plan: &SimulationPlan) -> GameConfig {
        let mut config = self.config.clone();
        if let Some(setup) = plan.setup {
            setup(&mut config);
        }
        if let Some(rounds) = self.rounds_override.or(plan.rounds) {
            config.total_rounds = rounds;
        }
        config
    }

    /// Play one full game with the plan's strategy for every seat.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the session refuses a transition.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let config = self.config_for(plan);
        let mut session = GameSession::new(config.clone(), Arc::clone(&self.catalog))
            .context("invalid simulation config")?;
        let mut phases = vec![session.phase()];
        let mut rng = seeded_rng(seed);
        let mut auto_assigned = Vec::new();
        let mut policies: Vec<Box<dyn PlayerPolicy + Send>> = Vec::new();

        let done = loop {
            session = match session {
                GameSession::Waiting(lobby) => {
                    lobby.register_players(plan.names.as_slice()).into()
                }
                GameSession::SpeciesSelection(mut selection) => {
                    if let Some(select) = plan.selection {
                        select(&mut selection).context("species selection setup failed")?;
                    }
                    auto_assigned = selection.auto_assign_remaining(&mut rng);
                    let round = selection
                        .start_game()
                        .map_err(|rejected| rejected.error)
                        .context("game failed to start")?;
                    policies = round
                        .controller()
                        .seats()
                        .iter()
                        .map(|seat| {
                            plan.strategy
                                .create_policy(seed ^ u64::from(seat.player.get()))
                        })
                        .collect();
                    if self.verbose {
                        log::info!(
                            "seed {seed}: {} players, {} rounds, strategy {}",
                            config.roster_size,
                            config.total_rounds,
                            plan.strategy
                        );
                    }
                    round.into()
                }
                GameSession::RoundInProgress(mut round) => {
                    let seats = round.controller().seats().to_vec();
                    for (seat, policy) in seats.iter().zip(policies.iter_mut()) {
                        let decision =
                            policy.pick_action(&self.catalog, round.scenario(), seat.species);
                        log::trace!(
                            "{} plays {} ({})",
                            seat.player,
                            decision.action,
                            policy.name()
                        );
                        round.select_action(seat.player, decision.action)?;
                        if let Some(text) = decision.rationale.as_deref() {
                            round.set_reasoning(seat.player, text)?;
                        }
                    }
                    let results = round
                        .end_round()
                        .map_err(|rejected| rejected.error)
                        .context("round did not finalize")?;
                    log::debug!(
                        "round {} winners {:?}",
                        results.outcome().round,
                        results.outcome().winners
                    );
                    results.into()
                }
                GameSession::RoundResults(results) => results.complete_round().into(),
                GameSession::Complete(done) => break done,
            };
            phases.push(session.phase());
        };

        let summary = SimulationSummary {
            seed,
            strategy: plan.strategy,
            config,
            catalog: Arc::clone(&self.catalog),
            phases,
            auto_assigned,
            history: done.state().history().to_vec(),
            players: done.state().players().to_vec(),
            standings: done.final_standings(),
        };
        if self.verbose {
            log::info!("seed {seed}: champion {}", summary.champion_label());
        }
        Ok(summary)
    }
}
