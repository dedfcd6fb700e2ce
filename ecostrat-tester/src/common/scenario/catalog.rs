use anyhow::Result;
use ecostrat_game::{CapOverflow, PlayerId, SpeciesId, SpeciesSelection};

use super::expectations::{
    adaptive_tiers, auto_assign_cap, contrarian_tiers, game_completed, phases_monotonic,
    population_floor, scenario_cycle, scoring_table, standings_consistent,
    winners_hold_top_score,
};
use crate::logic::{GameplayStrategy, SimulationPlan};

/// A named, runnable logic scenario.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub plan: SimulationPlan,
}

impl CatalogEntry {
    fn new(key: &'static str, name: &'static str, plan: SimulationPlan) -> Self {
        Self { key, name, plan }
    }
}

fn lifecycle_plan(strategy: GameplayStrategy) -> SimulationPlan {
    SimulationPlan::new(strategy)
        .with_expectation(game_completed)
        .with_expectation(phases_monotonic)
        .with_expectation(standings_consistent)
}

fn preassign_k_selected(selection: &mut SpeciesSelection) -> Result<()> {
    selection.assign_species(PlayerId::new(1), SpeciesId::KSelected)?;
    selection.assign_species(PlayerId::new(2), SpeciesId::KSelected)?;
    Ok(())
}

pub fn catalog_scenarios() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            "smoke",
            "Smoke Test",
            lifecycle_plan(GameplayStrategy::Stubborn),
        ),
        CatalogEntry::new(
            "full-game",
            "Full Scenario Cycle",
            lifecycle_plan(GameplayStrategy::Adaptive)
                .with_rounds(8)
                .with_names(&["Alice", "", "Bob"])
                .with_expectation(winners_hold_top_score)
                .with_expectation(population_floor),
        ),
        CatalogEntry::new(
            "scoring-table",
            "Scoring Table Verification",
            SimulationPlan::new(GameplayStrategy::Random)
                .with_rounds(8)
                .with_expectation(scoring_table)
                .with_expectation(winners_hold_top_score),
        ),
        CatalogEntry::new(
            "auto-assign-cap",
            "Auto-Assign Species Cap",
            SimulationPlan::new(GameplayStrategy::Random)
                .with_selection(preassign_k_selected)
                .with_expectation(auto_assign_cap),
        ),
        CatalogEntry::new(
            "scenario-cycle",
            "Scenario Cycle Wraparound",
            SimulationPlan::new(GameplayStrategy::Stubborn)
                .with_rounds(20)
                .with_expectation(scenario_cycle)
                .with_expectation(game_completed),
        ),
        CatalogEntry::new(
            "population-floor",
            "Population Floor Under Pressure",
            SimulationPlan::new(GameplayStrategy::Contrarian)
                .with_rounds(24)
                .with_setup(|config| {
                    config.starting_population = 20;
                    config.roster_size = 16;
                    config.cap_overflow = CapOverflow::Uniform;
                })
                .with_expectation(population_floor)
                .with_expectation(standings_consistent),
        ),
        CatalogEntry::new(
            "strategy-adaptive",
            "Adaptive Strategy",
            lifecycle_plan(GameplayStrategy::Adaptive).with_expectation(adaptive_tiers),
        ),
        CatalogEntry::new(
            "strategy-contrarian",
            "Contrarian Strategy",
            lifecycle_plan(GameplayStrategy::Contrarian).with_expectation(contrarian_tiers),
        ),
        CatalogEntry::new(
            "strategy-random",
            "Random Strategy",
            lifecycle_plan(GameplayStrategy::Random).with_expectation(winners_hold_top_score),
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<CatalogEntry> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}
