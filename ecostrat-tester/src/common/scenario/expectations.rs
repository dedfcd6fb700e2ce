//! Invariant checks run against a finished simulation.
use anyhow::{Result, ensure};
use ecostrat_game::{Classification, GamePhase, PlayerId, ScoreTier, score_choice};
use std::collections::BTreeMap;

use crate::logic::SimulationSummary;

pub fn game_completed(summary: &SimulationSummary) -> Result<()> {
    let rounds = summary.config.total_rounds as usize;
    ensure!(
        summary.history.len() == rounds,
        "expected {rounds} rounds in history, found {}",
        summary.history.len()
    );
    ensure!(
        summary.standings.rounds_played == rounds,
        "standings report {} rounds played",
        summary.standings.rounds_played
    );
    for (idx, outcome) in summary.history.iter().enumerate() {
        ensure!(
            outcome.round as usize == idx + 1,
            "history entry {idx} is round {}",
            outcome.round
        );
    }
    Ok(())
}

pub fn phases_monotonic(summary: &SimulationSummary) -> Result<()> {
    let mut expected = vec![GamePhase::Waiting, GamePhase::SpeciesSelection];
    for _ in 0..summary.config.total_rounds {
        expected.push(GamePhase::RoundInProgress);
        expected.push(GamePhase::RoundResults);
    }
    expected.push(GamePhase::GameComplete);
    ensure!(
        summary.phases == expected,
        "phase trace {:?} does not follow the lifecycle",
        summary.phases
    );
    Ok(())
}

pub fn winners_hold_top_score(summary: &SimulationSummary) -> Result<()> {
    for outcome in &summary.history {
        let top = outcome.top_score();
        let expected: Vec<PlayerId> = summary
            .players
            .iter()
            .map(|p| p.id)
            .filter(|id| outcome.result(*id).map(|r| r.score) == top)
            .collect();
        ensure!(
            outcome.winners.as_slice() == expected.as_slice(),
            "round {} winners {:?} but max scorers are {:?}",
            outcome.round,
            outcome.winners,
            expected
        );
        ensure!(
            !outcome.actions.is_empty() && !outcome.winners.is_empty(),
            "round {} recorded actions but no winners",
            outcome.round
        );
    }
    Ok(())
}

/// Rescore every recorded choice and compare against the fixed payout table.
pub fn scoring_table(summary: &SimulationSummary) -> Result<()> {
    for outcome in &summary.history {
        for player in &summary.players {
            let species = player
                .species
                .ok_or_else(|| anyhow::anyhow!("{} finished without a species", player.id))?;
            let Some(choice) = outcome.actions.get(&player.id) else {
                anyhow::bail!("round {} has no action for {}", outcome.round, player.id);
            };
            let recorded = outcome
                .result(player.id)
                .ok_or_else(|| anyhow::anyhow!("round {} has no result for {}", outcome.round, player.id))?;
            let rescored = score_choice(&summary.catalog, &outcome.scenario, species, choice.action)?;
            ensure!(
                *recorded == rescored,
                "round {} {}: recorded {:?} but rescoring gives {:?}",
                outcome.round,
                player.id,
                recorded,
                rescored
            );
            let class = Classification::of(
                outcome.scenario.favors(species),
                summary.catalog.is_suitable(choice.action, species),
            );
            let tier = class.tier();
            let payout = class.payout();
            ensure!(
                recorded.tier == tier
                    && recorded.score == payout.score
                    && recorded.population_delta == payout.population_delta,
                "round {} {}: {:?} does not match {:?}",
                outcome.round,
                player.id,
                recorded,
                payout
            );
        }
    }
    Ok(())
}

pub fn scenario_cycle(summary: &SimulationSummary) -> Result<()> {
    let len = u32::try_from(summary.catalog.scenario_count())?;
    for outcome in &summary.history {
        let expected = summary.catalog.scenario_at(outcome.round);
        ensure!(
            outcome.scenario.id == expected.id,
            "round {} used '{}', expected '{}'",
            outcome.round,
            outcome.scenario.id,
            expected.id
        );
        ensure!(
            summary.catalog.scenario_at(outcome.round + len).id == expected.id,
            "scenario sequence does not repeat after {len} rounds"
        );
    }
    Ok(())
}

pub fn population_floor(summary: &SimulationSummary) -> Result<()> {
    let mut population: BTreeMap<PlayerId, i32> = BTreeMap::new();
    for outcome in &summary.history {
        for player in &summary.players {
            let entry = population
                .entry(player.id)
                .or_insert(summary.config.starting_population);
            if let Some(result) = outcome.result(player.id) {
                *entry = entry.saturating_add(result.population_delta).max(0);
            }
            ensure!(*entry >= 0, "{} dropped below zero", player.id);
        }
    }
    for player in &summary.players {
        let replayed = population
            .get(&player.id)
            .copied()
            .unwrap_or(summary.config.starting_population);
        ensure!(
            player.population == replayed,
            "{} ended with {} but replay gives {}",
            player.id,
            player.population,
            replayed
        );
    }
    Ok(())
}

/// Auto-assignment never pushes a species past the cap while room remains.
/// Manual picks may exceed it; they are left alone.
pub fn auto_assign_cap(summary: &SimulationSummary) -> Result<()> {
    let cap = summary.config.species_cap;
    let mut totals = BTreeMap::new();
    for player in &summary.players {
        let Some(species) = player.species else {
            anyhow::bail!("{} was never assigned a species", player.id);
        };
        *totals.entry(species).or_insert(0_usize) += 1;
    }
    let mut auto = BTreeMap::new();
    for (_, species) in &summary.auto_assigned {
        *auto.entry(*species).or_insert(0_usize) += 1;
    }
    let free_slots: usize = summary
        .catalog
        .species()
        .iter()
        .map(|s| {
            let manual = totals.get(&s.id).copied().unwrap_or(0)
                - auto.get(&s.id).copied().unwrap_or(0);
            cap.saturating_sub(manual)
        })
        .sum();
    let room = summary.auto_assigned.len() <= free_slots;
    for (species, picked) in &auto {
        ensure!(
            *picked <= cap || !room,
            "{species} auto-assigned {picked} times with cap {cap}"
        );
        let total = totals.get(species).copied().unwrap_or(0);
        ensure!(
            total <= cap || !room,
            "{species} reached {total} players after auto-assignment with cap {cap}"
        );
    }
    Ok(())
}

pub fn standings_consistent(summary: &SimulationSummary) -> Result<()> {
    let standings = &summary.standings;
    let winner_slots: usize = summary.history.iter().map(|o| o.winners.len()).sum();
    ensure!(
        standings.total_round_wins() as usize == winner_slots,
        "standings tally {} wins, history has {winner_slots}",
        standings.total_round_wins()
    );
    for window in standings.standings.windows(2) {
        ensure!(
            window[0].player.total_score >= window[1].player.total_score,
            "standings not sorted by score"
        );
        ensure!(
            window[0].rank <= window[1].rank,
            "ranks out of order"
        );
    }
    for player in &summary.players {
        let earned: i32 = summary
            .history
            .iter()
            .filter_map(|o| o.result(player.id))
            .map(|r| r.score)
            .sum();
        ensure!(
            player.total_score == earned,
            "{} total {} but rounds sum to {earned}",
            player.id,
            player.total_score
        );
    }
    Ok(())
}

pub fn adaptive_tiers(summary: &SimulationSummary) -> Result<()> {
    tiers_within(summary, &[ScoreTier::Excellent, ScoreTier::Solid])
}

pub fn contrarian_tiers(summary: &SimulationSummary) -> Result<()> {
    tiers_within(summary, &[ScoreTier::Good, ScoreTier::Challenging])
}

fn tiers_within(summary: &SimulationSummary, allowed: &[ScoreTier]) -> Result<()> {
    for outcome in &summary.history {
        for (player, result) in &outcome.results {
            ensure!(
                allowed.contains(&result.tier),
                "round {} {player} landed in {:?}",
                outcome.round,
                result.tier
            );
        }
    }
    Ok(())
}
