//! Final standings and aggregate statistics for a finished game.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{EnvironmentTag, SpeciesId};
use crate::numbers::mean_i32;
use crate::scoring::WinnerSet;
use crate::state::{GameState, Player, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Competition rank: tied scores share a rank and the next rank is skipped.
    pub rank: usize,
    pub player: Player,
    pub round_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecap {
    pub round: u32,
    pub scenario_id: String,
    pub scenario_name: String,
    pub environment: EnvironmentTag,
    pub advantaged: Vec<SpeciesId>,
    pub winners: WinnerSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalStandings {
    pub standings: Vec<Standing>,
    pub average_score: f64,
    pub distinct_species: usize,
    pub distinct_environments: usize,
    pub rounds_played: usize,
    pub round_recaps: Vec<RoundRecap>,
}

impl FinalStandings {
    /// Rank the roster by total score (stable on roster order) and tally history.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let history = state.history();

        let mut wins: BTreeMap<PlayerId, u32> = BTreeMap::new();
        for outcome in history {
            for winner in &outcome.winners {
                *wins.entry(*winner).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<&Player> = state.players().iter().collect();
        ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));

        let mut standings = Vec::with_capacity(ranked.len());
        let mut previous: Option<(i32, usize)> = None;
        for (idx, player) in ranked.into_iter().enumerate() {
            let rank = match previous {
                Some((score, rank)) if score == player.total_score => rank,
                _ => idx + 1,
            };
            previous = Some((player.total_score, rank));
            standings.push(Standing {
                rank,
                player: player.clone(),
                round_wins: wins.get(&player.id).copied().unwrap_or(0),
            });
        }

        let distinct_species = state
            .players()
            .iter()
            .filter_map(|p| p.species)
            .collect::<BTreeSet<_>>()
            .len();
        let distinct_environments = history
            .iter()
            .map(|outcome| outcome.scenario.environment)
            .collect::<BTreeSet<_>>()
            .len();
        let round_recaps = history
            .iter()
            .map(|outcome| RoundRecap {
                round: outcome.round,
                scenario_id: outcome.scenario.id.clone(),
                scenario_name: outcome.scenario.name.clone(),
                environment: outcome.scenario.environment,
                advantaged: outcome.scenario.advantaged.clone(),
                winners: outcome.winners.clone(),
            })
            .collect();

        Self {
            standings,
            average_score: mean_i32(state.players().iter().map(|p| p.total_score)),
            distinct_species,
            distinct_environments,
            rounds_played: history.len(),
            round_recaps,
        }
    }

    #[must_use]
    pub fn champion(&self) -> Option<&Standing> {
        self.standings.first()
    }

    #[must_use]
    pub fn wins_for(&self, player: PlayerId) -> u32 {
        self.standings
            .iter()
            .find(|s| s.player.id == player)
            .map_or(0, |s| s.round_wins)
    }

    #[must_use]
    pub fn total_round_wins(&self) -> u32 {
        self.standings.iter().map(|s| s.round_wins).sum()
    }
}
