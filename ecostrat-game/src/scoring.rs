//! Round scoring.
//!
//! Scoring is a pure function of the scenario, each player's species and the
//! action they picked. Payouts follow a fixed four-way classification on
//! whether the scenario favors the species and whether the action suits it.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::catalog::{ActionId, Catalog, Scenario, SpeciesId};
use crate::config::{MissingActionPolicy, ScoringConfig};
use crate::constants::{
    CHALLENGING_POPULATION_DELTA, CHALLENGING_SCORE, EXCELLENT_POPULATION_DELTA, EXCELLENT_SCORE,
    GOOD_POPULATION_DELTA, GOOD_SCORE, SOLID_POPULATION_DELTA, SOLID_SCORE,
};
use crate::error::GameError;
use crate::state::PlayerId;

/// Round winners in roster order; most rounds have only a handful.
pub type WinnerSet = SmallVec<[PlayerId; 4]>;

/// Action a player committed to for the round, plus optional free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChoice {
    pub action: ActionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ActionChoice {
    #[must_use]
    pub const fn new(action: ActionId) -> Self {
        Self {
            action,
            reasoning: None,
        }
    }
}

/// Score and population change for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub score: i32,
    pub population_delta: i32,
}

/// Four-way classification of a species/action pairing against a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Favored species playing a suitable action.
    Excellent,
    /// Favored species, unsuitable action.
    Good,
    /// Unfavored species, suitable action.
    Solid,
    Challenging,
}

impl Classification {
    #[must_use]
    pub const fn of(advantaged: bool, suitable: bool) -> Self {
        match (advantaged, suitable) {
            (true, true) => Self::Excellent,
            (true, false) => Self::Good,
            (false, true) => Self::Solid,
            (false, false) => Self::Challenging,
        }
    }

    #[must_use]
    pub const fn payout(self) -> Payout {
        let (score, population_delta) = match self {
            Self::Excellent => (EXCELLENT_SCORE, EXCELLENT_POPULATION_DELTA),
            Self::Good => (GOOD_SCORE, GOOD_POPULATION_DELTA),
            Self::Solid => (SOLID_SCORE, SOLID_POPULATION_DELTA),
            Self::Challenging => (CHALLENGING_SCORE, CHALLENGING_POPULATION_DELTA),
        };
        Payout {
            score,
            population_delta,
        }
    }

    #[must_use]
    pub const fn tier(self) -> ScoreTier {
        match self {
            Self::Excellent => ScoreTier::Excellent,
            Self::Good => ScoreTier::Good,
            Self::Solid => ScoreTier::Solid,
            Self::Challenging => ScoreTier::Challenging,
        }
    }
}

/// Tier recorded on a player's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    Good,
    Solid,
    Challenging,
    /// No action recorded; paid from the configured baseline.
    NoAction,
}

impl ScoreTier {
    #[must_use]
    pub const fn classify(advantaged: bool, suitable: bool) -> Self {
        Classification::of(advantaged, suitable).tier()
    }

    /// The scored classification, `None` for [`ScoreTier::NoAction`].
    #[must_use]
    pub const fn classification(self) -> Option<Classification> {
        match self {
            Self::Excellent => Some(Classification::Excellent),
            Self::Good => Some(Classification::Good),
            Self::Solid => Some(Classification::Solid),
            Self::Challenging => Some(Classification::Challenging),
            Self::NoAction => None,
        }
    }

    /// Fixed payout for the four scored tiers. `NoAction` is configurable and has none.
    #[must_use]
    pub const fn payout(self) -> Option<Payout> {
        match self.classification() {
            Some(class) => Some(class.payout()),
            None => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent strategy",
            Self::Good => "good adaptation",
            Self::Solid => "solid choice",
            Self::Challenging => "challenging conditions",
            Self::NoAction => "no action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub score: i32,
    pub population_delta: i32,
    pub explanation: String,
    pub tier: ScoreTier,
}

/// One player's input to the scoring engine.
#[derive(Debug, Clone, Copy)]
pub struct Entrant<'a> {
    pub player: PlayerId,
    pub species: SpeciesId,
    pub choice: Option<&'a ActionChoice>,
}

/// Immutable record of a scored round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub scenario: Scenario,
    pub actions: BTreeMap<PlayerId, ActionChoice>,
    pub results: BTreeMap<PlayerId, PlayerResult>,
    pub winners: WinnerSet,
}

impl RoundOutcome {
    #[must_use]
    pub fn result(&self, player: PlayerId) -> Option<&PlayerResult> {
        self.results.get(&player)
    }

    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winners.contains(&player)
    }

    #[must_use]
    pub fn top_score(&self) -> Option<i32> {
        self.results.values().map(|r| r.score).max()
    }
}

/// Score every entrant against `scenario`.
///
/// Entrants are processed in slice order, which fixes the order of `winners`.
///
/// # Errors
///
/// Returns [`GameError::MissingAction`] when an entrant has no action under
/// [`MissingActionPolicy::Reject`], or [`GameError::CatalogLookupMiss`] when a
/// species or action is absent from the catalog.
pub fn score_round(
    catalog: &Catalog,
    config: &ScoringConfig,
    round: u32,
    scenario: &Scenario,
    entrants: &[Entrant<'_>],
) -> Result<RoundOutcome, GameError> {
    let mut actions = BTreeMap::new();
    let mut results = BTreeMap::new();
    let mut winners = WinnerSet::new();
    let mut best: Option<i32> = None;

    for entrant in entrants {
        let result = match entrant.choice {
            Some(choice) => {
                actions.insert(entrant.player, choice.clone());
                score_choice(catalog, scenario, entrant.species, choice.action)?
            }
            None => match config.missing_action {
                MissingActionPolicy::Baseline => baseline_result(config),
                MissingActionPolicy::Reject => {
                    return Err(GameError::MissingAction {
                        player: entrant.player,
                    });
                }
            },
        };

        match best {
            Some(top) if result.score < top => {}
            Some(top) if result.score == top => winners.push(entrant.player),
            _ => {
                best = Some(result.score);
                winners.clear();
                winners.push(entrant.player);
            }
        }
        results.insert(entrant.player, result);
    }

    log::debug!(
        "round {round} scored in '{}': top score {:?}, {} winner(s)",
        scenario.id,
        best,
        winners.len()
    );

    Ok(RoundOutcome {
        round,
        scenario: scenario.clone(),
        actions,
        results,
        winners,
    })
}

/// Score a single species/action pairing against a scenario.
///
/// # Errors
///
/// Returns [`GameError::CatalogLookupMiss`] if either id is absent from the catalog.
pub fn score_choice(
    catalog: &Catalog,
    scenario: &Scenario,
    species: SpeciesId,
    action: ActionId,
) -> Result<PlayerResult, GameError> {
    let species_info = catalog
        .species_by_type(species)
        .ok_or_else(|| GameError::CatalogLookupMiss {
            kind: "species",
            id: species.to_string(),
        })?;
    let action_info = catalog
        .action_by_type(action)
        .ok_or_else(|| GameError::CatalogLookupMiss {
            kind: "action",
            id: action.to_string(),
        })?;

    let class = Classification::of(scenario.favors(species), action_info.suits(species));
    let explanation = match class {
        Classification::Excellent => format!(
            "Excellent strategy! Your {} thrives in this environment using {}.",
            species_info.name.to_lowercase(),
            action_info.name.to_lowercase()
        ),
        Classification::Good => "Good adaptation! Your species is well-suited to this environment, though the action could be optimized.".to_string(),
        Classification::Solid => "Solid choice! While this environment is challenging, you played to your species' strengths.".to_string(),
        Classification::Challenging => "Challenging conditions. Your strategy doesn't align well with your species or this environment.".to_string(),
    };
    let Payout {
        score,
        population_delta,
    } = class.payout();

    Ok(PlayerResult {
        score,
        population_delta,
        explanation,
        tier: class.tier(),
    })
}

fn baseline_result(config: &ScoringConfig) -> PlayerResult {
    PlayerResult {
        score: config.baseline_score,
        population_delta: config.baseline_delta,
        explanation: String::new(),
        tier: ScoreTier::NoAction,
    }
}
