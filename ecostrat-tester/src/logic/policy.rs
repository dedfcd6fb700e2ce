use std::fmt;

use ecostrat_game::{ActionId, Catalog, Scenario, SpeciesId};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: ActionId,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub const fn new(action: ActionId, rationale: Option<String>) -> Self {
        Self { action, rationale }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick an action for one player in the current scenario.
    fn pick_action(
        &mut self,
        catalog: &Catalog,
        scenario: &Scenario,
        species: SpeciesId,
    ) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    /// Always plays an action that suits the species.
    Adaptive,
    /// Plays an action that does not suit the species whenever one exists.
    Contrarian,
    Random,
    /// Always the first catalog action.
    Stubborn,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adaptive => "Adaptive",
            Self::Contrarian => "Contrarian",
            Self::Random => "Random",
            Self::Stubborn => "Stubborn",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Adaptive => Box::new(AdaptivePolicy),
            Self::Contrarian => Box::new(ContrarianPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Stubborn => Box::new(StubbornPolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AdaptivePolicy;
struct ContrarianPolicy;
struct StubbornPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn first_action(catalog: &Catalog) -> ActionId {
    catalog
        .actions()
        .first()
        .map_or(ActionId::WaitAndObserve, |a| a.id)
}

impl PlayerPolicy for AdaptivePolicy {
    fn name(&self) -> &'static str {
        "Adaptive"
    }

    fn pick_action(
        &mut self,
        catalog: &Catalog,
        scenario: &Scenario,
        species: SpeciesId,
    ) -> PolicyDecision {
        let favored = scenario.favors(species);
        let action = catalog
            .suitable_actions(species)
            .next()
            .map_or_else(|| first_action(catalog), |a| a.id);
        let rationale = if favored {
            format!("{} favors {species}, pressing the advantage", scenario.name)
        } else {
            format!("playing to {species} strengths")
        };
        PolicyDecision::new(action, Some(rationale))
    }
}

impl PlayerPolicy for ContrarianPolicy {
    fn name(&self) -> &'static str {
        "Contrarian"
    }

    fn pick_action(
        &mut self,
        catalog: &Catalog,
        _scenario: &Scenario,
        species: SpeciesId,
    ) -> PolicyDecision {
        let action = catalog
            .actions()
            .iter()
            .find(|a| !a.suits(species))
            .map_or_else(|| first_action(catalog), |a| a.id);
        PolicyDecision::new(action, None)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_action(
        &mut self,
        catalog: &Catalog,
        _scenario: &Scenario,
        _species: SpeciesId,
    ) -> PolicyDecision {
        let action = catalog
            .actions()
            .choose(&mut self.rng)
            .map_or_else(|| first_action(catalog), |a| a.id);
        PolicyDecision::new(action, None)
    }
}

impl PlayerPolicy for StubbornPolicy {
    fn name(&self) -> &'static str {
        "Stubborn"
    }

    fn pick_action(
        &mut self,
        catalog: &Catalog,
        _scenario: &Scenario,
        _species: SpeciesId,
    ) -> PolicyDecision {
        PolicyDecision::new(first_action(catalog), Some("same as always".to_string()))
    }
}
