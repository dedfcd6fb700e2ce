//! Static reference data: species strategies, environmental scenarios and actions.
//!
//! The catalog is loaded once from the embedded JSON asset and shared read-only
//! between sessions. Identifiers are closed enums; only external JSON can carry
//! an unknown tag, and that is rejected at parse time.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/catalog.json");

/// Errors raised while loading or validating catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown {kind} tag '{tag}'")]
    UnknownTag { kind: &'static str, tag: String },
    #[error("{kind} '{id}' is defined more than once")]
    Duplicate { kind: &'static str, id: String },
    #[error("{kind} '{id}' is missing from the catalog")]
    Missing { kind: &'static str, id: String },
    #[error("catalog defines no scenarios")]
    NoScenarios,
}

/// Life-history strategy a player can adopt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeciesId {
    #[serde(rename = "r-selected")]
    RSelected,
    #[serde(rename = "K-selected")]
    KSelected,
    #[serde(rename = "C-competitive")]
    Competitive,
    #[serde(rename = "S-stress-tolerant")]
    StressTolerant,
    #[serde(rename = "R-ruderal")]
    Ruderal,
}

impl SpeciesId {
    pub const ALL: [Self; 5] = [
        Self::RSelected,
        Self::KSelected,
        Self::Competitive,
        Self::StressTolerant,
        Self::Ruderal,
    ];

    /// Wire tag used in catalog data and reports.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::RSelected => "r-selected",
            Self::KSelected => "K-selected",
            Self::Competitive => "C-competitive",
            Self::StressTolerant => "S-stress-tolerant",
            Self::Ruderal => "R-ruderal",
        }
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SpeciesId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.tag() == tag)
            .ok_or_else(|| CatalogError::UnknownTag {
                kind: "species",
                tag: tag.to_string(),
            })
    }
}

/// Broad environment classification attached to each scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentTag {
    StableMature,
    Disturbed,
    ResourceRich,
    ResourcePoor,
    Variable,
}

impl EnvironmentTag {
    pub const ALL: [Self; 5] = [
        Self::StableMature,
        Self::Disturbed,
        Self::ResourceRich,
        Self::ResourcePoor,
        Self::Variable,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::StableMature => "stable-mature",
            Self::Disturbed => "disturbed",
            Self::ResourceRich => "resource-rich",
            Self::ResourcePoor => "resource-poor",
            Self::Variable => "variable",
        }
    }
}

impl fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Decision a player can take during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionId {
    ReproduceQuickly,
    InvestInOffspring,
    CompeteAggressively,
    ConserveResources,
    ColonizeQuickly,
    BuildDefenses,
    FormPartnerships,
    WaitAndObserve,
}

impl ActionId {
    pub const ALL: [Self; 8] = [
        Self::ReproduceQuickly,
        Self::InvestInOffspring,
        Self::CompeteAggressively,
        Self::ConserveResources,
        Self::ColonizeQuickly,
        Self::BuildDefenses,
        Self::FormPartnerships,
        Self::WaitAndObserve,
    ];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ReproduceQuickly => "reproduce-quickly",
            Self::InvestInOffspring => "invest-in-offspring",
            Self::CompeteAggressively => "compete-aggressively",
            Self::ConserveResources => "conserve-resources",
            Self::ColonizeQuickly => "colonize-quickly",
            Self::BuildDefenses => "build-defenses",
            Self::FormPartnerships => "form-partnerships",
            Self::WaitAndObserve => "wait-and-observe",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ActionId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.tag() == tag)
            .ok_or_else(|| CatalogError::UnknownTag {
                kind: "action",
                tag: tag.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub preferred_environments: Vec<String>,
    /// Actions this strategy is built for.
    #[serde(default)]
    pub strategies: Vec<ActionId>,
    /// Opaque theme token for the presentation layer.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub environment: EnvironmentTag,
    #[serde(default)]
    pub image_prompt: String,
    /// Strategies favored by this environment.
    #[serde(default)]
    pub advantaged: Vec<SpeciesId>,
    #[serde(default)]
    pub explanation: String,
}

impl Scenario {
    #[must_use]
    pub fn favors(&self, species: SpeciesId) -> bool {
        self.advantaged.contains(&species)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suitable_for: Vec<SpeciesId>,
}

impl Action {
    #[must_use]
    pub fn suits(&self, species: SpeciesId) -> bool {
        self.suitable_for.contains(&species)
    }
}

/// Read-only lookup tables for every piece of reference data.
///
/// Every value has passed [`Catalog::validate`]; deserializing goes through
/// the same check, so lookups by tag and by round never come up empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct Catalog {
    species: Vec<Species>,
    scenarios: Vec<Scenario>,
    actions: Vec<Action>,
}

/// Unchecked wire shape of a [`Catalog`].
#[derive(Debug, Deserialize)]
struct RawCatalog {
    species: Vec<Species>,
    scenarios: Vec<Scenario>,
    actions: Vec<Action>,
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        let catalog = Self {
            species: raw.species,
            scenarios: raw.scenarios,
            actions: raw.actions,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

impl Catalog {
    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the data fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Catalog shipped with the crate, parsed once per process.
    ///
    /// # Panics
    ///
    /// Panics if the embedded asset is malformed, which is a build defect.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<Catalog>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                Arc::new(Self::from_json(DEFAULT_CATALOG_DATA).expect("valid embedded catalog"))
            })
            .clone()
    }

    /// Check every tag is defined exactly once and at least one scenario exists.
    ///
    /// # Errors
    ///
    /// Returns the first integrity violation found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        ensure_unique_and_complete(
            "species",
            self.species.iter().map(|s| s.id),
            &SpeciesId::ALL,
        )?;
        ensure_unique_and_complete("action", self.actions.iter().map(|a| a.id), &ActionId::ALL)?;
        if self.scenarios.is_empty() {
            return Err(CatalogError::NoScenarios);
        }
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(CatalogError::Duplicate {
                    kind: "scenario",
                    id: scenario.id.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn species_by_type(&self, id: SpeciesId) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn action_by_type(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn scenario_by_id(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Scenario used for a 1-based round number; the sequence repeats every
    /// `scenario_count()` rounds. Round 0 is treated as round 1.
    #[must_use]
    pub fn scenario_at(&self, round: u32) -> &Scenario {
        let offset = usize::try_from(round.max(1) - 1).unwrap_or(0);
        &self.scenarios[offset % self.scenarios.len()]
    }

    #[must_use]
    pub fn is_suitable(&self, action: ActionId, species: SpeciesId) -> bool {
        self.action_by_type(action)
            .is_some_and(|entry| entry.suits(species))
    }

    pub fn suitable_actions(&self, species: SpeciesId) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.suits(species))
    }

    #[must_use]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }
}

fn ensure_unique_and_complete<T>(
    kind: &'static str,
    ids: impl Iterator<Item = T>,
    expected: &[T],
) -> Result<(), CatalogError>
where
    T: Copy + Eq + std::hash::Hash + fmt::Display,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::Duplicate {
                kind,
                id: id.to_string(),
            });
        }
    }
    match expected.iter().find(|id| !seen.contains(*id)) {
        Some(missing) => Err(CatalogError::Missing {
            kind,
            id: missing.to_string(),
        }),
        None => Ok(()),
    }
}
