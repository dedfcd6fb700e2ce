//! Session and scoring configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    AUTO_ASSIGN_SPECIES_CAP, BASELINE_POPULATION_DELTA, BASELINE_SCORE, DEFAULT_ROSTER_SIZE,
    DEFAULT_TOTAL_ROUNDS, MAX_ROSTER_SIZE, MAX_ROUND_SCORE, MAX_TOTAL_ROUNDS, STARTING_POPULATION,
};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
}

/// How the scoring engine treats a player with no recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingActionPolicy {
    /// Award the baseline score and population delta with no explanation.
    #[default]
    Baseline,
    /// Refuse to score the round.
    Reject,
}

/// Fallback used by auto-assignment once every species has hit the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapOverflow {
    /// Pick uniformly among the species with the fewest players.
    #[default]
    LeastUsed,
    /// Pick uniformly among all species.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub missing_action: MissingActionPolicy,
    #[serde(default = "ScoringConfig::default_baseline_score")]
    pub baseline_score: i32,
    #[serde(default = "ScoringConfig::default_baseline_delta")]
    pub baseline_delta: i32,
}

impl ScoringConfig {
    const fn default_baseline_score() -> i32 {
        BASELINE_SCORE
    }

    const fn default_baseline_delta() -> i32 {
        BASELINE_POPULATION_DELTA
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            missing_action: MissingActionPolicy::default(),
            baseline_score: Self::default_baseline_score(),
            baseline_delta: Self::default_baseline_delta(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_roster_size")]
    pub roster_size: usize,
    #[serde(default = "GameConfig::default_total_rounds")]
    pub total_rounds: u32,
    #[serde(default = "GameConfig::default_starting_population")]
    pub starting_population: i32,
    /// Most players any species may receive from auto-assignment.
    #[serde(default = "GameConfig::default_species_cap")]
    pub species_cap: usize,
    #[serde(default)]
    pub cap_overflow: CapOverflow,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl GameConfig {
    const fn default_roster_size() -> usize {
        DEFAULT_ROSTER_SIZE
    }

    const fn default_total_rounds() -> u32 {
        DEFAULT_TOTAL_ROUNDS
    }

    const fn default_starting_population() -> i32 {
        STARTING_POPULATION
    }

    const fn default_species_cap() -> usize {
        AUTO_ASSIGN_SPECIES_CAP
    }

    /// Parse a configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_roster_size(mut self, roster_size: usize) -> Self {
        self.roster_size = roster_size;
        self
    }

    #[must_use]
    pub fn with_total_rounds(mut self, total_rounds: u32) -> Self {
        self.total_rounds = total_rounds;
        self
    }

    #[must_use]
    pub fn with_missing_action(mut self, policy: MissingActionPolicy) -> Self {
        self.scoring.missing_action = policy;
        self
    }

    /// # Errors
    ///
    /// Returns the first field found outside its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "roster_size",
            usize_as_i64(self.roster_size),
            1,
            usize_as_i64(MAX_ROSTER_SIZE),
        )?;
        check_range(
            "total_rounds",
            i64::from(self.total_rounds),
            1,
            i64::from(MAX_TOTAL_ROUNDS),
        )?;
        check_range(
            "starting_population",
            i64::from(self.starting_population),
            0,
            i64::from(i32::MAX),
        )?;
        check_range(
            "species_cap",
            usize_as_i64(self.species_cap),
            1,
            usize_as_i64(MAX_ROSTER_SIZE),
        )?;
        check_range(
            "scoring.baseline_score",
            i64::from(self.scoring.baseline_score),
            0,
            i64::from(MAX_ROUND_SCORE),
        )?;
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            roster_size: Self::default_roster_size(),
            total_rounds: Self::default_total_rounds(),
            starting_population: Self::default_starting_population(),
            species_cap: Self::default_species_cap(),
            cap_overflow: CapOverflow::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn usize_as_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}
