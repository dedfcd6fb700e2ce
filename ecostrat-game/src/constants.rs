//! Centralized balance and tuning constants for EcoStrat game logic.
//!
//! The scoring payouts are a fixed contract shared with course material, so
//! they live here rather than in the JSON configuration.

// Session defaults ---------------------------------------------------------
pub const DEFAULT_ROSTER_SIZE: usize = 8;
pub const DEFAULT_TOTAL_ROUNDS: u32 = 4;
pub const STARTING_POPULATION: i32 = 100;
pub const AUTO_ASSIGN_SPECIES_CAP: usize = 2;
pub const MAX_ROSTER_SIZE: usize = 64;
pub const MAX_TOTAL_ROUNDS: u32 = 64;

// Scoring payouts ----------------------------------------------------------
pub const EXCELLENT_SCORE: i32 = 100;
pub const EXCELLENT_POPULATION_DELTA: i32 = 30;
pub const GOOD_SCORE: i32 = 80;
pub const GOOD_POPULATION_DELTA: i32 = 15;
pub const SOLID_SCORE: i32 = 70;
pub const SOLID_POPULATION_DELTA: i32 = 5;
pub const CHALLENGING_SCORE: i32 = 30;
pub const CHALLENGING_POPULATION_DELTA: i32 = -10;
pub const BASELINE_SCORE: i32 = 50;
pub const BASELINE_POPULATION_DELTA: i32 = 0;
pub const MAX_ROUND_SCORE: i32 = 100;

// Naming -------------------------------------------------------------------
pub(crate) const DEFAULT_PLAYER_NAME_PREFIX: &str = "Player";
pub(crate) const PLAYER_ID_PREFIX: &str = "player-";
