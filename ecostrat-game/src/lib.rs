//! EcoStrat Game Engine
//!
//! Platform-agnostic core logic for the EcoStrat ecological strategy game:
//! species and scenario catalog, round scoring and the typed session state
//! machine. No UI, transport or persistence lives here.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod numbers;
pub mod round;
pub mod scoring;
pub mod session;
pub mod standings;
pub mod state;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use thiserror::Error;

// Re-export commonly used types
pub use catalog::{
    Action, ActionId, Catalog, CatalogError, EnvironmentTag, Scenario, Species, SpeciesId,
};
pub use config::{CapOverflow, ConfigError, GameConfig, MissingActionPolicy, ScoringConfig};
pub use error::GameError;
pub use round::{RoundController, Seat, Submission};
pub use scoring::{
    ActionChoice, Classification, Entrant, Payout, PlayerResult, RoundOutcome, ScoreTier, WinnerSet,
    score_choice, score_round,
};
pub use session::{
    Advance, GameComplete, GameSession, Lobby, Rejected, RoundInProgress, RoundResults,
    SpeciesSelection,
};
pub use standings::{FinalStandings, RoundRecap, Standing};
pub use state::{GamePhase, GameState, Player, PlayerId, default_player_name};

const DEFAULT_GAME_CONFIG_DATA: &str = include_str!("../assets/game_config.json");

/// Deterministic RNG for auto-assignment and simulated play.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Trait for abstracting reference data loading.
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the species, scenario and action catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Arc<Catalog>, Self::Error>;

    /// Load configuration data by name
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Loader backed by the assets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogLoader for BuiltinCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Arc<Catalog>, Self::Error> {
        Ok(Catalog::builtin())
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        match config_name {
            "game" => Ok(serde_json::from_str(DEFAULT_GAME_CONFIG_DATA)?),
            other => Err(CatalogError::Missing {
                kind: "config",
                id: other.to_string(),
            }),
        }
    }
}

/// Failures while preparing a session from loaded data.
#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + 'static,
{
    #[error("loader failed")]
    Loader(#[source] E),
    #[error("game configuration is invalid")]
    Config(#[source] ConfigError),
}

/// Main game engine for creating sessions from loaded data
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new game engine with the provided loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and validate the named game configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails or a field is out of range.
    pub fn load_config(&self, config_name: &str) -> Result<GameConfig, EngineError<L::Error>> {
        let config: GameConfig = self
            .loader
            .load_config(config_name)
            .map_err(EngineError::Loader)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Open a lobby with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the config is out of range.
    pub fn new_lobby(&self, config: GameConfig) -> Result<Lobby, EngineError<L::Error>> {
        let catalog = self.loader.load_catalog().map_err(EngineError::Loader)?;
        log::debug!(
            "lobby ready: {} species, {} scenarios, {} actions",
            catalog.species().len(),
            catalog.scenario_count(),
            catalog.actions().len()
        );
        Lobby::new(config, catalog).map_err(EngineError::Config)
    }

    /// Open a session in the `waiting` phase.
    ///
    /// # Errors
    ///
    /// See [`Self::new_lobby`].
    pub fn new_session(&self, config: GameConfig) -> Result<GameSession, EngineError<L::Error>> {
        self.new_lobby(config).map(GameSession::from)
    }
}
