//! Error taxonomy for session, round and scoring operations.
use thiserror::Error;

use crate::state::PlayerId;

/// Failures surfaced by core game operations.
///
/// Every variant is a caller or data-integrity bug; nothing here is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("player {player} is not in the roster")]
    UnknownPlayer { player: PlayerId },
    #[error("round cannot be finalized, waiting on {}", join_ids(.missing))]
    ActionsPending { missing: Vec<PlayerId> },
    #[error("game cannot start, no species for {}", join_ids(.players))]
    SpeciesUnassigned { players: Vec<PlayerId> },
    #[error("player {player} submitted no action")]
    MissingAction { player: PlayerId },
    #[error("{kind} '{id}' not found in catalog")]
    CatalogLookupMiss { kind: &'static str, id: String },
}

fn join_ids(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_list_offending_players() {
        let err = GameError::ActionsPending {
            missing: vec![PlayerId::new(2), PlayerId::new(5)],
        };
        assert_eq!(
            err.to_string(),
            "round cannot be finalized, waiting on player-2, player-5"
        );
        let err = GameError::UnknownPlayer {
            player: PlayerId::new(9),
        };
        assert_eq!(err.to_string(), "player player-9 is not in the roster");
    }
}
