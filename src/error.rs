//! Errors returned by room operations.
//!
//! Every failure is reported synchronously and leaves the room untouched:
//! guards run to completion before any mutation.

use crate::types::{PlayerId, RoomId};

/// Result type for room operations
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("{0}")]
    PhaseViolation(String),

    #[error("Player {0} has been eliminated")]
    EliminatedPlayer(PlayerId),

    #[error("Room {room_id} is full ({capacity} players)")]
    CapacityExceeded { room_id: RoomId, capacity: usize },

    #[error("Player {0} has already voted")]
    DuplicateVote(PlayerId),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    MalformedInput(String),
}

impl GameError {
    /// Stable machine-readable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            Self::PhaseViolation(_) => "PHASE_VIOLATION",
            Self::EliminatedPlayer(_) => "ELIMINATED_PLAYER",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::DuplicateVote(_) => "DUPLICATE_VOTE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            GameError::RoomNotFound("ABCDE".to_string()).code(),
            "ROOM_NOT_FOUND"
        );
        assert_eq!(
            GameError::CapacityExceeded {
                room_id: "ABCDE".to_string(),
                capacity: 3
            }
            .code(),
            "CAPACITY_EXCEEDED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = GameError::CapacityExceeded {
            room_id: "ABCDE".to_string(),
            capacity: 3,
        };
        assert_eq!(err.to_string(), "Room ABCDE is full (3 players)");
    }
}
