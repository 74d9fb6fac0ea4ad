use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;

impl Room {
    /// Record a written clue from a living participant
    pub fn submit_clue(&mut self, player_id: &str, text: &str) -> GameResult<Clue> {
        if self.phase != Phase::Clues {
            return Err(GameError::PhaseViolation(format!(
                "Clues can only be written during the clues phase, not {}",
                self.phase
            )));
        }
        self.require_alive(player_id)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::MalformedInput("Clue must not be empty".to_string()));
        }
        if text.chars().count() > self.config.max_clue_chars {
            return Err(GameError::MalformedInput(format!(
                "Clue must be at most {} characters",
                self.config.max_clue_chars
            )));
        }

        let clue = Clue {
            author_id: player_id.to_string(),
            text: text.to_string(),
            ts: chrono::Utc::now().to_rfc3339(),
        };
        self.clues.push(clue.clone());
        self.bump();
        Ok(clue)
    }
}

impl AppState {
    pub async fn submit_clue(
        &self,
        room_id: &str,
        player_id: &str,
        text: &str,
    ) -> GameResult<Clue> {
        self.with_room(room_id, |room| {
            let clue = room.submit_clue(player_id, text)?;
            tracing::info!(
                room_id = %room.id,
                player_id = %player_id,
                clues = room.clues.len(),
                "Clue submitted"
            );
            Ok(clue)
        })
        .await
    }
}
