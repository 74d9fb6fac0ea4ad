//! Confirmation quorum for communal actions.
//!
//! Participants opt in to an action; once enough have confirmed, every
//! pending confirmation is dropped and the action's effect is applied. The
//! host may skip the wait with `force`.

use super::{AppState, SecretCatalog};
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;
use serde::Serialize;

/// What a confirmation (or override) led to
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    Pending {
        action: CommunalAction,
        count: usize,
        required: usize,
    },
    Executed {
        action: CommunalAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<RoundResult>,
    },
}

impl ConfirmOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}

impl Room {
    /// Confirmations needed before `action` fires
    pub fn required_confirmations(&self, action: CommunalAction) -> usize {
        match action {
            CommunalAction::Start | CommunalAction::NextRound => self.players.len(),
            CommunalAction::VotePhase | CommunalAction::NextClue | CommunalAction::ShowResults => {
                self.alive_count()
            }
        }
    }

    pub fn confirmation_count(&self, action: CommunalAction) -> usize {
        self.confirmations.get(&action).map_or(0, |set| set.len())
    }

    /// Guard checks shared by `confirm` and `force`
    fn check_participant(&self, player_id: &str, action: CommunalAction) -> GameResult<()> {
        self.check_guard(action)?;
        if action.requires_alive() {
            self.require_alive(player_id)?;
        } else {
            self.require_player(player_id)?;
        }
        Ok(())
    }

    pub fn confirm<R: Rng + ?Sized>(
        &mut self,
        player_id: &str,
        action: CommunalAction,
        catalog: &SecretCatalog,
        rng: &mut R,
    ) -> GameResult<ConfirmOutcome> {
        self.check_participant(player_id, action)?;

        let required = self.required_confirmations(action);
        let set = self.confirmations.entry(action).or_default();
        if set.contains(player_id) {
            return Ok(ConfirmOutcome::Pending {
                action,
                count: set.len(),
                required,
            });
        }
        set.insert(player_id.to_string());
        let count = set.len();

        if count < required {
            self.bump();
            tracing::debug!(
                room_id = %self.id,
                player_id = %player_id,
                action = %action,
                count,
                required,
                "Confirmation recorded"
            );
            return Ok(ConfirmOutcome::Pending {
                action,
                count,
                required,
            });
        }

        // Quorum reached. Stale confirmations from any other action must not
        // carry over into the next phase.
        self.confirmations.clear();
        let result = self.apply_action(action, catalog, rng)?;
        Ok(ConfirmOutcome::Executed { action, result })
    }

    /// Host override: apply `action` now, regardless of confirmations
    pub fn force<R: Rng + ?Sized>(
        &mut self,
        player_id: &str,
        action: CommunalAction,
        catalog: &SecretCatalog,
        rng: &mut R,
    ) -> GameResult<ConfirmOutcome> {
        self.check_participant(player_id, action)?;
        if player_id != self.host_id {
            return Err(GameError::Unauthorized(format!(
                "Only the host can force {}",
                action
            )));
        }

        self.confirmations.remove(&action);
        tracing::info!(room_id = %self.id, action = %action, "Host forced action");
        let result = self.apply_action(action, catalog, rng)?;
        Ok(ConfirmOutcome::Executed { action, result })
    }
}

impl AppState {
    /// Opt in to a communal action
    pub async fn confirm(
        &self,
        room_id: &str,
        player_id: &str,
        action: CommunalAction,
    ) -> GameResult<ConfirmOutcome> {
        self.with_room(room_id, |room| {
            let mut rng = rand::rng();
            room.confirm(player_id, action, &self.catalog, &mut rng)
        })
        .await
    }

    /// Apply a communal action immediately (host only)
    pub async fn force(
        &self,
        room_id: &str,
        player_id: &str,
        action: CommunalAction,
    ) -> GameResult<ConfirmOutcome> {
        self.with_room(room_id, |room| {
            let mut rng = rand::rng();
            room.force(player_id, action, &self.catalog, &mut rng)
        })
        .await
    }
}
