//! Externally visible room snapshots.
//!
//! `RoomSnapshot::project` is the only way room state leaves the server. It
//! strips roles and secrets from everyone except the requesting participant,
//! and exposes the secret target only through `SecretView`.

use super::AppState;
use crate::error::GameResult;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Public display fields of a secret target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretView {
    pub name: String,
    pub category: Option<String>,
}

impl From<&SecretTarget> for SecretView {
    fn from(t: &SecretTarget) -> Self {
        Self {
            name: t.name.clone(),
            category: t.category.clone(),
        }
    }
}

/// A participant as everyone sees them (no role, no secret)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub is_host: bool,
}

/// What only the requesting participant gets to see about themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerInfo {
    pub player_id: PlayerId,
    pub role: Option<Role>,
    pub secret: Option<SecretView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStatus {
    pub action: CommunalAction,
    pub count: usize,
    pub required: usize,
    pub confirmed_by: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub version: u64,
    pub phase: Phase,
    pub round_no: u32,
    pub clue_round: u32,
    pub players: Vec<PlayerView>,
    pub expected_player_count: usize,
    pub host_id: PlayerId,
    pub clues: Vec<Clue>,
    pub votes: Vec<Vote>,
    pub awaiting_action: Option<AwaitingAction>,
    pub confirmations: Vec<ActionStatus>,
    pub valid_actions: Vec<CommunalAction>,
    pub game_over: bool,
    pub impostor_won: bool,
    pub last_result: Option<RoundResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub you: Option<ViewerInfo>,
    pub server_now: String,
}

impl RoomSnapshot {
    /// Project the room for `viewer`, or for an anonymous observer
    pub fn project(room: &Room, viewer: Option<&str>) -> Self {
        let players = room
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                alive: p.alive,
                is_host: p.id == room.host_id,
            })
            .collect();

        let you = viewer.and_then(|id| room.player(id)).map(|p| {
            let secret = match (&p.assigned_secret, &room.secret_target) {
                (Some(assigned), Some(target)) if *assigned == target.id => {
                    Some(SecretView::from(target))
                }
                _ => None,
            };
            ViewerInfo {
                player_id: p.id.clone(),
                role: p.role,
                secret,
            }
        });

        let confirmations = CommunalAction::ALL
            .into_iter()
            .map(|action| ActionStatus {
                action,
                count: room.confirmation_count(action),
                required: room.required_confirmations(action),
                confirmed_by: room
                    .confirmations
                    .get(&action)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            room_id: room.id.clone(),
            version: room.version,
            phase: room.phase,
            round_no: room.round_no,
            clue_round: room.clue_round,
            players,
            expected_player_count: room.expected_player_count,
            host_id: room.host_id.clone(),
            clues: room.clues.clone(),
            votes: room.votes.clone(),
            awaiting_action: room.awaiting_action,
            confirmations,
            valid_actions: room.valid_actions(),
            game_over: room.game_over,
            impostor_won: room.impostor_won,
            last_result: room.last_result.clone(),
            you,
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn action(&self, action: CommunalAction) -> Option<&ActionStatus> {
        self.confirmations.iter().find(|s| s.action == action)
    }
}

impl AppState {
    /// Current snapshot of a room, as seen by `viewer`
    pub async fn get_state(&self, room_id: &str, viewer: Option<&str>) -> GameResult<RoomSnapshot> {
        self.with_room(room_id, |room| Ok(RoomSnapshot::project(room, viewer)))
            .await
    }
}
