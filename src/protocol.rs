//! Request and response bodies for the HTTP API

use crate::state::RoomRoster;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub player: RosterEntry,
    pub players: Vec<RosterEntry>,
}

impl JoinResponse {
    pub fn new(player: RosterEntry, roster: RoomRoster) -> Self {
        Self {
            player,
            players: roster.players,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueRequest {
    pub player_id: PlayerId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub voter_id: PlayerId,
    pub target_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player_id: PlayerId,
    pub action: CommunalAction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerQuery {
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_on_the_wire() {
        let req: ActionRequest =
            serde_json::from_str(r#"{"player_id": "p1", "action": "votePhase"}"#).unwrap();
        assert_eq!(req.action, CommunalAction::VotePhase);

        let req: ActionRequest =
            serde_json::from_str(r#"{"player_id": "p1", "action": "showResults"}"#).unwrap();
        assert_eq!(req.action, CommunalAction::ShowResults);

        assert!(serde_json::from_str::<ActionRequest>(
            r#"{"player_id": "p1", "action": "explode"}"#
        )
        .is_err());
    }
}
