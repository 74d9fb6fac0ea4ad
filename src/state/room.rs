use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

/// Normalize a display name for comparison (trim whitespace, lowercase)
pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate a display name against the room limits, returning the trimmed name
fn clean_name(name: &str, config: &RoomConfig) -> GameResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GameError::MalformedInput(
            "Display name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > config.max_name_chars {
        return Err(GameError::MalformedInput(format!(
            "Display name must be at most {} characters",
            config.max_name_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// What `join` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Created,
    Rejoined,
}

impl Room {
    /// Build a lobby with one participant per name; the first name hosts.
    pub fn new(id: RoomId, names: &[String], config: RoomConfig) -> GameResult<Self> {
        if names.is_empty() {
            return Err(GameError::MalformedInput(
                "A room needs at least one player".to_string(),
            ));
        }
        if names.len() > config.max_room_capacity {
            return Err(GameError::MalformedInput(format!(
                "A room holds at most {} players",
                config.max_room_capacity
            )));
        }

        let mut seen = HashSet::new();
        let mut players = Vec::with_capacity(names.len());
        for name in names {
            let name = clean_name(name, &config)?;
            if !seen.insert(normalize(&name)) {
                return Err(GameError::MalformedInput(format!(
                    "Duplicate display name: {}",
                    name
                )));
            }
            players.push(Player::new(name));
        }

        let host_id = players[0].id.clone();
        Ok(Self {
            id,
            phase: Phase::Lobby,
            expected_player_count: players.len(),
            players,
            secret_target: None,
            clues: Vec::new(),
            votes: Vec::new(),
            confirmations: BTreeMap::new(),
            host_id,
            awaiting_action: None,
            game_over: false,
            impostor_won: false,
            last_result: None,
            version: 1,
            round_no: 0,
            clue_round: 0,
            config,
            last_activity: Instant::now(),
        })
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let wanted = normalize(name);
        self.players.iter().find(|p| normalize(&p.name) == wanted)
    }

    pub(crate) fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub(crate) fn require_player(&self, player_id: &str) -> GameResult<&Player> {
        self.player(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))
    }

    pub(crate) fn require_alive(&self, player_id: &str) -> GameResult<&Player> {
        let player = self.require_player(player_id)?;
        if !player.alive {
            return Err(GameError::EliminatedPlayer(player_id.to_string()));
        }
        Ok(player)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn impostor(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.role == Some(Role::Impostor))
    }

    /// Join by display name. A name already in the room (case-insensitive)
    /// hands back that participant unchanged, in any phase.
    pub fn join(&mut self, name: &str) -> GameResult<(PlayerId, JoinOutcome)> {
        let name = clean_name(name, &self.config)?;
        if let Some(existing) = self.player_by_name(&name) {
            return Ok((existing.id.clone(), JoinOutcome::Rejoined));
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::PhaseViolation(format!(
                "Cannot join a game in the {} phase",
                self.phase
            )));
        }
        if self.players.len() >= self.expected_player_count {
            return Err(GameError::CapacityExceeded {
                room_id: self.id.clone(),
                capacity: self.expected_player_count,
            });
        }

        let player = Player::new(name);
        let id = player.id.clone();
        self.players.push(player);
        self.bump();
        Ok((id, JoinOutcome::Created))
    }

    /// Drop clues, votes and every pending confirmation
    pub(crate) fn clear_round_scope(&mut self) {
        self.clues.clear();
        self.votes.clear();
        self.confirmations.clear();
    }

    /// Record a successful mutation
    pub(crate) fn bump(&mut self) {
        self.version += 1;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn room(list: &[&str]) -> Room {
        Room::new("ROOM1".to_string(), &names(list), RoomConfig::default()).unwrap()
    }

    #[test]
    fn test_new_room_first_name_hosts() {
        let room = room(&["Alice", "Bob", "Cara"]);

        assert_eq!(room.phase, Phase::Lobby);
        assert_eq!(room.expected_player_count, 3);
        assert_eq!(room.players.len(), 3);
        assert_eq!(room.host_id, room.players[0].id);
        assert!(room.players.iter().all(|p| p.alive && p.role.is_none()));
    }

    #[test]
    fn test_new_room_rejects_bad_names() {
        let config = RoomConfig::default();
        assert!(matches!(
            Room::new("R".to_string(), &[], config.clone()),
            Err(GameError::MalformedInput(_))
        ));
        assert!(matches!(
            Room::new("R".to_string(), &names(&["Alice", "  "]), config.clone()),
            Err(GameError::MalformedInput(_))
        ));
        assert!(matches!(
            Room::new("R".to_string(), &names(&["Alice", "ALICE "]), config.clone()),
            Err(GameError::MalformedInput(_))
        ));

        let too_many: Vec<String> = (0..=config.max_room_capacity)
            .map(|i| format!("p{}", i))
            .collect();
        assert!(matches!(
            Room::new("R".to_string(), &too_many, config),
            Err(GameError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_join_existing_name_is_idempotent() {
        let mut room = room(&["Alice", "Bob"]);
        let bob = room.players[1].id.clone();
        let version = room.version;

        let (id, outcome) = room.join(" bOB ").unwrap();

        assert_eq!(id, bob);
        assert_eq!(outcome, JoinOutcome::Rejoined);
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.version, version);
    }

    #[test]
    fn test_join_at_capacity_fails() {
        let mut room = room(&["Alice", "Bob"]);

        let err = room.join("Cara").unwrap_err();

        assert!(matches!(err, GameError::CapacityExceeded { capacity: 2, .. }));
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn test_join_outside_lobby_fails_for_new_names() {
        let mut room = room(&["Alice", "Bob"]);
        room.expected_player_count = 3;
        room.phase = Phase::Clues;

        assert!(matches!(
            room.join("Cara"),
            Err(GameError::PhaseViolation(_))
        ));
        // Known names still get their participant back
        assert!(room.join("alice").is_ok());
    }

    #[test]
    fn test_require_alive() {
        let mut room = room(&["Alice", "Bob"]);
        let bob = room.players[1].id.clone();
        room.player_mut(&bob).unwrap().alive = false;

        assert!(matches!(
            room.require_alive(&bob),
            Err(GameError::EliminatedPlayer(_))
        ));
        assert!(matches!(
            room.require_alive("nobody"),
            Err(GameError::PlayerNotFound(_))
        ));
        assert_eq!(room.alive_count(), 1);
    }
}
