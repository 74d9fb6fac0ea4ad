mod clue;
mod phase;
mod quorum;
mod roles;
mod room;
mod snapshot;
mod vote;

pub use quorum::ConfirmOutcome;
pub use roles::SecretCatalog;
pub use room::JoinOutcome;
pub use snapshot::{ActionStatus, PlayerView, RoomSnapshot, SecretView, ViewerInfo};

use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random room code (5 characters)
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Registry of live rooms.
///
/// The map lock only guards lookup, insertion and eviction. Each room sits
/// behind its own mutex, held for the whole of any operation on it.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>>,
    pub catalog: Arc<SecretCatalog>,
    pub room_config: RoomConfig,
}

/// Returned by `create` and `join`
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoomRoster {
    pub room_id: RoomId,
    pub players: Vec<RosterEntry>,
    pub phase: Phase,
    pub host_id: PlayerId,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_catalog(SecretCatalog::builtin(), RoomConfig::default())
    }

    pub fn with_catalog(catalog: SecretCatalog, room_config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            catalog: Arc::new(catalog),
            room_config,
        }
    }

    /// Create a room with one participant per name
    pub async fn create_room(&self, names: &[String]) -> GameResult<RoomRoster> {
        let mut rooms = self.rooms.write().await;

        // Collisions are retried (extremely rare with 28M combinations)
        let room_id = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let room = Room::new(room_id.clone(), names, self.room_config.clone())?;
        let roster = RoomRoster::from(&room);
        rooms.insert(room_id.clone(), Arc::new(Mutex::new(room)));

        tracing::info!(
            room_id = %room_id,
            players = roster.players.len(),
            "Room created"
        );
        Ok(roster)
    }

    /// Look up a room handle
    pub async fn room(&self, room_id: &str) -> GameResult<Arc<Mutex<Room>>> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| GameError::RoomNotFound(room_id.to_string()))
    }

    /// Run `f` against the room with its lock held.
    ///
    /// `f` is synchronous, so the guard-check-then-mutate sequence it performs
    /// can never interleave with another operation on the same room.
    pub async fn with_room<T>(
        &self,
        room_id: &str,
        f: impl FnOnce(&mut Room) -> GameResult<T>,
    ) -> GameResult<T> {
        let handle = self.room(room_id).await?;
        let mut room = handle.lock().await;

        // The room may have been evicted while we waited for its lock
        let still_registered = self
            .rooms
            .read()
            .await
            .get(room_id)
            .is_some_and(|current| Arc::ptr_eq(current, &handle));
        if !still_registered {
            return Err(GameError::RoomNotFound(room_id.to_string()));
        }

        room.touch();
        f(&mut room)
    }

    /// Join by display name, returning the participant and the roster
    pub async fn join_room(
        &self,
        room_id: &str,
        name: &str,
    ) -> GameResult<(RosterEntry, RoomRoster)> {
        self.with_room(room_id, |room| {
            let (player_id, outcome) = room.join(name)?;
            let player = room.require_player(&player_id)?;
            let entry = RosterEntry::from(player);
            match outcome {
                JoinOutcome::Created => tracing::info!(
                    room_id = %room.id,
                    player_id = %entry.id,
                    "Player {} joined",
                    entry.name
                ),
                JoinOutcome::Rejoined => tracing::debug!(
                    room_id = %room.id,
                    player_id = %entry.id,
                    "Player {} rejoined",
                    entry.name
                ),
            }
            Ok((entry, RoomRoster::from(&*room)))
        })
        .await
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Remove rooms that have been idle for longer than `max_idle`.
    /// Returns the number of rooms evicted.
    pub async fn evict_idle_rooms(&self, max_idle: Duration) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|room_id, handle| {
            // A room that is locked right now is in use
            let Ok(room) = handle.try_lock() else {
                return true;
            };
            let keep = room.last_activity.elapsed() < max_idle;
            if !keep {
                tracing::info!(room_id = %room_id, "Evicting idle room");
            }
            keep
        });
        before - rooms.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Room> for RoomRoster {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.clone(),
            players: room.players.iter().map(RosterEntry::from).collect(),
            phase: room.phase,
            host_id: room.host_id.clone(),
        }
    }
}
