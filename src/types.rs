use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Instant;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type SecretId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Clues,
    Voting,
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Clues => write!(f, "clues"),
            Self::Voting => write!(f, "voting"),
            Self::Results => write!(f, "results"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Impostor,
    Crew,
}

/// Actions gated behind a confirmation quorum (or a host override)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CommunalAction {
    Start,
    VotePhase,
    NextClue,
    NextRound,
    ShowResults,
}

impl CommunalAction {
    pub const ALL: [CommunalAction; 5] = [
        Self::Start,
        Self::VotePhase,
        Self::NextClue,
        Self::NextRound,
        Self::ShowResults,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::VotePhase => "votePhase",
            Self::NextClue => "nextClue",
            Self::NextRound => "nextRound",
            Self::ShowResults => "showResults",
        }
    }
}

impl fmt::Display for CommunalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the results phase is waiting on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AwaitingAction {
    NextClue,
    NextRound,
}

impl From<AwaitingAction> for CommunalAction {
    fn from(a: AwaitingAction) -> Self {
        match a {
            AwaitingAction::NextClue => CommunalAction::NextClue,
            AwaitingAction::NextRound => CommunalAction::NextRound,
        }
    }
}

/// An entry from the secret catalog. Only `SecretView` ever leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretTarget {
    pub id: SecretId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    /// Shared secret for crew members, `None` for the impostor and the eliminated
    pub assigned_secret: Option<SecretId>,
    pub alive: bool,
}

impl Player {
    pub fn new(name: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            role: None,
            assigned_secret: None,
            alive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub author_id: PlayerId,
    pub text: String,
    pub ts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub voter_id: PlayerId,
    pub target_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyEntry {
    pub target_id: PlayerId,
    pub votes: u32,
}

/// Outcome of a results computation. Never carries the impostor's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub message: String,
    pub success: bool,
    pub game_over: bool,
    pub impostor_won: bool,
    /// Set only when an innocent participant was voted out
    pub eliminated: Option<PlayerId>,
    pub votes: Vec<Vote>,
    pub tally: Vec<TallyEntry>,
    pub players: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

impl From<&Player> for RosterEntry {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            alive: p.alive,
        }
    }
}

/// Limits applied to every room
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub max_room_capacity: usize,
    pub max_name_chars: usize,
    pub max_clue_chars: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_room_capacity: 16,
            max_name_chars: 24,
            max_clue_chars: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub phase: Phase,
    /// Join order, never reordered or shrunk
    pub players: Vec<Player>,
    pub secret_target: Option<SecretTarget>,
    pub clues: Vec<Clue>,
    /// Cast order, at most one entry per voter
    pub votes: Vec<Vote>,
    pub confirmations: BTreeMap<CommunalAction, BTreeSet<PlayerId>>,
    pub host_id: PlayerId,
    pub awaiting_action: Option<AwaitingAction>,
    pub game_over: bool,
    pub impostor_won: bool,
    pub expected_player_count: usize,
    pub last_result: Option<RoundResult>,
    pub version: u64,
    pub round_no: u32,
    pub clue_round: u32,
    pub config: RoomConfig,
    pub last_activity: Instant,
}
