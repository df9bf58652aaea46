use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::OFFLINE_THRESHOLD_SECS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First five characters of the id, used for guest display names.
    pub fn short(&self) -> String {
        self.0.to_string()[..5].to_string()
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side in a game.  Serialized as `"w"` / `"b"` to match FEN conventions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// Lifecycle status of a game session.
///
/// Transitions only move forward: `Waiting -> Ongoing -> <terminal>`.
/// Once a terminal status is reached no operation may leave it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
    ThreefoldRepetition,
    InsufficientMaterial,
    Abandoned,
}

impl GameStatus {
    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting | Self::Ongoing)
    }

    /// Whether the game still counts against the active-session ceiling.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::Ongoing)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Waiting => "waiting",
            Self::Ongoing => "ongoing",
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
            Self::ThreefoldRepetition => "threefold_repetition",
            Self::InsufficientMaterial => "insufficient_material",
            Self::Abandoned => "abandoned",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a finished game from one player's perspective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    /// Derive a player's result from the winning color, if any.
    pub fn from_winner(winner: Option<Color>, own_color: Color) -> Self {
        match winner {
            Some(w) if w == own_color => Self::Win,
            Some(_) => Self::Loss,
            None => Self::Draw,
        }
    }
}

/// One of the two player positions in a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

/// A single in-game chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub player_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(player_id: PlayerId, player_name: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            player_name,
            text,
            sent_at: Utc::now(),
        }
    }
}

/// A pending friend request, kept on the receiving player's record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRequest {
    pub from_id: PlayerId,
    pub from_name: String,
}

/// A pending game invitation, kept on the invited player's record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameInvitation {
    pub from_id: PlayerId,
    pub from_name: String,
    pub game_id: GameId,
}

/// A move as submitted by a client.  Legality is decided by the rules
/// engine, never here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveInput {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
}

/// Derived presence; never stored, always computed from the last heartbeat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    pub fn from_last_seen(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now - last_seen < Duration::seconds(OFFLINE_THRESHOLD_SECS) {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

/// Listing row for the player directory and friend lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub status: Presence,
}
