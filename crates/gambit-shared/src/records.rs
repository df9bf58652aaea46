//! Persisted record types.
//!
//! Every struct here is the full durable state of one entity key in the
//! record store.  Mutation helpers keep the list invariants (no duplicate
//! friend requests, invitations unique per game) in one place so the
//! coordination core cannot drift from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ChatMessage, Color, FriendRequest, GameId, GameInvitation, GameResult, GameStatus, PlayerId,
    Presence, Seat,
};
use crate::constants::START_POSITION;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player profile, keyed by player id.
///
/// Presence is never stored; it is derived from `last_seen` at read time.
/// Records are created on registration or guest bootstrap and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    /// Salted credential hash; `None` for guest accounts.
    pub credential: Option<String>,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Last heartbeat.  New players start at the epoch, i.e. offline until
    /// their first heartbeat.
    pub last_seen: DateTime<Utc>,
    /// Weak back-reference to the game the player is currently in.
    pub current_game: Option<GameId>,
    pub friends: Vec<PlayerId>,
    pub incoming_friend_requests: Vec<FriendRequest>,
    pub sent_friend_requests: Vec<PlayerId>,
    pub incoming_invitations: Vec<GameInvitation>,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, name: String, credential: Option<String>) -> Self {
        Self {
            id,
            name,
            credential,
            games_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            last_seen: DateTime::UNIX_EPOCH,
            current_game: None,
            friends: Vec::new(),
            incoming_friend_requests: Vec::new(),
            sent_friend_requests: Vec::new(),
            incoming_invitations: Vec::new(),
        }
    }

    /// Record a heartbeat.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    pub fn presence(&self, now: DateTime<Utc>) -> Presence {
        Presence::from_last_seen(self.last_seen, now)
    }

    /// Apply one finished game to the cumulative counters.
    pub fn apply_result(&mut self, result: GameResult) {
        self.games_played += 1;
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Draw => self.draws += 1,
        }
    }

    /// Add an incoming friend request; duplicates by sender are ignored.
    pub fn add_friend_request(&mut self, request: FriendRequest) {
        if !self
            .incoming_friend_requests
            .iter()
            .any(|r| r.from_id == request.from_id)
        {
            self.incoming_friend_requests.push(request);
        }
    }

    pub fn remove_friend_request(&mut self, from_id: PlayerId) {
        self.incoming_friend_requests.retain(|r| r.from_id != from_id);
    }

    pub fn add_sent_request(&mut self, to_id: PlayerId) {
        if !self.sent_friend_requests.contains(&to_id) {
            self.sent_friend_requests.push(to_id);
        }
    }

    pub fn remove_sent_request(&mut self, to_id: PlayerId) {
        self.sent_friend_requests.retain(|id| *id != to_id);
    }

    pub fn add_friend(&mut self, friend_id: PlayerId) {
        if !self.friends.contains(&friend_id) {
            self.friends.push(friend_id);
        }
    }

    pub fn remove_friend(&mut self, friend_id: PlayerId) {
        self.friends.retain(|id| *id != friend_id);
    }

    /// Add a game invitation; duplicates by game id are ignored.
    pub fn add_invitation(&mut self, invitation: GameInvitation) {
        if !self
            .incoming_invitations
            .iter()
            .any(|i| i.game_id == invitation.game_id)
        {
            self.incoming_invitations.push(invitation);
        }
    }

    pub fn remove_invitation(&mut self, game_id: GameId) {
        self.incoming_invitations.retain(|i| i.game_id != game_id);
    }

    /// Public view of the profile: credential stripped, presence derived.
    pub fn view(&self, now: DateTime<Utc>) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            games_played: self.games_played,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            status: self.presence(now),
            current_game: self.current_game,
            friends: self.friends.clone(),
            incoming_friend_requests: self.incoming_friend_requests.clone(),
            sent_friend_requests: self.sent_friend_requests.clone(),
            incoming_invitations: self.incoming_invitations.clone(),
        }
    }
}

/// What the API returns for a profile.  Same shape as [`PlayerRecord`] minus
/// the credential hash, plus the derived presence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub status: Presence,
    pub current_game: Option<GameId>,
    pub friends: Vec<PlayerId>,
    pub incoming_friend_requests: Vec<FriendRequest>,
    pub sent_friend_requests: Vec<PlayerId>,
    pub incoming_invitations: Vec<GameInvitation>,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One game session, keyed by game id.
///
/// The white seat is fixed at creation; the black seat fills at most once.
/// `position` is an opaque FEN string owned by the rules engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub position: String,
    pub turn: Color,
    pub status: GameStatus,
    /// Accepted moves in SAN, append-only.
    pub history: Vec<String>,
    pub white: Seat,
    pub black: Option<Seat>,
    pub winner: Option<Color>,
    pub chat: Vec<ChatMessage>,
    pub party_code: Option<String>,
    /// Color that has a draw offer pending, if any.
    pub draw_offer: Option<Color>,
}

impl GameRecord {
    /// A fresh game awaiting a second player.
    pub fn new(id: GameId, host: Seat) -> Self {
        Self {
            id,
            position: START_POSITION.to_string(),
            turn: Color::White,
            status: GameStatus::Waiting,
            history: Vec::new(),
            white: host,
            black: None,
            winner: None,
            chat: Vec::new(),
            party_code: None,
            draw_offer: None,
        }
    }

    /// A matchmade game that starts with both seats filled.
    pub fn new_paired(id: GameId, white: Seat, black: Seat) -> Self {
        let mut game = Self::new(id, white);
        game.black = Some(black);
        game.status = GameStatus::Ongoing;
        game
    }

    /// The color a player occupies, if seated.
    pub fn color_of(&self, player_id: PlayerId) -> Option<Color> {
        if self.white.id == player_id {
            Some(Color::White)
        } else if self.black.as_ref().is_some_and(|s| s.id == player_id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn seat(&self, color: Color) -> Option<&Seat> {
        match color {
            Color::White => Some(&self.white),
            Color::Black => self.black.as_ref(),
        }
    }

    /// Both seats, or `None` while the game is still waiting for black.
    pub fn seats(&self) -> Option<(&Seat, &Seat)> {
        self.black.as_ref().map(|black| (&self.white, black))
    }
}

// ---------------------------------------------------------------------------
// History ledger
// ---------------------------------------------------------------------------

/// One row in a player's game history ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: GameId,
    pub white_name: String,
    pub black_name: String,
    pub result: GameResult,
    pub end_status: GameStatus,
    pub ended_at: DateTime<Utc>,
}
