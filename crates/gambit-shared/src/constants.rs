/// Seconds without a heartbeat before a player counts as offline.
pub const OFFLINE_THRESHOLD_SECS: i64 = 120;

/// Characters allowed in party codes.  0/O and I/1 lookalikes are excluded
/// so codes survive being read aloud or scribbled on paper.
pub const PARTY_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a party code.
pub const PARTY_CODE_LEN: usize = 5;

/// Default ceiling on concurrently active (waiting + ongoing) games.
/// Matchmaking reports `Full` above this; existing games are unaffected.
pub const DEFAULT_MAX_ACTIVE_GAMES: usize = 50;

/// Most-recent game summaries retained per player.
pub const HISTORY_CAP: usize = 50;

/// Standard chess starting position.
pub const START_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Username length bounds for registration.
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 15;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Default HTTP API port (server).
pub const DEFAULT_HTTP_PORT: u16 = 8080;
