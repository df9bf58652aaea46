//! # gambit-rules
//!
//! The rules-engine boundary.  The coordination core never derives board
//! state itself; it hands the current position and a proposed move to a
//! [`RulesEngine`] and trusts the verdict, including any terminal status.
//!
//! [`StandardRules`] is the shakmaty-backed implementation used in
//! production; tests in other crates substitute their own engines where a
//! scripted verdict is easier to reason about.

mod standard;

pub use standard::StandardRules;

use gambit_shared::types::{Color, GameStatus, MoveInput};
use thiserror::Error;

/// Errors a rules engine can report for a proposed move.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The stored position string could not be parsed.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// The move was syntactically malformed (bad square names, bad
    /// promotion piece).
    #[error("malformed move: {0}")]
    MalformedMove(String),

    /// The move parsed but is not legal in this position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// How a finished game ended, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub status: GameStatus,
    /// `None` for drawn terminal statuses.
    pub winner: Option<Color>,
}

/// The engine's verdict on a legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Position after the move, in the engine's own serialization.
    pub new_position: String,
    /// The move in SAN, with check/mate suffix.
    pub notation: String,
    pub captured: bool,
    /// Side to move in the new position.
    pub side_to_move: Color,
    /// Set when the move ended the game.
    pub terminal: Option<Termination>,
}

/// Narrow contract between the coordination core and chess proper.
pub trait RulesEngine: Send + Sync {
    /// Validate `mv` against `position` and, if legal, return the applied
    /// verdict.  Must not carry state between calls; the position string is
    /// the entire input.
    fn apply(&self, position: &str, mv: &MoveInput) -> Result<Verdict, RulesError>;
}
