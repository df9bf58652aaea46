//! # gambit-shared
//!
//! Domain types shared by every Gambit crate: identifiers, the game state
//! model, social-graph records, constants, and credential hashing.
//!
//! This crate is deliberately free of I/O so that the coordination core and
//! the HTTP adapter agree on one vocabulary without dragging storage or
//! transport dependencies into either.

pub mod constants;
pub mod credentials;
pub mod records;
pub mod types;

pub use records::{GameRecord, GameSummary, PlayerRecord, PlayerView};
pub use types::*;
