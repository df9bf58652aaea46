//! # gambit-store
//!
//! The durable record store: key-addressed JSON state over SQLite.
//!
//! Every entity in the system (player, game, name lock, party code, history
//! ledger, matchmaking queue, mailbox) is one row in a single `records`
//! table, addressed by `(kind, key)`.  The store knows nothing about those
//! domains; it offers atomic per-key get/put and listing by kind.  The
//! read-modify-write serialization that makes concurrent mutation safe lives
//! one layer up, in `gambit-core`.

pub mod database;
pub mod migrations;
pub mod records;
pub mod store;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use store::RecordStore;
