//! # gambit-core
//!
//! The coordination engine for live two-player chess sessions.
//!
//! Every piece of mutable state (player profile, game session, matchmaking
//! queue, name lock, party code, history ledger, match mailbox) is an
//! independently addressed entity in the record store.  [`Entities`] gives
//! each `(kind, key)` its own mutex so a load-compute-persist sequence never
//! races another on the same key, while unrelated keys proceed in parallel.
//!
//! [`Coordinator`] is the operations surface: the HTTP adapter calls it and
//! nothing else.  Chess legality lives behind the `gambit-rules` boundary;
//! the coordinator trusts its verdicts.

pub mod coordinator;
pub mod entities;
pub mod games;
pub mod history;
pub mod identity;
pub mod matchmaking;
pub mod party;
pub mod players;

mod error;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use entities::{Entities, RecordKind};
pub use error::{CoreError, ErrorKind};
pub use matchmaking::MatchOutcome;
