use thiserror::Error;

use gambit_store::StoreError;

/// Broad failure categories, used by the HTTP adapter to pick a status code
/// and by tests to assert on behavior without matching exact variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity or key absent.
    NotFound,
    /// Uniqueness violation: name taken, game full.
    Conflict,
    /// Operation not valid for the current status.
    InvalidState,
    /// Malformed or rule-breaking input, rejected before any mutation.
    IllegalInput,
    /// Storage-layer fault; not a domain outcome.
    Internal,
}

/// Errors produced by coordinator operations.
///
/// Every variant is a deterministic outcome of domain rules and safe to
/// surface to the caller; a failed operation never leaves a partial write
/// behind.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("player not found")]
    PlayerNotFound,

    #[error("game not found")]
    GameNotFound,

    #[error("party code not found or has expired")]
    PartyNotFound,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username is already taken")]
    NameTaken,

    #[error("game is already full")]
    GameFull,

    #[error("waiting for opponent to join")]
    NotStarted,

    #[error("game is over")]
    GameOver,

    #[error("opponent has not joined yet")]
    OpponentAbsent,

    #[error("player is not in this game")]
    NotAParticipant,

    #[error("not your turn")]
    NotYourTurn,

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("malformed move: {0}")]
    MalformedMove(String),

    #[error("a draw offer is already pending")]
    OfferPending,

    #[error("no draw offer to respond to")]
    NoOffer,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored position failed to parse.  Indicates record corruption, not
    /// a caller mistake.
    #[error("corrupt position: {0}")]
    CorruptPosition(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound
            | Self::GameNotFound
            | Self::PartyNotFound
            | Self::InvalidCredentials => ErrorKind::NotFound,
            Self::NameTaken | Self::GameFull => ErrorKind::Conflict,
            Self::NotStarted
            | Self::GameOver
            | Self::OpponentAbsent
            | Self::NotAParticipant
            | Self::NotYourTurn
            | Self::OfferPending
            | Self::NoOffer => ErrorKind::InvalidState,
            Self::IllegalMove(_) | Self::MalformedMove(_) | Self::InvalidInput(_) => {
                ErrorKind::IllegalInput
            }
            Self::CorruptPosition(_) | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(CoreError::GameNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::NameTaken.kind(), ErrorKind::Conflict);
        assert_eq!(CoreError::NotYourTurn.kind(), ErrorKind::InvalidState);
        assert_eq!(
            CoreError::IllegalMove("e2e5".into()).kind(),
            ErrorKind::IllegalInput
        );
        assert_eq!(
            CoreError::Store(StoreError::NotFound).kind(),
            ErrorKind::Internal
        );
    }
}
