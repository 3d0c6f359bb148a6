// Error taxonomy shared by the catalog, roster, draft state and engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DraftError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    /// Malformed or duplicate catalog input. No partial catalog is returned.
    #[error("invalid player data: {message}")]
    Data { message: String },

    #[error("player not found: {identity}")]
    NotFound { identity: String },

    #[error("player already drafted: {identity}")]
    AlreadyDrafted { identity: String },

    #[error("invalid draft state: {message}")]
    InvalidState { message: String },

    #[error("no roster slot can accept position {position}")]
    RosterFull { position: String },

    /// Scoring was asked for a player who is no longer in the pool.
    #[error("player is not available: {identity}")]
    PlayerUnavailable { identity: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl DraftError {
    pub(crate) fn data(message: impl Into<String>) -> Self {
        DraftError::Data {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        DraftError::InvalidArgument {
            message: message.into(),
        }
    }
}
