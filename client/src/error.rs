use std::path::PathBuf;

use remeal_common::reservation::{ReservationAction, ReservationId, ReservationState};
use remeal_common::validation::ValidationError;
use remeal_common::wire::SchemaError;
use thiserror::Error;

use crate::guard::ActionKind;

/// The request never produced a usable response.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("{endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: &'static str,
        status: u16,
        message: String,
    },
}

impl NetworkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Transport { .. } => None,
            NetworkError::Status { status, .. } => Some(*status),
        }
    }
}

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Everything a reservation action can fail with. None of these are fatal:
/// the caller shows the message and leaves its state as it was.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("reservation {id} is {from} and cannot become {to}")]
    InvalidTransition {
        id: ReservationId,
        from: ReservationState,
        to: ReservationState,
    },
    #[error("cannot {action} reservation {id} while it is {state}")]
    ActionUnavailable {
        id: ReservationId,
        action: ReservationAction,
        state: ReservationState,
    },
    #[error("reservation {0} is not loaded; refresh the list first")]
    UnknownReservation(ReservationId),
    #[error("{0} is already in progress")]
    Busy(ActionKind),
    #[error(transparent)]
    Network(NetworkError),
    #[error(transparent)]
    Schema(SchemaError),
}

impl From<ApiError> for ReservationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(e) => ReservationError::Network(e),
            ApiError::Schema(e) => ReservationError::Schema(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("no config directory available for the session file")]
    NoConfigDir,
    #[error("session file {path}: {source}")]
    SessionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {path} is corrupt: {source}")]
    SessionFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("building HTTP client: {0}")]
    Http(#[source] reqwest::Error),
}
