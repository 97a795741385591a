//! Error taxonomy shared by the builder, aggregator, store and scoring engine.

use crate::battle::ExecutorError;
use crate::builder::MovesetPolicy;
use serde::Serialize;
use thiserror::Error;

/// Stable, machine-readable error kind surfaced to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownCreature,
    NoLegalMoves,
    InvalidOptions,
    SimulationFailed,
    NotFound,
    InvalidGuess,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownCreature => "UnknownCreature",
            ErrorKind::NoLegalMoves => "NoLegalMoves",
            ErrorKind::InvalidOptions => "InvalidOptions",
            ErrorKind::SimulationFailed => "SimulationFailed",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidGuess => "InvalidGuess",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown creature id {0}")]
    UnknownCreature(u32),

    #[error("{name} has no legal moves under the {policy} moveset policy")]
    NoLegalMoves {
        creature_id: u32,
        name: String,
        policy: MovesetPolicy,
    },

    #[error("invalid battle options: {0}")]
    InvalidOptions(String),

    #[error("simulation failed on trial {trial}: {source}")]
    SimulationFailed {
        trial: u32,
        #[source]
        source: ExecutorError,
    },

    #[error("simulation worker failed: {0}")]
    WorkerFailed(String),

    #[error("guess submitted for an expired or unknown battle ({0})")]
    NotFound(String),

    #[error("invalid guess: {0}")]
    InvalidGuess(String),

    #[error("simulation was cancelled before all trials completed")]
    Cancelled,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnknownCreature(_) => ErrorKind::UnknownCreature,
            EngineError::NoLegalMoves { .. } => ErrorKind::NoLegalMoves,
            EngineError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            EngineError::SimulationFailed { .. } | EngineError::WorkerFailed(_) => {
                ErrorKind::SimulationFailed
            }
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::InvalidGuess(_) => ErrorKind::InvalidGuess,
            EngineError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
