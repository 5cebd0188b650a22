//! Error types for match orchestration.

use crate::types::{MatchPhase, MoveSpec, Side};
use thiserror::Error;

/// Failures reported by the rules authority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid position `{fen}`: {reason}")]
    InvalidPosition { fen: String, reason: String },
    #[error("illegal move {mv}")]
    IllegalMove { mv: MoveSpec },
}

/// Rejections returned to the caller of the controller API.
///
/// None of these mutate the match.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("illegal move {mv}")]
    IllegalMove { mv: MoveSpec },
    #[error("operation not allowed while match is {phase}")]
    InvalidPhase { phase: MatchPhase },
    #[error("not your turn - it is {expected}'s turn")]
    NotYourTurn { expected: Side },
    #[error("a promotion choice is pending")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPendingPromotion,
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Why a move provider could not take a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("engine has not signalled readiness yet")]
    NotReady,
    #[error("a move request is already outstanding")]
    Busy,
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Failures while talking to the external engine process.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to start engine `{path}`: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// Malformed line from the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UciError {
    #[error("empty engine line")]
    Empty,
    #[error("bestmove without a move")]
    MissingMove,
    #[error("undecodable move `{0}`")]
    BadMove(String),
}

/// Audio backend failure. Always swallowed by the sound board.
#[derive(Debug, Error)]
#[error("sound backend failed: {0}")]
pub struct CueError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
