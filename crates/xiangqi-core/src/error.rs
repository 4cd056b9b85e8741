//! Error types for the engine core

use thiserror::Error;

/// FEN parsing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("empty FEN")]
    Empty,

    #[error("expected 10 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {rank} describes {files} files")]
    RankWidth { rank: i32, files: i32 },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("invalid side to move '{0}'")]
    InvalidSide(String),

    #[error("{side} has {count} kings")]
    KingCount { side: &'static str, count: usize },

    #[error("king outside its palace on {0}")]
    KingOutsidePalace(String),

    #[error("the side to move can capture the opposing king")]
    KingCapturable,

    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),
}

/// Errors reported by [`crate::Engine`]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),

    #[error("illegal move '{mv}' after {applied} applied moves")]
    IllegalMove { mv: String, applied: usize },

    #[error("No such option: {0}")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option {name}")]
    InvalidOptionValue { name: String, value: String },

    #[error("unable to allocate a {mb} MiB transposition table")]
    HashAllocation { mb: usize },

    #[error("no evaluation network is loaded")]
    NoNetwork,

    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
