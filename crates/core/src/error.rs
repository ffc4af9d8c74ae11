//! Error types for board construction and grid mutation.

use thiserror::Error;

use crate::types::PieceTypeId;

/// Rejected level or process configuration.
///
/// Every variant is fatal at initialization: no board is built from a config
/// that fails validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid board width: {0} (must be at least 1)")]
    InvalidWidth(u16),

    #[error("Invalid board height: {0} (must be at least 1)")]
    InvalidHeight(u16),

    #[error("Piece catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate piece type {id} in catalog")]
    DuplicatePieceType { id: PieceTypeId },

    #[error("Piece type {id} has a zero score value")]
    ZeroScore { id: PieceTypeId },

    #[error("Invalid target score: {0} (must be at least 1)")]
    InvalidTargetScore(u32),

    #[error("Level set is empty")]
    EmptyLevelSet,

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Grid mutation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Cell ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Drop from ({x}, {y}) exceeded {limit} rows")]
    DropOverrun { x: i32, y: i32, limit: u32 },

    #[error("Layout is {width}x{height}, expected {expected_width}x{expected_height}")]
    LayoutMismatch {
        width: usize,
        height: usize,
        expected_width: u16,
        expected_height: u16,
    },

    #[error("Unknown layout glyph {0:?}")]
    UnknownGlyph(char),
}
