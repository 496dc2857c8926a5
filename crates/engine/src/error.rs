//! Error types for the rules engine
//!
//! Illegal moves are not errors here: a destination that is missing from a
//! piece's legal move list is simply not offered. These variants cover bad
//! input handed to the engine from outside.

/// Errors raised by board construction, lookups and tooling
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    /// Coordinates outside the 8x8 board
    #[error("Square out of range: file {file}, rank {rank}")]
    InvalidSquare { file: i32, rank: i32 },

    /// Square name that is not `a1`..`h8`
    #[error("Invalid square name: {0:?}")]
    InvalidAlgebraic(String),

    /// Malformed FEN string
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    /// Setup tried to put two pieces on one square
    #[error("Square {square} is already occupied")]
    SquareOccupied { square: String },

    /// `undo_move` called with an empty history
    #[error("No moves to undo")]
    NothingToUndo,

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Log or config file I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type ChessResult<T> = Result<T, ChessError>;
