//! The seam between the rules engine and a computer player.
//!
//! `Board` can carry an opponent so the presentation layer finds it next to
//! the game state, but the board never calls it. Search implementations live
//! in other crates and implement this trait.

use std::fmt::Debug;

use crate::board::Board;
use crate::types::{Color, Move};

/// A computer-controlled side.
pub trait Opponent: Debug + Send + Sync {
    /// The color this opponent plays
    fn color(&self) -> Color;

    /// Pick a move for `color()` on `board`.
    ///
    /// Returns `None` when that side has no legal move (checkmate or
    /// stalemate against the opponent). Must not mutate `board`.
    fn get_move(&self, board: &Board) -> Option<Move>;
}
