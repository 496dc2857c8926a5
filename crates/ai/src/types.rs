use engine::{Move, PieceKind};

/// Search result containing best move and evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Score of `best_move` from the engine's point of view
    pub evaluation: i32,
    pub depth: u32,
    pub nodes_searched: u64,
    /// The search was stopped early; `best_move` covers the root moves finished so far
    pub cancelled: bool,
}

/// Material values in centipawns. The king is never captured, so it counts nothing.
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 300,
        PieceKind::Bishop => 300,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

/// Shallowest search the engine will run
pub const MIN_DEPTH: u32 = 1;
