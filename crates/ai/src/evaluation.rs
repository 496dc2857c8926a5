use engine::{Board, Color};

use crate::types::piece_value;

/// Material balance from `perspective`'s side: own material minus the opponent's
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    board
        .pieces()
        .map(|piece| {
            let value = piece_value(piece.kind());
            if piece.color() == perspective {
                value
            } else {
                -value
            }
        })
        .sum()
}
