use std::fmt;

use super::Board;
use crate::types::*;

impl Board {
    /// Debug game state information
    pub fn debug_game_state(&self) -> Vec<String> {
        let mut debug_info = Vec::new();

        debug_info.push(format!("Current turn: {}", self.turn));

        match self.piece_in_check() {
            Some(king) => debug_info.push(format!("In check: {} king on {}", king.color(), king.square())),
            None => debug_info.push("In check: None".to_string()),
        }

        match self.last_move {
            Some(mv) => debug_info.push(format!("Last move: {}", mv)),
            None => debug_info.push("Last move: None".to_string()),
        }

        let en_passant = self
            .pieces()
            .find(|piece| piece.just_double_stepped())
            .map(|pawn| pawn.square().to_string());
        debug_info.push(format!("En passant pawn: {}", en_passant.as_deref().unwrap_or("None")));

        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            let king_home = self
                .piece_at(Square::at(4, rank))
                .map_or(false, |p| p.kind() == PieceKind::King && p.color() == color && !p.has_moved());
            let unmoved_rook = |file: u8| {
                self.piece_at(Square::at(file, rank))
                    .map_or(false, |p| p.kind() == PieceKind::Rook && p.color() == color && !p.has_moved())
            };
            debug_info.push(format!(
                "{} castling: kingside {}, queenside {}",
                color,
                king_home && unmoved_rook(7),
                king_home && unmoved_rook(0)
            ));
        }

        debug_info.push(format!("Plies played: {}", self.history.len()));
        if let Some(engine) = self.search_engine() {
            debug_info.push(format!("Search engine plays {}", engine.color()));
        }

        debug_info
    }
}

/// Text diagram, rank 8 at the top, `.` for empty squares
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let symbol = self.piece_at(Square::at(file, rank)).map_or('.', Piece::symbol);
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} to move", self.turn)
    }
}
