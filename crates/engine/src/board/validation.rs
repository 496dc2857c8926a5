use super::Board;
use crate::bitboard::{get_king_attacks, get_knight_attacks, iterate_bits, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use crate::types::*;

impl Board {
    /// Whether any piece of `by_color` attacks `square`.
    ///
    /// Works backwards from the target square, so it never generates moves
    /// and never consults legality. Pawns count only their diagonal
    /// captures and kings only their adjacent squares (castling is not an
    /// attack).
    pub fn is_square_attacked(&self, square: Square, by_color: Color) -> bool {
        self.check_sliding_threats(square, by_color)
            || self.check_leaper_threats(square, by_color)
            || self.check_pawn_threats(square, by_color)
    }

    /// Rooks and queens along ranks/files, bishops and queens along diagonals
    fn check_sliding_threats(&self, square: Square, by_color: Color) -> bool {
        let lines = [
            (&ROOK_DIRECTIONS, PieceKind::Rook),
            (&BISHOP_DIRECTIONS, PieceKind::Bishop),
        ];

        for (directions, slider) in lines {
            for &(df, dr) in directions.iter() {
                if let Some(piece) = self.cast_ray(square, df, dr) {
                    if piece.color() == by_color
                        && (piece.kind() == slider || piece.kind() == PieceKind::Queen)
                    {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// First piece met walking from `start` in direction (df, dr)
    fn cast_ray(&self, start: Square, df: i8, dr: i8) -> Option<&Piece> {
        let mut current = start;
        while let Some(next) = current.offset(df, dr) {
            if let Some(piece) = self.piece_at(next) {
                return Some(piece);
            }
            current = next;
        }
        None
    }

    /// Knights and kings, via the precomputed masks (both are symmetric)
    fn check_leaper_threats(&self, square: Square, by_color: Color) -> bool {
        let is_attacker = |from: Square, kind: PieceKind| {
            self.piece_at(from)
                .map_or(false, |piece| piece.color() == by_color && piece.kind() == kind)
        };

        iterate_bits(get_knight_attacks(square)).any(|from| is_attacker(from, PieceKind::Knight))
            || iterate_bits(get_king_attacks(square)).any(|from| is_attacker(from, PieceKind::King))
    }

    fn check_pawn_threats(&self, square: Square, by_color: Color) -> bool {
        // An attacking pawn sits one rank behind the target, from its own point of view
        let behind = -by_color.forward();

        [-1, 1].into_iter().any(|df| {
            square
                .offset(df, behind)
                .and_then(|from| self.piece_at(from))
                .map_or(false, |piece| piece.color() == by_color && piece.kind() == PieceKind::Pawn)
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|piece| piece.kind() == PieceKind::King)
            .map(|king| king.square())
    }

    /// Whether `color`'s king is attacked. A side without a king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .map_or(false, |king| self.is_square_attacked(king, color.opposite()))
    }

    /// Recompute which king, if any, is in check for the side to move
    pub(crate) fn refresh_check(&mut self) {
        let turn = self.turn();
        self.check = self
            .king_square(turn)
            .filter(|&king| self.is_square_attacked(king, turn.opposite()));
    }
}
