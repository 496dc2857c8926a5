use super::Board;
use crate::bitboard::{BISHOP_DIRECTIONS, KING_STEPS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::types::*;

// Files that must be empty between king and rook
const KINGSIDE_BETWEEN: [u8; 2] = [5, 6];
const QUEENSIDE_BETWEEN: [u8; 3] = [1, 2, 3];

impl Piece {
    /// Moves for this piece on `board`.
    ///
    /// With `legal` set, moves that would leave this piece's own king
    /// attacked are dropped. Without it the list is pseudo-legal. The order
    /// is fixed for a given position, so repeated calls agree.
    pub fn generate_moves(&self, board: &Board, legal: bool) -> Vec<Move> {
        debug_assert_eq!(board.piece_at(self.square()), Some(self), "piece is not on this board");

        let mut moves = Vec::new();
        board.pseudo_legal_moves(self, &mut moves);
        if legal {
            let mut scratch = board.snapshot();
            scratch.retain_legal(&mut moves, self.color());
        }
        moves
    }
}

impl Board {
    /// Legal moves of the piece on `square`, checked in place with apply/revert
    pub fn legal_moves_from(&mut self, square: Square) -> Vec<Move> {
        let Some(piece) = self.piece_at(square).copied() else {
            return Vec::new();
        };
        let mut moves = Vec::new();
        self.pseudo_legal_moves(&piece, &mut moves);
        self.retain_legal(&mut moves, piece.color());
        moves
    }

    /// Every legal move of the side to move, pieces in a1..h8 order
    pub fn collect_legal_moves(&mut self) -> Vec<Move> {
        self.collect_legal_moves_for(self.turn())
    }

    pub fn collect_legal_moves_for(&mut self, color: Color) -> Vec<Move> {
        let pieces: Vec<Piece> = self.pieces_of(color).copied().collect();
        let mut all_moves = Vec::new();
        let mut candidates = Vec::new();
        for piece in pieces {
            candidates.clear();
            self.pseudo_legal_moves(&piece, &mut candidates);
            self.retain_legal(&mut candidates, color);
            all_moves.extend_from_slice(&candidates);
        }
        all_moves
    }

    /// Whether the side to move has at least one legal move; stops at the first
    pub fn has_legal_move(&mut self) -> bool {
        let color = self.turn();
        let pieces: Vec<Piece> = self.pieces_of(color).copied().collect();
        let mut candidates = Vec::new();
        for piece in pieces {
            candidates.clear();
            self.pseudo_legal_moves(&piece, &mut candidates);
            for &mv in &candidates {
                if self.is_legal_for(mv, color) {
                    return true;
                }
            }
        }
        false
    }

    /// Drop moves that leave `color`'s king attacked
    fn retain_legal(&mut self, moves: &mut Vec<Move>, color: Color) {
        moves.retain(|&mv| self.is_legal_for(mv, color));
    }

    fn is_legal_for(&mut self, mv: Move, color: Color) -> bool {
        let Some(record) = self.apply(mv) else {
            return false;
        };
        let exposed = self.is_in_check(color);
        self.revert(record);
        !exposed
    }

    /// Pseudo-legal moves for `piece`, appended to `out`
    pub fn pseudo_legal_moves(&self, piece: &Piece, out: &mut Vec<Move>) {
        match piece.kind() {
            PieceKind::Pawn => self.pawn_moves(piece, out),
            PieceKind::Knight => self.step_moves(piece, &KNIGHT_OFFSETS, out),
            PieceKind::Bishop => self.sliding_moves(piece, &BISHOP_DIRECTIONS, out),
            PieceKind::Rook => self.sliding_moves(piece, &ROOK_DIRECTIONS, out),
            PieceKind::Queen => {
                self.sliding_moves(piece, &ROOK_DIRECTIONS, out);
                self.sliding_moves(piece, &BISHOP_DIRECTIONS, out);
            }
            PieceKind::King => {
                self.step_moves(piece, &KING_STEPS, out);
                self.castling_moves(piece, out);
            }
        }
    }

    /// Target square if it is empty or holds an enemy; `None` for a friendly piece
    fn landing(&self, piece: &Piece, target: Square) -> Option<Option<Piece>> {
        match self.piece_at(target) {
            None => Some(None),
            Some(other) if other.color() != piece.color() => Some(Some(*other)),
            Some(_) => None,
        }
    }

    fn pawn_moves(&self, pawn: &Piece, out: &mut Vec<Move>) {
        let from = pawn.square();
        let color = pawn.color();
        let dir = color.forward();

        // Forward moves
        if let Some(one) = from.offset(0, dir) {
            if self.piece_at(one).is_none() {
                push_pawn_move(out, from, one, None, color);

                if from.rank() == color.pawn_start_rank() {
                    if let Some(two) = from.offset(0, 2 * dir) {
                        if self.piece_at(two).is_none() {
                            out.push(Move::new(from, two, None, MoveKind::DoublePawnStep));
                        }
                    }
                }
            }
        }

        // Diagonal captures
        for df in [-1, 1] {
            if let Some(target) = from.offset(df, dir) {
                if let Some(victim) = self.piece_at(target) {
                    if victim.color() != color {
                        push_pawn_move(out, from, target, Some(*victim), color);
                    }
                }
            }
        }

        // En passant: only the pawn that double-stepped on the previous ply
        for df in [-1, 1] {
            let (Some(beside), Some(target)) = (from.offset(df, 0), from.offset(df, dir)) else {
                continue;
            };
            if let Some(victim) = self.piece_at(beside) {
                if victim.kind() == PieceKind::Pawn
                    && victim.color() != color
                    && victim.just_double_stepped()
                    && self.piece_at(target).is_none()
                {
                    out.push(Move::new(from, target, Some(*victim), MoveKind::EnPassant));
                }
            }
        }
    }

    /// Knight and king steps
    fn step_moves(&self, piece: &Piece, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
        let from = piece.square();
        for &(df, dr) in offsets {
            let Some(target) = from.offset(df, dr) else {
                continue;
            };
            if let Some(captured) = self.landing(piece, target) {
                out.push(Move::new(from, target, captured, MoveKind::Normal));
            }
        }
    }

    fn sliding_moves(&self, piece: &Piece, directions: &[(i8, i8)], out: &mut Vec<Move>) {
        let from = piece.square();
        for &(df, dr) in directions {
            let mut current = from;
            while let Some(target) = current.offset(df, dr) {
                match self.landing(piece, target) {
                    Some(None) => out.push(Move::new(from, target, None, MoveKind::Normal)),
                    Some(captured) => {
                        out.push(Move::new(from, target, captured, MoveKind::Normal));
                        break; // Can't continue beyond this piece
                    }
                    None => break, // Own piece
                }
                current = target;
            }
        }
    }

    fn castling_moves(&self, king: &Piece, out: &mut Vec<Move>) {
        let color = king.color();
        let home = Square::at(4, color.back_rank());
        if king.has_moved() || king.square() != home {
            return;
        }
        // Can't castle out of check
        if self.is_square_attacked(home, color.opposite()) {
            return;
        }

        for kingside in [true, false] {
            if let Some(mv) = self.castle_move(king, kingside) {
                out.push(mv);
            }
        }
    }

    fn castle_move(&self, king: &Piece, kingside: bool) -> Option<Move> {
        let color = king.color();
        let rank = color.back_rank();
        let (rook_file, between, path, king_to, kind) = if kingside {
            (7u8, &KINGSIDE_BETWEEN[..], [5u8, 6], 6u8, MoveKind::CastleKingside)
        } else {
            (0, &QUEENSIDE_BETWEEN[..], [3, 2], 2, MoveKind::CastleQueenside)
        };

        let rook = self.piece_at(Square::at(rook_file, rank))?;
        if rook.kind() != PieceKind::Rook || rook.color() != color || rook.has_moved() {
            return None;
        }
        if between.iter().any(|&file| self.piece_at(Square::at(file, rank)).is_some()) {
            return None;
        }
        // King may not pass through or land on an attacked square
        if path
            .iter()
            .any(|&file| self.is_square_attacked(Square::at(file, rank), color.opposite()))
        {
            return None;
        }

        Some(Move::new(king.square(), Square::at(king_to, rank), None, kind))
    }
}

fn push_pawn_move(out: &mut Vec<Move>, from: Square, to: Square, captured: Option<Piece>, color: Color) {
    if to.rank() == color.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            out.push(Move::new(from, to, captured, MoveKind::Promotion(kind)));
        }
    } else {
        out.push(Move::new(from, to, captured, MoveKind::Normal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn targets(moves: &[Move]) -> Vec<String> {
        moves.iter().map(|mv| mv.to().to_string()).collect()
    }

    fn moves_of(board: &Board, square: &str, legal: bool) -> Vec<Move> {
        board.piece_at(sq(square)).unwrap().generate_moves(board, legal)
    }

    #[test]
    fn test_startpos_moves() {
        let mut board = Board::new();
        assert_eq!(board.collect_legal_moves().len(), 20);
        assert_eq!(targets(&moves_of(&board, "g1", true)), vec!["f3", "h3"]);
        assert_eq!(targets(&moves_of(&board, "e2", true)), vec!["e3", "e4"]);
        assert!(moves_of(&board, "a1", true).is_empty());
    }

    #[test]
    fn test_kiwipete_moves() {
        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(board.collect_legal_moves().len(), 48);
    }

    #[test]
    fn generation_is_repeatable() {
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        for piece in board.pieces() {
            let first = piece.generate_moves(&board, true);
            let second = piece.generate_moves(&board, true);
            assert_eq!(first, second, "order changed for {}", piece.square());
        }
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let board = Board::from_fen("4k3/8/8/8/1p1R2P1/8/8/4K3 w - - 0 1").unwrap();
        let moves = moves_of(&board, "d4", false);
        let names = targets(&moves);
        assert!(names.contains(&"b4".to_string()));
        assert!(!names.contains(&"a4".to_string()));
        assert!(names.contains(&"f4".to_string()));
        assert!(!names.contains(&"g4".to_string()));
        assert!(names.contains(&"d8".to_string()));
        assert!(names.contains(&"d1".to_string()));
        assert_eq!(moves.len(), 2 + 2 + 4 + 3);

        let capture = moves.iter().find(|mv| mv.to() == sq("b4")).unwrap();
        assert_eq!(capture.captured().unwrap().kind(), PieceKind::Pawn);
    }

    #[test]
    fn pinned_piece_cannot_expose_king() {
        // Bishop on e2 is pinned by the rook on e8
        let board = Board::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(!moves_of(&board, "e2", false).is_empty());
        assert!(moves_of(&board, "e2", true).is_empty());
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let board = Board::from_fen("4k3/8/8/8/8/8/r7/4K3 w - - 0 1").unwrap();
        let names = targets(&moves_of(&board, "e1", true));
        assert_eq!(names, vec!["d1", "f1"]);
    }

    #[test]
    fn legal_moves_never_leave_king_attacked() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ];
        for fen in fens {
            let mut board = Board::from_fen(fen).unwrap();
            let color = board.turn();
            for mv in board.collect_legal_moves() {
                board.do_move(mv, false);
                assert!(!board.is_in_check(color), "{} exposes the king in {}", mv, fen);
                board.undo_move().unwrap();
            }
        }
    }

    #[test]
    fn castling_both_sides_when_clear() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = moves_of(&board, "e1", true);
        let castles: Vec<MoveKind> = moves.iter().filter(|mv| mv.is_castle()).map(|mv| mv.kind()).collect();
        assert_eq!(castles, vec![MoveKind::CastleKingside, MoveKind::CastleQueenside]);
        let g1 = moves.iter().find(|mv| mv.kind() == MoveKind::CastleKingside).unwrap();
        assert_eq!(g1.to(), sq("g1"));
    }

    #[test]
    fn castling_blocked_by_piece_between() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1").unwrap();
        assert!(moves_of(&board, "e1", true).iter().all(|mv| !mv.is_castle()));
    }

    #[test]
    fn castling_requires_unmoved_rook_and_king() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        // Rook h1-h2 and back loses the kingside right only
        let h1 = board.legal_moves_from(sq("h1"));
        let out = *h1.iter().find(|mv| mv.to() == sq("h2")).unwrap();
        board.do_move(out, true);
        let reply = board.collect_legal_moves()[0];
        board.do_move(reply, false);
        let back = *board.legal_moves_from(sq("h2")).iter().find(|mv| mv.to() == sq("h1")).unwrap();
        board.do_move(back, true);
        let reply = board.collect_legal_moves()[0];
        board.do_move(reply, false);

        let castles: Vec<MoveKind> = board
            .legal_moves_from(sq("e1"))
            .iter()
            .filter(|mv| mv.is_castle())
            .map(|mv| mv.kind())
            .collect();
        assert_eq!(castles, vec![MoveKind::CastleQueenside]);
    }

    #[test]
    fn castling_not_through_or_into_or_out_of_check() {
        // f1 attacked by the rook on f8: no kingside, queenside fine
        let board = Board::from_fen("5r2/7k/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let kinds: Vec<MoveKind> = moves_of(&board, "e1", true).iter().map(|mv| mv.kind()).collect();
        assert!(!kinds.contains(&MoveKind::CastleKingside));
        assert!(kinds.contains(&MoveKind::CastleQueenside));

        // g1 attacked: landing square
        let board = Board::from_fen("6r1/7k/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let kinds: Vec<MoveKind> = moves_of(&board, "e1", true).iter().map(|mv| mv.kind()).collect();
        assert!(!kinds.contains(&MoveKind::CastleKingside));

        // King in check from e8
        let board = Board::from_fen("4r3/7k/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(moves_of(&board, "e1", true).iter().all(|mv| !mv.is_castle()));

        // b1 attacked does not stop queenside castling, the king never crosses it
        let board = Board::from_fen("1r6/7k/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let kinds: Vec<MoveKind> = moves_of(&board, "e1", true).iter().map(|mv| mv.kind()).collect();
        assert!(kinds.contains(&MoveKind::CastleQueenside));
    }

    #[test]
    fn promotion_emits_every_choice() {
        let board = Board::from_fen("3r3k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = moves_of(&board, "e7", true);
        let kinds: Vec<MoveKind> = moves.iter().map(|mv| mv.kind()).collect();
        let q = MoveKind::Promotion(PieceKind::Queen);
        let r = MoveKind::Promotion(PieceKind::Rook);
        let b = MoveKind::Promotion(PieceKind::Bishop);
        let n = MoveKind::Promotion(PieceKind::Knight);
        // push to e8, then capture on d8
        assert_eq!(kinds, vec![q, r, b, n, q, r, b, n]);
        assert!(moves[4..].iter().all(|mv| mv.is_capture() && mv.to() == sq("d8")));
    }

    #[test]
    fn en_passant_only_right_after_double_step() {
        let mut board = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let d7 = board.legal_moves_from(sq("d7"));
        let double = *d7.iter().find(|mv| mv.kind() == MoveKind::DoublePawnStep).unwrap();
        board.do_move(double, false);

        let ep: Vec<Move> = board
            .legal_moves_from(sq("e5"))
            .into_iter()
            .filter(|mv| mv.kind() == MoveKind::EnPassant)
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to(), sq("d6"));
        assert_eq!(ep[0].captured().unwrap().square(), sq("d5"));

        // Let the chance pass: both kings shuffle
        let king_move = *board.legal_moves_from(sq("e1")).first().unwrap();
        board.do_move(king_move, true);
        let king_move = *board.legal_moves_from(sq("e8")).first().unwrap();
        board.do_move(king_move, false);
        assert!(board
            .legal_moves_from(sq("e5"))
            .iter()
            .all(|mv| mv.kind() != MoveKind::EnPassant));
    }

    #[test]
    fn single_step_does_not_enable_en_passant() {
        let mut board = Board::from_fen("4k3/8/3p4/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let step = *board.legal_moves_from(sq("d6")).iter().find(|mv| mv.to() == sq("d5")).unwrap();
        board.do_move(step, false);
        assert!(board
            .legal_moves_from(sq("e5"))
            .iter()
            .all(|mv| mv.kind() != MoveKind::EnPassant));
    }

    #[test]
    fn pieces_of_side_not_to_move_still_generate() {
        let board = Board::new();
        assert_eq!(moves_of(&board, "b8", true).len(), 2);
    }
}
