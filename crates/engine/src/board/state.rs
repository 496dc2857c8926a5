use tracing::{trace, warn};

use super::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::*;

/// Everything needed to take one applied move back exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    mv: Move,
    /// The mover as it stood before the move
    moved: Piece,
    /// The piece actually removed, en-passant victim included
    captured: Option<Piece>,
    /// Castling rook as it stood before, and where it went
    rook: Option<(Piece, Square)>,
    /// Pawn whose double-step flag this move cleared
    cleared_double_step: Option<Square>,
    previous_last_move: Option<Move>,
    previous_check: Option<Square>,
    is_player_move: bool,
}

impl MoveRecord {
    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn moved_piece(&self) -> &Piece {
        &self.moved
    }

    pub fn captured(&self) -> Option<&Piece> {
        self.captured.as_ref()
    }

    /// True for human plies, false for engine plies
    pub fn is_player_move(&self) -> bool {
        self.is_player_move
    }
}

impl Board {
    /// Apply a move produced by move generation.
    ///
    /// No legality check: the caller passes moves from `generate_moves`
    /// (or the board helpers). `is_player_move` only tags the history
    /// entry; human and engine moves are applied the same way.
    pub fn do_move(&mut self, mv: Move, is_player_move: bool) {
        debug_assert!(self.piece_at(mv.from()).is_some(), "no piece on {} for {}", mv.from(), mv);

        let Some(mut record) = self.apply(mv) else {
            warn!("Ignoring move {} with no piece on {}", mv, mv.from());
            return;
        };
        record.is_player_move = is_player_move;
        self.history.push(record);
        self.refresh_check();

        trace!(
            "{} {} move {}{}",
            self.turn.opposite(),
            if is_player_move { "player" } else { "engine" },
            mv,
            if self.check.is_some() { " (check)" } else { "" }
        );
    }

    /// Take back the most recent `do_move`
    pub fn undo_move(&mut self) -> ChessResult<Move> {
        let record = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        let mv = record.mv;
        self.revert(record);
        Ok(mv)
    }

    /// The side to move has no legal move (checkmate or stalemate)
    pub fn game_over(&self) -> bool {
        !self.snapshot().has_legal_move()
    }

    /// King of the side to move, if it is attacked
    pub fn piece_in_check(&self) -> Option<&Piece> {
        self.check.and_then(|square| self.piece_at(square))
    }

    /// Move the pieces and flip the turn. Leaves `check` stale; `do_move`
    /// refreshes it and `revert` restores it.
    pub(crate) fn apply(&mut self, mv: Move) -> Option<MoveRecord> {
        let moved = self.squares[mv.from().index()].take()?;
        let previous_last_move = self.last_move;
        let previous_check = self.check;

        // A double-step only opens en passant for one ply
        let mut cleared_double_step = None;
        if let Some(last) = previous_last_move.filter(|last| last.kind() == MoveKind::DoublePawnStep) {
            if let Some(pawn) = self.squares[last.to().index()].as_mut() {
                if pawn.just_double_stepped() {
                    pawn.set_just_double_stepped(false);
                    cleared_double_step = Some(last.to());
                }
            }
        }

        let capture_square = match mv.kind() {
            MoveKind::EnPassant => Square::at(mv.to().file(), mv.from().rank()),
            _ => mv.to(),
        };
        let captured = self.squares[capture_square.index()].take();

        let mut landed = match mv.promotion() {
            Some(kind) => Piece::new(moved.color(), kind, mv.to()),
            None => moved,
        };
        landed.set_square(mv.to());
        landed.set_has_moved(true);
        landed.set_just_double_stepped(mv.kind() == MoveKind::DoublePawnStep);
        self.put(landed);

        let rook = match mv.kind() {
            MoveKind::CastleKingside => self.shift_rook(moved.color(), 7, 5),
            MoveKind::CastleQueenside => self.shift_rook(moved.color(), 0, 3),
            _ => None,
        };

        self.turn = self.turn.opposite();
        self.last_move = Some(mv);

        Some(MoveRecord {
            mv,
            moved,
            captured,
            rook,
            cleared_double_step,
            previous_last_move,
            previous_check,
            is_player_move: false,
        })
    }

    fn shift_rook(&mut self, color: Color, from_file: u8, to_file: u8) -> Option<(Piece, Square)> {
        let rank = color.back_rank();
        let to = Square::at(to_file, rank);
        let original = self.squares[Square::at(from_file, rank).index()].take()?;

        let mut rook = original;
        rook.set_square(to);
        rook.set_has_moved(true);
        self.put(rook);
        Some((original, to))
    }

    pub(crate) fn revert(&mut self, record: MoveRecord) {
        let MoveRecord {
            mv,
            moved,
            captured,
            rook,
            cleared_double_step,
            previous_last_move,
            previous_check,
            ..
        } = record;

        self.squares[mv.to().index()] = None;
        self.put(moved);

        if let Some((original, shifted_to)) = rook {
            self.squares[shifted_to.index()] = None;
            self.put(original);
        }
        if let Some(victim) = captured {
            self.put(victim);
        }
        if let Some(square) = cleared_double_step {
            if let Some(pawn) = self.squares[square.index()].as_mut() {
                pawn.set_just_double_stepped(true);
            }
        }

        self.turn = self.turn.opposite();
        self.last_move = previous_last_move;
        self.check = previous_check;
    }
}
