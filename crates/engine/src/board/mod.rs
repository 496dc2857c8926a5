use std::sync::Arc;

use crate::error::{ChessError, ChessResult};
use crate::opponent::Opponent;
use crate::types::*;

// Declare submodules
mod debug;
mod moves;
mod state;
mod validation;

pub use state::MoveRecord;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// The game state. Sole owner of every piece on the board.
#[derive(Debug, Clone)]
pub struct Board {
    squares: [Option<Piece>; 64],
    turn: Color,
    last_move: Option<Move>,
    /// Square of the side-to-move's king while it is attacked
    check: Option<Square>,
    history: Vec<MoveRecord>,
    search_engine: Option<Arc<dyn Opponent>>,
}

impl Board {
    /// Standard starting position, White to move
    pub fn new() -> Self {
        let mut board = Self::empty(Color::White);
        board.setup_starting_position();
        board
    }

    /// A board with no pieces
    pub fn empty(turn: Color) -> Self {
        Self {
            squares: [None; 64],
            turn,
            last_move: None,
            check: None,
            history: Vec::new(),
            search_engine: None,
        }
    }

    fn setup_starting_position(&mut self) {
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            self.put(Piece::new(Color::White, kind, Square::at(file, 0)));
            self.put(Piece::new(Color::White, PieceKind::Pawn, Square::at(file, 1)));
            self.put(Piece::new(Color::Black, PieceKind::Pawn, Square::at(file, 6)));
            self.put(Piece::new(Color::Black, kind, Square::at(file, 7)));
        }
    }

    fn put(&mut self, piece: Piece) {
        self.squares[piece.square().index()] = Some(piece);
    }

    /// Add an unmoved piece to an empty square (position setup)
    pub fn place(&mut self, color: Color, kind: PieceKind, square: Square) -> ChessResult<()> {
        if self.squares[square.index()].is_some() {
            return Err(ChessError::SquareOccupied {
                square: square.to_string(),
            });
        }
        self.put(Piece::new(color, kind, square));
        self.refresh_check();
        Ok(())
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.squares[square.index()].as_ref()
    }

    /// Lookup by raw coordinates; out-of-range input is an error, never wrapped
    pub fn piece_at_coords(&self, file: i32, rank: i32) -> ChessResult<Option<&Piece>> {
        let square = Square::from_coords(file, rank)?;
        Ok(self.piece_at(square))
    }

    /// All pieces, a1 through h8
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |piece| piece.color() == color)
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    pub fn last_moved_piece(&self) -> Option<&Piece> {
        self.last_move.and_then(|mv| self.piece_at(mv.to()))
    }

    /// Applied moves, oldest first
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn set_search_engine(&mut self, engine: Arc<dyn Opponent>) {
        self.search_engine = Some(engine);
    }

    pub fn search_engine(&self) -> Option<&dyn Opponent> {
        self.search_engine.as_deref()
    }

    pub fn clear_search_engine(&mut self) {
        self.search_engine = None;
    }

    /// Copy of the position alone: no history, no attached opponent.
    /// Searches and legality checks work on these.
    pub fn snapshot(&self) -> Board {
        Board {
            squares: self.squares,
            turn: self.turn,
            last_move: self.last_move,
            check: self.check,
            history: Vec::new(),
            search_engine: None,
        }
    }

    /// Parse a FEN string. Castling rights become has-moved flags on the
    /// kings and rooks; the en-passant field marks the pawn that just
    /// double-stepped. Move counters are accepted and ignored.
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(ChessError::InvalidFen(
                "expected at least placement and side to move".to_string(),
            ));
        }

        let turn = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ChessError::InvalidFen(format!("invalid active color {:?}", other))),
        };
        let mut board = Self::empty(turn);
        board.parse_piece_placement(parts[0])?;
        board.apply_castling_field(parts.get(2).copied().unwrap_or("-"))?;
        board.apply_en_passant_field(parts.get(3).copied().unwrap_or("-"))?;
        board.refresh_check();
        Ok(board)
    }

    fn parse_piece_placement(&mut self, placement: &str) -> ChessResult<()> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen("piece placement must have 8 ranks".to_string()));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file = 0u8;

            for ch in rank_str.chars() {
                if let Some(empty) = ch.to_digit(10) {
                    if !(1..=8).contains(&empty) || u32::from(file) + empty > 8 {
                        return Err(ChessError::InvalidFen(format!(
                            "bad empty-square count {:?} in rank {}",
                            ch,
                            rank + 1
                        )));
                    }
                    file += empty as u8;
                } else {
                    let kind = PieceKind::from_letter(ch)
                        .ok_or_else(|| ChessError::InvalidFen(format!("unknown piece {:?}", ch)))?;
                    if file >= 8 {
                        return Err(ChessError::InvalidFen(format!("too many pieces in rank {}", rank + 1)));
                    }
                    let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
                    let square = Square::at(file, rank);
                    let mut piece = Piece::new(color, kind, square);
                    match kind {
                        PieceKind::Pawn => piece.set_has_moved(rank != color.pawn_start_rank()),
                        // cleared again below for pieces that keep a castling right
                        PieceKind::King | PieceKind::Rook => piece.set_has_moved(true),
                        _ => {}
                    }
                    self.put(piece);
                    file += 1;
                }
            }

            if file != 8 {
                return Err(ChessError::InvalidFen(format!("rank {} does not cover 8 files", rank + 1)));
            }
        }

        Ok(())
    }

    fn apply_castling_field(&mut self, castling: &str) -> ChessResult<()> {
        if castling == "-" {
            return Ok(());
        }

        for ch in castling.chars() {
            let (color, rook_file) = match ch {
                'K' => (Color::White, 7),
                'Q' => (Color::White, 0),
                'k' => (Color::Black, 7),
                'q' => (Color::Black, 0),
                _ => return Err(ChessError::InvalidFen(format!("invalid castling right {:?}", ch))),
            };
            let rank = color.back_rank();
            for (file, kind) in [(4, PieceKind::King), (rook_file, PieceKind::Rook)] {
                match self.squares[Square::at(file, rank).index()].as_mut() {
                    Some(piece) if piece.kind() == kind && piece.color() == color => {
                        piece.set_has_moved(false);
                    }
                    _ => {
                        return Err(ChessError::InvalidFen(format!(
                            "castling right {:?} without {} on {}",
                            ch,
                            kind.name(),
                            Square::at(file, rank)
                        )))
                    }
                }
            }
        }

        Ok(())
    }

    fn apply_en_passant_field(&mut self, field: &str) -> ChessResult<()> {
        if field == "-" {
            return Ok(());
        }

        let target = Square::from_algebraic(field)
            .map_err(|_| ChessError::InvalidFen(format!("invalid en passant square {:?}", field)))?;
        // The pawn that just moved belongs to the side not on move
        let mover = self.turn.opposite();
        let dir = mover.forward();
        let (Some(pawn_square), Some(origin)) = (target.offset(0, dir), target.offset(0, -dir)) else {
            return Err(ChessError::InvalidFen(format!("en passant square {} on an edge rank", target)));
        };

        match self.squares[pawn_square.index()].as_mut() {
            Some(pawn) if pawn.kind() == PieceKind::Pawn && pawn.color() == mover => {
                pawn.set_just_double_stepped(true);
                pawn.set_has_moved(true);
                self.last_move = Some(Move::new(origin, pawn_square, None, MoveKind::DoublePawnStep));
                Ok(())
            }
            _ => Err(ChessError::InvalidFen(format!(
                "en passant square {} without a pawn on {}",
                target, pawn_square
            ))),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
