use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, ChessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction pawns of this color advance in
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank holding this color's king and rooks at the start
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Promotion choices, in the order they are generated
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }

    /// Upper-case letter used by FEN and the text board
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A board coordinate. Index is `rank * 8 + file`, rank 0 is White's back rank.
///
/// Every `Square` value is on the board: the fallible constructors reject
/// anything outside `[0,7] x [0,7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> ChessResult<Self> {
        Self::from_coords(file as i32, rank as i32)
    }

    /// Fails fast on out-of-range coordinates instead of wrapping
    pub fn from_coords(file: i32, rank: i32) -> ChessResult<Self> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Ok(Self::at(file as u8, rank as u8))
        } else {
            Err(ChessError::InvalidSquare { file, rank })
        }
    }

    pub fn from_index(index: u8) -> ChessResult<Self> {
        if index < 64 {
            Ok(Self(index))
        } else {
            Err(ChessError::InvalidSquare {
                file: (index % 8) as i32,
                rank: (index / 8) as i32,
            })
        }
    }

    pub fn from_algebraic(name: &str) -> ChessResult<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidAlgebraic(name.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file >= 8 || rank >= 8 {
            return Err(ChessError::InvalidAlgebraic(name.to_string()));
        }
        Ok(Self::at(file, rank))
    }

    /// In-crate constructor for coordinates already known to be on the board
    pub(crate) const fn at(file: u8, rank: u8) -> Self {
        Self(rank * 8 + file)
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The square `df` files and `dr` ranks away, if it is still on the board
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self::at(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

/// One chess piece. Only `Board` changes its square and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
    square: Square,
    has_moved: bool,
    just_double_stepped: bool,
}

impl Piece {
    pub(crate) fn new(color: Color, kind: PieceKind, square: Square) -> Self {
        Self {
            color,
            kind,
            square,
            has_moved: false,
            just_double_stepped: false,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Set only on the ply right after this pawn's two-square advance
    pub fn just_double_stepped(&self) -> bool {
        self.just_double_stepped
    }

    pub(crate) fn set_square(&mut self, square: Square) {
        self.square = square;
    }

    pub(crate) fn set_has_moved(&mut self, has_moved: bool) {
        self.has_moved = has_moved;
    }

    pub(crate) fn set_just_double_stepped(&mut self, flag: bool) {
        self.just_double_stepped = flag;
    }

    /// Letter for the text board: upper case for White, lower case for Black
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    DoublePawnStep,
    EnPassant,
    CastleKingside,
    CastleQueenside,
    Promotion(PieceKind),
}

/// A single ply as produced by move generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    from: Square,
    to: Square,
    captured: Option<Piece>,
    kind: MoveKind,
}

impl Move {
    pub(crate) fn new(from: Square, to: Square, captured: Option<Piece>, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            captured,
            kind,
        }
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn captured(&self) -> Option<&Piece> {
        self.captured.as_ref()
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }
}

/// Long algebraic form, e.g. `e2-e4`, `d5xe6`, `e7-e8=Q`, `O-O`
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::CastleKingside => return write!(f, "O-O"),
            MoveKind::CastleQueenside => return write!(f, "O-O-O"),
            _ => {}
        }
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, sep, self.to)?;
        if let Some(kind) = self.promotion() {
            write!(f, "={}", kind.letter())?;
        }
        Ok(())
    }
}
