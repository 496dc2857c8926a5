//! Click-driven game controller.
//!
//! Holds everything an interactive front end needs between input events:
//! the board, the current selection and its legal destinations, the last
//! rejected selection, the game status and the game log. Rendering and
//! pixel-to-square mapping stay with the caller, which hands over squares.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::ChessResult;
use crate::logger::ChessLogger;
use crate::opponent::Opponent;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// No game running; clicks are ignored
    Idle,
    Started,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

#[derive(Debug)]
pub struct GameSession {
    board: Board,
    status: GameStatus,
    selected: Option<Square>,
    valid_moves: Vec<Move>,
    invalid_piece: Option<Square>,
    logger: ChessLogger,
    log_dir: PathBuf,
    turn_started: Instant,
}

impl GameSession {
    /// A session with no game started
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            status: GameStatus::Idle,
            selected: None,
            valid_moves: Vec::new(),
            invalid_piece: None,
            logger: ChessLogger::new(),
            log_dir: PathBuf::from("logs"),
            turn_started: Instant::now(),
        }
    }

    /// New game from `config`, with `opponent` attached when the config
    /// asks for a computer side. If the config wants a computer side but no
    /// opponent is supplied, both sides are left to the player.
    pub fn from_config(config: &GameConfig, opponent: Option<Arc<dyn Opponent>>) -> Self {
        let mut session = Self::new();
        session.log_dir = config.log_dir.clone();
        if config.advanced_logging {
            session.logger.enable_advanced_logging();
        }

        match (config.opponent(), opponent) {
            (Some(_), Some(opponent)) => session.new_ai_game(opponent),
            (Some(ai), None) => {
                warn!("Config asks for a {} computer player but none was supplied", ai.color);
                session.new_game();
            }
            (None, _) => session.new_game(),
        }
        session
    }

    /// Continue play from an arbitrary position
    pub fn with_board(board: Board) -> Self {
        let mut session = Self::new();
        session.board = board;
        session.status = GameStatus::Started;
        session.check_game_over();
        session
    }

    /// Fresh board, two human players
    pub fn new_game(&mut self) {
        self.board = Board::new();
        self.status = GameStatus::Started;
        self.clear_selection();
        self.invalid_piece = None;
        self.restart_log();
        debug!("New game started");
    }

    /// Fresh board with `opponent` playing its color. A White opponent
    /// moves straight away.
    pub fn new_ai_game(&mut self, opponent: Arc<dyn Opponent>) {
        self.new_game();
        let color = opponent.color();
        self.board.set_search_engine(opponent);
        self.logger.log(&format!("🤖 Computer plays {}", color));
        debug!("Opponent attached for {}", color);

        if color == Color::White {
            self.advance_opponent();
        }
    }

    /// Handle a click on `square` and report the resulting status
    pub fn click(&mut self, square: Square) -> GameStatus {
        if self.status != GameStatus::Started {
            return self.status;
        }
        self.invalid_piece = None;

        if !self.is_opponent_turn() {
            match self.selected {
                None => self.select(square),
                Some(_) => self.move_or_deselect(square),
            }
        }

        self.advance_opponent();
        self.status
    }

    /// Same as `click`, from raw board coordinates
    pub fn click_coords(&mut self, file: i32, rank: i32) -> ChessResult<GameStatus> {
        let square = Square::from_coords(file, rank)?;
        Ok(self.click(square))
    }

    /// Let the opponent reply if it is on move, then settle the status
    fn advance_opponent(&mut self) {
        if self.is_opponent_turn() {
            self.play_opponent_move();
        }
        self.check_game_over();
    }

    fn select(&mut self, square: Square) {
        let Some(piece) = self.board.piece_at(square).copied() else {
            return;
        };

        if piece.color() != self.board.turn() {
            debug!("Rejected selection of {} {} on {}", piece.color(), piece.kind().name(), square);
            self.invalid_piece = Some(square);
            return;
        }

        self.valid_moves = piece.generate_moves(&self.board, true);
        self.selected = Some(square);
        debug!("Selected {} on {} ({} moves)", piece.kind().name(), square, self.valid_moves.len());
    }

    fn move_or_deselect(&mut self, square: Square) {
        // First match wins, so promotions default to a queen
        let chosen = self.valid_moves.iter().copied().find(|mv| mv.to() == square);
        self.clear_selection();

        if let Some(mv) = chosen {
            let elapsed = self.turn_started.elapsed().as_millis() as u64;
            self.board.do_move(mv, true);
            self.logger.log_human_move(mv, elapsed);
            debug!("Player played {} ({}ms)", mv, elapsed);
            self.turn_started = Instant::now();
        }
    }

    fn play_opponent_move(&mut self) {
        let started = Instant::now();
        let reply = self.board.search_engine().and_then(|engine| engine.get_move(&self.board));

        if let Some(mv) = reply {
            let elapsed = started.elapsed().as_millis() as u64;
            self.board.do_move(mv, false);
            self.logger.log_ai_move(mv, elapsed);
            debug!("Engine played {} ({}ms)", mv, elapsed);
        }
        self.turn_started = Instant::now();
    }

    fn check_game_over(&mut self) {
        if self.status != GameStatus::Started || !self.board.game_over() {
            return;
        }

        let loser = self.board.turn();
        let (status, result) = if self.board.piece_in_check().is_some() {
            (GameStatus::Checkmate, format!("Checkmate, {} wins", loser.opposite()))
        } else {
            (GameStatus::Stalemate, "Stalemate".to_string())
        };
        self.status = status;
        self.clear_selection();
        self.logger.log_game_end(&result);
        info!("{}", result);
    }

    fn is_opponent_turn(&self) -> bool {
        self.board
            .search_engine()
            .map_or(false, |engine| engine.color() == self.board.turn())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.valid_moves.clear();
    }

    fn restart_log(&mut self) {
        let advanced = self.logger.should_log_advanced();
        self.logger = ChessLogger::new();
        if advanced {
            self.logger.enable_advanced_logging();
        }
        self.turn_started = Instant::now();
    }

    /// Write the game log into the configured log directory
    pub fn save_log(&mut self, reason: &str) -> ChessResult<PathBuf> {
        let dir = self.log_dir.clone();
        self.logger.save_to_file(&dir, reason)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn selected_piece(&self) -> Option<&Piece> {
        self.selected.and_then(|square| self.board.piece_at(square))
    }

    /// Legal moves of the selected piece
    pub fn valid_moves(&self) -> &[Move] {
        &self.valid_moves
    }

    /// Piece of the wrong color picked by the last click
    pub fn invalid_piece(&self) -> Option<&Piece> {
        self.invalid_piece.and_then(|square| self.board.piece_at(square))
    }

    pub fn logger(&self) -> &ChessLogger {
        &self.logger
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
