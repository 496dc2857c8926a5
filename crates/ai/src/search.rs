use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use engine::{AiConfig, Board, Color, Move, Opponent};
use tracing::{info, trace, warn};

use crate::evaluation::evaluate;
use crate::types::*;

/// Fixed-depth minimax player for one color.
///
/// Stateless between calls: every search copies the caller's board and
/// works on the copy, so the same engine can serve many boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEngine {
    color: Color,
    depth: u32,
}

/// Per-search bookkeeping
struct SearchContext<'a> {
    cancel: &'a AtomicBool,
    nodes_searched: u64,
    cancelled: bool,
}

impl SearchContext<'_> {
    fn should_stop(&mut self) -> bool {
        if !self.cancelled && self.cancel.load(Ordering::Relaxed) {
            self.cancelled = true;
        }
        self.cancelled
    }
}

impl SearchEngine {
    /// `depth` below one is raised to one
    pub fn new(color: Color, depth: u32) -> Self {
        Self {
            color,
            depth: depth.max(MIN_DEPTH),
        }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(config.color, config.depth)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Best move for the engine's color, or `None` when it has no legal
    /// move or it is not its turn
    pub fn get_move(&self, board: &Board) -> Option<Move> {
        self.search(board).best_move
    }

    pub fn search(&self, board: &Board) -> SearchResult {
        self.search_with_cancel(board, &AtomicBool::new(false))
    }

    /// Search that gives up as soon as `cancel` is set. A cancelled result
    /// only reflects the root moves searched to completion.
    pub fn search_with_cancel(&self, board: &Board, cancel: &AtomicBool) -> SearchResult {
        let mut ctx = SearchContext {
            cancel,
            nodes_searched: 0,
            cancelled: false,
        };

        if board.turn() != self.color {
            warn!(
                "Search engine for {} asked to move while {} is on move",
                self.color,
                board.turn()
            );
            return self.result(None, evaluate(board, self.color), &ctx);
        }

        let start_time = Instant::now();
        let mut work = board.snapshot();
        let (best_move, evaluation) = self.search_root(&mut work, &mut ctx);

        info!(
            "🏆 {} search depth {}: best {} eval {} | {} nodes in {}ms{}",
            self.color,
            self.depth,
            best_move.map_or_else(|| "None".to_string(), |mv| mv.to_string()),
            evaluation,
            ctx.nodes_searched,
            start_time.elapsed().as_millis(),
            if ctx.cancelled { " (cancelled)" } else { "" }
        );
        self.result(best_move, evaluation, &ctx)
    }

    fn result(&self, best_move: Option<Move>, evaluation: i32, ctx: &SearchContext) -> SearchResult {
        SearchResult {
            best_move,
            evaluation,
            depth: self.depth,
            nodes_searched: ctx.nodes_searched,
            cancelled: ctx.cancelled,
        }
    }

    /// Maximising root. Strict improvement only, so among equal scores the
    /// first move in generation order is kept.
    fn search_root(&self, board: &mut Board, ctx: &mut SearchContext) -> (Option<Move>, i32) {
        let moves = board.collect_legal_moves();
        if moves.is_empty() {
            return (None, evaluate(board, self.color));
        }

        let mut best_move = None;
        let mut best_score = i32::MIN;
        let mut alpha = i32::MIN;
        let beta = i32::MAX;

        for (move_index, &mv) in moves.iter().enumerate() {
            if ctx.should_stop() {
                break;
            }

            board.do_move(mv, false);
            let score = self.minimax(board, self.depth - 1, alpha, beta, false, ctx);
            if board.undo_move().is_err() {
                break;
            }

            // A subtree cut short by cancellation has no reliable score
            if ctx.cancelled {
                break;
            }

            trace!("[{}/{}] {} scored {}", move_index + 1, moves.len(), mv, score);
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
        }

        if best_move.is_none() {
            best_score = evaluate(board, self.color);
        }
        (best_move, best_score)
    }

    fn minimax(
        &self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        ctx: &mut SearchContext,
    ) -> i32 {
        ctx.nodes_searched += 1;

        if depth == 0 || ctx.should_stop() {
            return evaluate(board, self.color);
        }

        let moves = board.collect_legal_moves();
        if moves.is_empty() {
            // Checkmate and stalemate are scored on material alone
            return evaluate(board, self.color);
        }

        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for mv in moves {
            board.do_move(mv, false);
            let score = self.minimax(board, depth - 1, alpha, beta, !maximizing, ctx);
            if board.undo_move().is_err() {
                break;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

impl Opponent for SearchEngine {
    fn color(&self) -> Color {
        self.color
    }

    fn get_move(&self, board: &Board) -> Option<Move> {
        SearchEngine::get_move(self, board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{PieceKind, Square};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    /// Plain minimax without pruning, first best at the root
    fn reference_minimax(board: &mut Board, depth: u32, engine: Color) -> (Option<Move>, i32) {
        fn value(board: &mut Board, depth: u32, engine: Color) -> i32 {
            let moves = board.collect_legal_moves();
            if depth == 0 || moves.is_empty() {
                return evaluate(board, engine);
            }
            let maximizing = board.turn() == engine;
            let scores = moves.into_iter().map(|mv| {
                board.do_move(mv, false);
                let score = value(board, depth - 1, engine);
                board.undo_move().unwrap();
                score
            });
            let scores: Vec<i32> = scores.collect();
            if maximizing {
                *scores.iter().max().unwrap()
            } else {
                *scores.iter().min().unwrap()
            }
        }

        let mut best = (None, i32::MIN);
        for mv in board.collect_legal_moves() {
            board.do_move(mv, false);
            let score = value(board, depth - 1, engine);
            board.undo_move().unwrap();
            if score > best.1 {
                best = (Some(mv), score);
            }
        }
        best
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(SearchEngine::new(Color::White, 0).depth(), 1);
        assert_eq!(SearchEngine::new(Color::Black, 3).depth(), 3);
        let config = AiConfig::default();
        let engine = SearchEngine::from_config(&config);
        assert_eq!((engine.color(), engine.depth()), (Color::Black, 2));
    }

    #[test]
    fn depth_one_takes_the_queen() {
        let board = Board::from_fen("3rk3/8/8/8/8/8/P7/3QK3 b - - 0 1").unwrap();
        let engine = SearchEngine::new(Color::Black, 1);
        let result = engine.search(&board);
        let mv = result.best_move.unwrap();
        assert_eq!((mv.from(), mv.to()), (sq("d8"), sq("d1")));
        assert_eq!(mv.captured().unwrap().kind(), PieceKind::Queen);
        assert_eq!(result.evaluation, 500 - 100);
    }

    #[test]
    fn depth_two_sees_the_recapture() {
        let board = Board::from_fen("3qk3/8/8/8/8/8/3P4/4K3 b - - 0 1").unwrap();

        let greedy = SearchEngine::new(Color::Black, 1).get_move(&board).unwrap();
        assert_eq!(greedy.to(), sq("d2"));

        let careful = SearchEngine::new(Color::Black, 2).search(&board);
        assert_ne!(careful.best_move.unwrap().to(), sq("d2"));
        assert_eq!(careful.evaluation, 800);
    }

    #[test]
    fn ties_keep_the_first_generated_move() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        let first = board.collect_legal_moves()[0];
        for depth in 1..=3 {
            let engine = SearchEngine::new(Color::Black, depth);
            assert_eq!(engine.get_move(&board), Some(first), "depth {}", depth);
        }
    }

    #[test]
    fn pruning_matches_plain_minimax() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R b KQkq - 4 4",
        ];
        for fen in fens {
            let mut board = Board::from_fen(fen).unwrap();
            let color = board.turn();
            for depth in 1..=2 {
                let result = SearchEngine::new(color, depth).search(&board);
                let (expected_move, expected_eval) = reference_minimax(&mut board, depth, color);
                assert_eq!(result.best_move, expected_move, "{} depth {}", fen, depth);
                assert_eq!(result.evaluation, expected_eval, "{} depth {}", fen, depth);
            }
        }
    }

    #[test]
    fn pruning_matches_plain_minimax_depth_three() {
        let mut board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        let result = SearchEngine::new(Color::White, 3).search(&board);
        let (expected_move, expected_eval) = reference_minimax(&mut board, 3, Color::White);
        assert_eq!(result.best_move, expected_move);
        assert_eq!(result.evaluation, expected_eval);
    }

    #[test]
    fn no_legal_moves_gives_none() {
        let board = Board::from_fen("4k2R/R7/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(board.game_over());
        let result = SearchEngine::new(Color::Black, 2).search(&board);
        assert_eq!(result.best_move, None);
        assert!(!result.cancelled);
    }

    #[test]
    fn out_of_turn_gives_none() {
        let board = Board::new();
        let engine = SearchEngine::new(Color::Black, 2);
        assert_eq!(engine.get_move(&board), None);
        assert_eq!(engine.search(&board).nodes_searched, 0);
    }

    #[test]
    fn caller_board_is_untouched() {
        let mut board = Board::new();
        let opening = board.collect_legal_moves()[16];
        board.do_move(opening, true);
        let before = board.to_string();
        let history = board.history().len();

        let engine = SearchEngine::new(Color::Black, 2);
        assert!(engine.get_move(&board).is_some());
        assert_eq!(board.to_string(), before);
        assert_eq!(board.history().len(), history);
        assert_eq!(board.turn(), Color::Black);
    }

    #[test]
    fn cancelled_before_start() {
        let board = Board::new();
        let cancel = AtomicBool::new(true);
        let result = SearchEngine::new(Color::White, 3).search_with_cancel(&board, &cancel);
        assert!(result.cancelled);
        assert_eq!(result.best_move, None);
    }

    #[test]
    fn works_as_an_attached_opponent() {
        let mut board = Board::new();
        board.set_search_engine(std::sync::Arc::new(SearchEngine::new(Color::White, 1)));
        let opponent = board.search_engine().unwrap();
        assert_eq!(opponent.color(), Color::White);
        let mv = opponent.get_move(&board).unwrap();
        assert!(board.collect_legal_moves().contains(&mv));
    }
}
