use std::time::Instant;

use crate::board::Board;
use crate::error::ChessResult;
use crate::types::{Move, MoveKind};

#[derive(Debug, Clone, Default)]
pub struct PerftResult {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
    pub time_ms: u128,
}

impl PerftResult {
    pub fn nodes_per_second(&self) -> u64 {
        if self.time_ms == 0 {
            return 0;
        }
        (self.nodes * 1000) / (self.time_ms as u64)
    }

    fn absorb(&mut self, other: &PerftResult) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.en_passant += other.en_passant;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
    }
}

#[derive(Debug)]
pub struct PerftTestCase {
    pub name: &'static str,
    pub fen: &'static str,
    pub expected_results: &'static [(u32, u64)], // (depth, expected_nodes)
}

impl PerftTestCase {
    pub fn board(&self) -> ChessResult<Board> {
        Board::from_fen(self.fen)
    }

    pub fn expected(&self, depth: u32) -> Option<u64> {
        self.expected_results
            .iter()
            .find(|&&(d, _)| d == depth)
            .map(|&(_, nodes)| nodes)
    }
}

// Standard perft test positions
pub const PERFT_POSITIONS: &[PerftTestCase] = &[
    PerftTestCase {
        name: "Starting Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        expected_results: &[(1, 20), (2, 400), (3, 8_902), (4, 197_281), (5, 4_865_609)],
    },
    PerftTestCase {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        expected_results: &[(1, 48), (2, 2_039), (3, 97_862), (4, 4_085_603)],
    },
    PerftTestCase {
        name: "Position 3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        expected_results: &[(1, 14), (2, 191), (3, 2_812), (4, 43_238), (5, 674_624)],
    },
    PerftTestCase {
        name: "Position 4",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        expected_results: &[(1, 6), (2, 264), (3, 9_467), (4, 422_333)],
    },
    PerftTestCase {
        name: "Position 5",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        expected_results: &[(1, 44), (2, 1_486), (3, 62_379), (4, 2_103_487)],
    },
    PerftTestCase {
        name: "Position 6",
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        expected_results: &[(1, 46), (2, 2_079), (3, 89_890), (4, 3_894_594)],
    },
];

/// Counts the leaf nodes of the legal move tree to `depth`
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.collect_legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        if let Some(record) = board.apply(mv) {
            nodes += perft(board, depth - 1);
            board.revert(record);
        }
    }

    nodes
}

/// Perft that also classifies the moves made at the last ply
pub fn perft_detailed(board: &mut Board, depth: u32) -> PerftResult {
    let start_time = Instant::now();
    let mut result = PerftResult::default();
    detailed_walk(board, depth, &mut result);
    result.time_ms = start_time.elapsed().as_millis();
    result
}

fn detailed_walk(board: &mut Board, depth: u32, result: &mut PerftResult) {
    if depth == 0 {
        result.nodes += 1;
        return;
    }

    for mv in board.collect_legal_moves() {
        let Some(record) = board.apply(mv) else {
            continue;
        };

        if depth == 1 {
            let mut leaf = PerftResult {
                nodes: 1,
                ..PerftResult::default()
            };
            classify(board, mv, &mut leaf);
            result.absorb(&leaf);
        } else {
            detailed_walk(board, depth - 1, result);
        }

        board.revert(record);
    }
}

fn classify(board: &mut Board, mv: Move, leaf: &mut PerftResult) {
    if mv.is_capture() {
        leaf.captures += 1;
    }
    match mv.kind() {
        MoveKind::EnPassant => leaf.en_passant += 1,
        MoveKind::CastleKingside | MoveKind::CastleQueenside => leaf.castles += 1,
        MoveKind::Promotion(_) => leaf.promotions += 1,
        _ => {}
    }
    if board.is_in_check(board.turn()) {
        leaf.checks += 1;
        if !board.has_legal_move() {
            leaf.checkmates += 1;
        }
    }
}

/// Divide perft - shows per-move breakdown for debugging
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let mut results = Vec::new();

    for mv in board.collect_legal_moves() {
        if let Some(record) = board.apply(mv) {
            let nodes = perft(board, depth.saturating_sub(1));
            results.push((mv, nodes));
            board.revert(record);
        }
    }

    results.sort_by(|a, b| b.1.cmp(&a.1)); // Sort by node count descending
    results
}
