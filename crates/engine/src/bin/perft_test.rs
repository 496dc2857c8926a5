use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use engine::perft::{perft, perft_detailed, perft_divide, PERFT_POSITIONS};
use engine::Board;
use tracing_subscriber::EnvFilter;

/// Move generator verification by perft node counts
#[derive(Debug, Parser)]
#[command(name = "perft_test")]
struct Args {
    /// Position to count from; runs the reference suite when omitted
    #[arg(long)]
    fen: Option<String>,

    /// Search depth in plies
    #[arg(short, long, default_value_t = 3)]
    depth: u32,

    /// Print the node count below each root move
    #[arg(long)]
    divide: bool,

    /// Also count captures, castles, checks and mates
    #[arg(long)]
    detailed: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match &args.fen {
        Some(fen) => {
            let mut board = Board::from_fen(fen).context("could not load --fen position")?;
            run_position(&mut board, &args, None);
            Ok(())
        }
        None => run_suite(&args),
    }
}

fn run_suite(args: &Args) -> anyhow::Result<()> {
    println!("🚀 Starting Perft Tests (max depth {})", args.depth);

    let mut passed = 0;
    for case in PERFT_POSITIONS {
        println!("\n🏁 Testing: {}", case.name);
        println!("FEN: {}", case.fen);
        let mut board = case.board()?;

        let mut ok = true;
        for &(depth, expected) in case.expected_results.iter().filter(|(d, _)| *d <= args.depth) {
            let single = Args {
                fen: None,
                depth,
                divide: false,
                detailed: args.detailed,
            };
            ok &= run_position(&mut board, &single, Some(expected));
            if !ok {
                println!("🔍 Divide at depth {}:", depth);
                print_divide(&mut board, depth);
                break;
            }
        }
        if ok {
            passed += 1;
        }
    }

    println!("\n📊 Results: {}/{} positions passed", passed, PERFT_POSITIONS.len());
    if passed != PERFT_POSITIONS.len() {
        bail!("perft mismatch");
    }
    Ok(())
}

/// Count one position at `args.depth`; returns whether it matched `expected`
fn run_position(board: &mut Board, args: &Args, expected: Option<u64>) -> bool {
    let start = Instant::now();
    let nodes = if args.detailed {
        let result = perft_detailed(board, args.depth);
        println!(
            "  captures {} | e.p. {} | castles {} | promotions {} | checks {} | mates {}",
            result.captures, result.en_passant, result.castles, result.promotions, result.checks, result.checkmates
        );
        result.nodes
    } else {
        perft(board, args.depth)
    };
    let elapsed = start.elapsed();

    let success = expected.map_or(true, |expected| expected == nodes);
    let status = if success { "✅" } else { "❌" };
    println!(
        "{} Depth {}: {} nodes in {:.3}s ({:.0} nodes/sec)",
        status,
        args.depth,
        nodes,
        elapsed.as_secs_f64(),
        nodes as f64 / elapsed.as_secs_f64().max(1e-9)
    );
    if let Some(expected) = expected.filter(|_| !success) {
        println!("   Expected: {}, Got: {}", expected, nodes);
    }

    if args.divide {
        print_divide(board, args.depth);
    }
    success
}

fn print_divide(board: &mut Board, depth: u32) {
    for (mv, nodes) in perft_divide(board, depth) {
        println!("  {}: {}", mv, nodes);
    }
}
