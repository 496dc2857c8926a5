pub mod bitboard;
pub mod board;
pub mod config;
pub mod error;
pub mod logger;
pub mod opponent;
pub mod perft;
pub mod session;
pub mod types;

pub use board::*;
pub use config::{AiConfig, GameConfig};
pub use error::{ChessError, ChessResult};
pub use logger::ChessLogger;
pub use opponent::Opponent;
pub use session::{GameSession, GameStatus};
pub use types::*;
