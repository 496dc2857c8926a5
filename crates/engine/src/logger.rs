use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ChessResult;
use crate::types::Move;

/// Human-readable game record, kept in memory and optionally dumped to disk.
#[derive(Debug)]
pub struct ChessLogger {
    log_buffer: String,
    advanced_logging: bool,
    move_count: u32,
    indent_level: usize,
}

impl ChessLogger {
    pub fn new() -> Self {
        let mut logger = Self {
            log_buffer: String::with_capacity(64 * 1024),
            advanced_logging: false,
            move_count: 0,
            indent_level: 0,
        };

        logger.log("🎯 === Chess Game Log Started ===");
        logger.log(&format!("📅 Date: {}", chrono::Local::now().format("%m/%d/%Y %H:%M:%S")));
        logger
    }

    pub fn should_log_advanced(&self) -> bool {
        self.advanced_logging
    }

    pub fn enable_advanced_logging(&mut self) {
        self.advanced_logging = true;
        self.log("🔬 Advanced logging enabled - search details active");
    }

    pub fn log(&mut self, message: &str) {
        self.log_buffer.push_str(message);
        self.log_buffer.push('\n');
    }

    pub fn log_with_indent(&mut self, message: &str) {
        let indent = "  ".repeat(self.indent_level);
        self.log_buffer.push_str(&format!("{}{}\n", indent, message));
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn contents(&self) -> &str {
        &self.log_buffer
    }

    /// Number of moves logged so far
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    // 🎯 MOVE LOGGING
    pub fn log_human_move(&mut self, mv: Move, time_ms: u64) {
        self.move_count += 1;
        self.log(&format!("{}. {} (Human move - {}ms)", self.move_count, mv, time_ms));
    }

    pub fn log_ai_move(&mut self, mv: Move, time_ms: u64) {
        self.move_count += 1;
        self.log(&format!("{}. {} (AI move - {}ms)", self.move_count, mv, time_ms));
    }

    // 🎯 SEARCH SUMMARIES (advanced only)
    pub fn log_search_start(&mut self, depth: u32, move_count: usize) {
        if self.should_log_advanced() {
            self.log_with_indent(&format!("🔍 Search depth {} | Analyzing {} moves", depth, move_count));
            self.increase_indent();
        }
    }

    pub fn log_search_complete(&mut self, best_move: Option<Move>, best_score: i32, nodes: u64) {
        if self.should_log_advanced() {
            self.decrease_indent();
            match best_move {
                Some(mv) => self.log_with_indent(&format!(
                    "✅ Search complete: {} (Score: {}) | Nodes: {}",
                    mv, best_score, nodes
                )),
                None => self.log_with_indent("❌ No legal moves found"),
            }
        }
    }

    pub fn log_game_end(&mut self, result: &str) {
        self.log(&format!("🏁 Game over: {} after {} moves", result, self.move_count));
    }

    /// Write the log to `<dir>/<timestamp>.txt`, creating `dir` if needed
    pub fn save_to_file(&mut self, dir: &Path, reason: &str) -> ChessResult<PathBuf> {
        fs::create_dir_all(dir)?;

        let now = chrono::Local::now();
        let path = dir.join(format!("{}.txt", now.format("%m_%d_%Y_%H_%M_%S")));

        self.log(&format!("💾 Game ended: {} - Saving log", reason));
        fs::write(&path, self.log_buffer.as_bytes())?;
        Ok(path)
    }
}

impl Default for ChessLogger {
    fn default() -> Self {
        Self::new()
    }
}
