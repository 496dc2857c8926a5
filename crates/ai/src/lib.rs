pub mod background;
pub mod evaluation;
pub mod search;
pub mod types;

pub use background::SearchTask;
pub use evaluation::*;
pub use search::*;
pub use types::*;
