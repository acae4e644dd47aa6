pub mod engine;
pub mod ledger;
pub mod partition;
pub mod puzzle_book;
pub mod scorer;
pub mod selector;
pub mod session;
pub mod validation_cache;
pub mod validator;

pub use crate::domain::model::{Puzzle, ValidationResponse};
pub use crate::domain::ports::{DateProvider, DictionaryOracle, PuzzleProvider};
pub use crate::utils::error::{GameError, Result};
