pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use config::{CliConfig, ServerSettings, TomlConfig};
pub use core::engine::{EngineSettings, PuzzleEngine};
pub use core::session::{GameSession, SessionState};
pub use domain::model::Puzzle;
pub use domain::word_list::WordList;
pub use utils::error::{BogstavbiError, GameError, Result};
