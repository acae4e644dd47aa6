use crate::core::partition::partition;
use crate::core::selector::select_daily_word;
use crate::domain::model::Puzzle;
use crate::domain::ports::{DateProvider, PuzzleProvider};
use crate::domain::word_list::WordList;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

/// Derives and caches the puzzle of the current date. Only the most recent
/// date is kept; a new date replaces it.
pub struct PuzzleBook {
    words: WordList,
    clock: Arc<dyn DateProvider>,
    current: Mutex<Option<Puzzle>>,
}

impl PuzzleBook {
    pub fn new(words: WordList, clock: Arc<dyn DateProvider>) -> Self {
        Self {
            words,
            clock,
            current: Mutex::new(None),
        }
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn puzzle_for(&self, date: NaiveDate) -> Result<Puzzle> {
        let mut current = self.current.lock();
        if let Some(puzzle) = current.as_ref().filter(|p| p.date() == date) {
            return Ok(puzzle.clone());
        }

        let daily = select_daily_word(date, &self.words);
        let puzzle = partition(&daily.word, date)?;
        tracing::info!(
            "🐝 Puzzle for {}: {} (mandatory letter {})",
            date,
            puzzle.source_word(),
            puzzle.mandatory_letter()
        );

        *current = Some(puzzle.clone());
        Ok(puzzle)
    }

    pub fn current_puzzle(&self) -> Result<Puzzle> {
        self.puzzle_for(self.today())
    }
}

#[async_trait]
impl PuzzleProvider for PuzzleBook {
    async fn todays_puzzle(&self) -> Result<Puzzle> {
        self.current_puzzle()
    }
}
