use crate::core::puzzle_book::PuzzleBook;
use crate::core::scorer::score;
use crate::domain::model::{normalize_word, Puzzle};
use crate::utils::error::Result;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_HIGH_SCORE_FLOOR: u32 = 50;
pub const DEFAULT_MIN_WORD_LENGTH: usize = 4;

#[derive(Debug, Clone)]
struct LedgerDay {
    puzzle: Puzzle,
    confirmed_words: BTreeSet<String>,
    pangram_word: String,
    total_score: u32,
}

impl LedgerDay {
    fn open(puzzle: Puzzle) -> Self {
        let pangram_word = normalize_word(puzzle.source_word());
        let total_score = score(&pangram_word, &puzzle.letters());
        let confirmed_words = BTreeSet::from([pangram_word.clone()]);
        Self {
            puzzle,
            confirmed_words,
            pangram_word,
            total_score,
        }
    }

    fn date(&self) -> NaiveDate {
        self.puzzle.date()
    }
}

/// Words confirmed valid today, and the reference high score derived from
/// them.
///
/// The high score is a running estimate: it only knows the words players
/// have already found, never the full set of possible words. It never
/// decreases during a day and starts over at UTC midnight, noticed on the
/// first call after the rollover.
pub struct DailyLedger {
    puzzles: Arc<PuzzleBook>,
    floor: u32,
    min_word_length: usize,
    day: Mutex<Option<LedgerDay>>,
}

impl DailyLedger {
    pub fn new(puzzles: Arc<PuzzleBook>, floor: u32, min_word_length: usize) -> Self {
        Self {
            puzzles,
            floor,
            min_word_length,
            day: Mutex::new(None),
        }
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Runs `f` on today's ledger, starting a fresh one first if the date moved.
    fn with_today<T>(&self, f: impl FnOnce(&mut LedgerDay) -> T) -> Result<T> {
        let today = self.puzzles.today();
        let mut day = self.day.lock();

        let current = match day.take() {
            Some(current) if current.date() == today => current,
            previous => {
                let puzzle = self.puzzles.puzzle_for(today)?;
                if let Some(previous) = previous {
                    tracing::info!(
                        "📅 Ledger rollover {} -> {} ({} words dropped)",
                        previous.date(),
                        today,
                        previous.confirmed_words.len()
                    );
                }
                LedgerDay::open(puzzle)
            }
        };

        Ok(f(day.insert(current)))
    }

    /// Records a word the dictionary confirmed. Returns true if the word was
    /// new for the day. Invalid verdicts, other dates and words that cannot be
    /// played on today's puzzle are ignored.
    pub fn record_confirmed_word(&self, date: NaiveDate, word: &str, is_valid: bool) -> Result<bool> {
        let word = normalize_word(word);
        let min_word_length = self.min_word_length;

        self.with_today(|day| {
            if !is_valid || date != day.date() {
                return false;
            }
            let puzzle = &day.puzzle;
            if word.chars().count() < min_word_length
                || !puzzle.contains_mandatory(&word)
                || !puzzle.uses_only_puzzle_letters(&word)
            {
                tracing::debug!("Ledger ignores '{}': not playable today", word);
                return false;
            }
            if !day.confirmed_words.insert(word.clone()) {
                return false;
            }

            day.total_score += score(&word, &puzzle.letters());
            tracing::debug!(
                "Ledger recorded '{}' ({} words, total {})",
                word,
                day.confirmed_words.len(),
                day.total_score
            );
            true
        })
    }

    /// `max(floor, sum of scores of confirmed words)` for today. Any other
    /// date has no recorded words, so it gets the floor.
    pub fn high_score_estimate(&self, date: NaiveDate) -> Result<u32> {
        let floor = self.floor;
        self.with_today(|day| {
            if date == day.date() {
                day.total_score.max(floor)
            } else {
                floor
            }
        })
    }

    pub fn todays_high_score(&self) -> Result<u32> {
        self.high_score_estimate(self.puzzles.today())
    }

    pub fn confirmed_words(&self) -> Result<Vec<String>> {
        self.with_today(|day| day.confirmed_words.iter().cloned().collect())
    }

    pub fn pangram_word(&self) -> Result<String> {
        self.with_today(|day| day.pangram_word.clone())
    }
}
