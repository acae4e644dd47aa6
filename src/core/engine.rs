use crate::core::ledger::{DailyLedger, DEFAULT_HIGH_SCORE_FLOOR, DEFAULT_MIN_WORD_LENGTH};
use crate::core::puzzle_book::PuzzleBook;
use crate::core::validation_cache::{CacheStats, ValidationCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::core::validator::{CachedOracle, DEFAULT_ORACLE_TIMEOUT};
use crate::domain::model::{normalize_word, Puzzle, ValidationResponse};
use crate::domain::ports::{DateProvider, DictionaryOracle, PuzzleProvider};
use crate::domain::word_list::WordList;
use crate::utils::error::{GameError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub min_word_length: usize,
    pub high_score_floor: u32,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    pub oracle_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            high_score_floor: DEFAULT_HIGH_SCORE_FLOOR,
            cache_capacity: DEFAULT_CAPACITY,
            cache_ttl: DEFAULT_TTL,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }
}

/// Server-side service: today's puzzle, cached word validation and the
/// daily ledger, all reading the date from one injected clock.
pub struct PuzzleEngine {
    clock: Arc<dyn DateProvider>,
    puzzles: Arc<PuzzleBook>,
    validator: CachedOracle<dyn DictionaryOracle>,
    ledger: DailyLedger,
    settings: EngineSettings,
}

impl PuzzleEngine {
    pub fn new(
        clock: Arc<dyn DateProvider>,
        words: WordList,
        oracle: Arc<dyn DictionaryOracle>,
        settings: EngineSettings,
    ) -> Self {
        let puzzles = Arc::new(PuzzleBook::new(words, Arc::clone(&clock)));
        let cache = ValidationCache::new(settings.cache_capacity, settings.cache_ttl);
        let validator = CachedOracle::new(oracle, cache, settings.oracle_timeout);
        let ledger = DailyLedger::new(
            Arc::clone(&puzzles),
            settings.high_score_floor,
            settings.min_word_length,
        );

        Self {
            clock,
            puzzles,
            validator,
            ledger,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn todays_puzzle(&self) -> Result<Puzzle> {
        self.puzzles.current_puzzle()
    }

    /// Looks the word up (through the cache) and, when it is a real word that
    /// can be played today, records it in the ledger.
    pub async fn validate_word(&self, word: &str) -> Result<ValidationResponse> {
        let word = normalize_word(word);
        if word.chars().count() < self.settings.min_word_length {
            let rejection = GameError::InputTooShort {
                min: self.settings.min_word_length,
            };
            return Ok(ValidationResponse::rejected(rejection.user_message()));
        }

        let is_valid = self.validator.is_legitimate_word(&word).await?;
        if is_valid {
            let today = self.clock.today();
            if self.ledger.record_confirmed_word(today, &word, true)? {
                tracing::info!("✅ '{}' confirmed for {}", word, today);
            }
        }
        Ok(ValidationResponse::from_verdict(is_valid))
    }

    pub fn todays_high_score(&self) -> Result<u32> {
        self.ledger.todays_high_score()
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.validator.stats()
    }

    /// Time left until the next UTC midnight, when a new puzzle appears.
    pub fn time_until_next_puzzle(&self) -> Duration {
        until_next_puzzle(self.clock.as_ref())
    }
}

pub fn until_next_puzzle(clock: &dyn DateProvider) -> Duration {
    let now = clock.now();
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    match next_midnight {
        Some(midnight) => (midnight - now).to_std().unwrap_or_default(),
        None => Duration::ZERO,
    }
}

#[async_trait]
impl PuzzleProvider for PuzzleEngine {
    async fn todays_puzzle(&self) -> Result<Puzzle> {
        PuzzleEngine::todays_puzzle(self)
    }
}

#[async_trait]
impl DictionaryOracle for PuzzleEngine {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        Ok(self.validate_word(word).await?.is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::lexicon::LexiconOracle;
    use crate::domain::word_list::DailyWord;

    fn engine(clock: Arc<FixedClock>) -> PuzzleEngine {
        let words = WordList::new(vec![DailyWord::new("SNØRKLE", "curl")]).unwrap();
        let oracle = Arc::new(LexiconOracle::new(["snørkle", "snører", "kører", "ørken"]));
        PuzzleEngine::new(clock, words, oracle, EngineSettings::default())
    }

    #[tokio::test]
    async fn test_validate_word_records_in_ledger() {
        // 2025-02-04 的必要字母是 E
        let clock = Arc::new(FixedClock::on_date(2025, 2, 4));
        let engine = engine(clock);
        assert_eq!(engine.todays_puzzle().unwrap().mandatory_letter(), 'E');

        let response = engine.validate_word("SNØRER").await.unwrap();
        assert_eq!(response, ValidationResponse::from_verdict(true));

        let response = engine.validate_word("ørnes").await.unwrap();
        assert!(!response.is_valid);
        assert_eq!(response.message, ValidationResponse::INVALID_MESSAGE);

        let words = engine.ledger().confirmed_words().unwrap();
        assert_eq!(words, vec!["snører", "snørkle"]);
    }

    #[tokio::test]
    async fn test_short_words_never_reach_oracle() {
        let clock = Arc::new(FixedClock::on_date(2025, 2, 4));
        let engine = engine(clock);

        let response = engine.validate_word("snø").await.unwrap();
        assert!(!response.is_valid);
        assert_eq!(engine.cache_stats(), CacheStats::default());
    }

    #[tokio::test]
    async fn test_high_score_reaches_floor_then_grows() {
        let clock = Arc::new(FixedClock::on_date(2025, 2, 4));
        let words = WordList::new(vec![DailyWord::new("SNØRKLE", "curl")]).unwrap();
        let oracle = Arc::new(LexiconOracle::new(["snører", "kører", "ørken"]));
        let settings = EngineSettings {
            high_score_floor: 20,
            ..EngineSettings::default()
        };
        let engine = PuzzleEngine::new(clock, words, oracle, settings);

        assert_eq!(engine.todays_high_score().unwrap(), 20);
        engine.validate_word("snører").await.unwrap();
        assert_eq!(engine.todays_high_score().unwrap(), 20);
        engine.validate_word("kører").await.unwrap();
        engine.validate_word("ørken").await.unwrap();
        // 12 + 6 + 5 + 5
        assert_eq!(engine.todays_high_score().unwrap(), 28);
    }

    #[test]
    fn test_time_until_next_puzzle() {
        let clock = Arc::new(FixedClock::on_date(2025, 2, 4));
        let engine = engine(clock.clone());
        assert_eq!(engine.time_until_next_puzzle(), Duration::from_secs(12 * 3600));

        clock.advance(chrono::Duration::hours(11) + chrono::Duration::minutes(59));
        assert_eq!(engine.time_until_next_puzzle(), Duration::from_secs(60));

        let other_day = FixedClock::on_date(2025, 2, 5);
        assert_eq!(until_next_puzzle(&other_day), Duration::from_secs(12 * 3600));
    }
}
