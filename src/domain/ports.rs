use crate::domain::model::Puzzle;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Authority on whether a string is a real word. Lookups may be slow and
/// may fail; a failure never means "not a word".
#[async_trait]
pub trait DictionaryOracle: Send + Sync {
    async fn check_word_exists(&self, word: &str) -> Result<bool>;
}

#[async_trait]
impl<O: DictionaryOracle + ?Sized> DictionaryOracle for Arc<O> {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        (**self).check_word_exists(word).await
    }
}

/// Source of the current time. Everything date-dependent goes through this.
pub trait DateProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[async_trait]
pub trait PuzzleProvider: Send + Sync {
    async fn todays_puzzle(&self) -> Result<Puzzle>;
}
