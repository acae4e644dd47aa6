use crate::domain::model::normalize_word;
use crate::domain::ports::DictionaryOracle;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;

/// Offline oracle backed by a fixed word list.
#[derive(Debug, Clone, Default)]
pub struct LexiconOracle {
    words: HashSet<String>,
}

impl LexiconOracle {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| normalize_word(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// 一行一個字，`#` 開頭為註解
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        );
        tracing::info!("📖 Loaded lexicon with {} words", lexicon.len());
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&normalize_word(word))
    }
}

#[async_trait]
impl DictionaryOracle for LexiconOracle {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        Ok(self.contains(word))
    }
}
