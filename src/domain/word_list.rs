use crate::domain::model::{has_unique_letters, letters_of, PUZZLE_SIZE};
use crate::utils::error::{BogstavbiError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A candidate source word, optionally pinned to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWord {
    pub word: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub meaning: Option<String>,
}

impl DailyWord {
    pub fn new(word: &str, meaning: &str) -> Self {
        Self {
            word: word.to_uppercase(),
            date: None,
            meaning: Some(meaning.to_string()),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

// 原始遊戲的丹麥文單字，每個都有 7 個不同字母
const BUILTIN_WORDS: &[(&str, &str)] = &[
    ("KRAFTIG", "powerful"),
    ("SPRÆNGT", "exploded"),
    ("KLATRES", "climb"),
    ("SPILDTE", "spilled"),
    ("PLANTER", "plants"),
    ("KLISTER", "glue"),
    ("STRØMPE", "stocking"),
    ("KLØVEST", "split"),
    ("SPRØJTE", "spray"),
    ("KNALDET", "bang"),
    ("STRIMLE", "strip"),
    ("STÆNKER", "splash"),
    ("KRAVLET", "crawled"),
    ("STÆRKEN", "strong"),
    ("KRIDTES", "chalked"),
    ("KRINGEL", "pretzel"),
    ("SVINGER", "swing"),
    ("KRYDSET", "crossed"),
    ("SVÆRMET", "swarmed"),
    ("KLØVNER", "clown"),
    ("KNIPSER", "snap"),
    ("SØLVGRÅ", "silver gray"),
    ("MARKLØV", "field leaf"),
    ("SNØRKLE", "curl"),
];

/// Non-empty list of source words. Every entry has exactly seven pairwise
/// distinct letters; the selector relies on that without checking again.
#[derive(Debug, Clone)]
pub struct WordList {
    entries: Vec<DailyWord>,
}

impl WordList {
    pub fn new(entries: Vec<DailyWord>) -> Result<Self> {
        if entries.is_empty() {
            return Err(BogstavbiError::word_list("word list is empty"));
        }

        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.word = entry.word.trim().to_uppercase();
                validate_source_word(&entry.word).map(|_| entry)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut dates: Vec<NaiveDate> = entries.iter().filter_map(|e| e.date).collect();
        dates.sort();
        if let Some(pair) = dates.windows(2).find(|w| w[0] == w[1]) {
            return Err(BogstavbiError::word_list(format!(
                "more than one word is curated for {}",
                pair[0]
            )));
        }

        Ok(Self { entries })
    }

    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_WORDS
                .iter()
                .map(|(word, meaning)| DailyWord::new(word, meaning))
                .collect(),
        }
    }

    /// 從 CSV 檔案載入單字表（欄位：word,date,meaning）
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let entries = csv_reader
            .deserialize::<DailyWord>()
            .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

        tracing::debug!("Loaded {} words from CSV", entries.len());
        Self::new(entries)
    }

    pub fn entries(&self) -> &[DailyWord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn curated_for(&self, date: NaiveDate) -> Option<&DailyWord> {
        self.entries.iter().find(|entry| entry.date == Some(date))
    }
}

pub fn validate_source_word(word: &str) -> Result<()> {
    let length = letters_of(word).count();
    if length != PUZZLE_SIZE {
        return Err(BogstavbiError::word_list(format!(
            "'{}' has {} letters, expected {}",
            word, length, PUZZLE_SIZE
        )));
    }
    if !has_unique_letters(word) {
        return Err(BogstavbiError::word_list(format!(
            "'{}' repeats a letter",
            word
        )));
    }
    if !letters_of(word).all(char::is_alphabetic) {
        return Err(BogstavbiError::word_list(format!(
            "'{}' contains characters that are not letters",
            word
        )));
    }
    Ok(())
}
