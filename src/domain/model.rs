use crate::utils::error::{BogstavbiError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const PUZZLE_SIZE: usize = 7;

/// Upper-cases every character of a word, one letter at a time.
pub fn letters_of(word: &str) -> impl Iterator<Item = char> + '_ {
    word.chars().flat_map(char::to_uppercase)
}

pub fn normalize_letter(letter: char) -> char {
    letter.to_uppercase().next().unwrap_or(letter)
}

/// 玩家輸入與快取鍵一律使用小寫
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

pub fn has_unique_letters(word: &str) -> bool {
    let letters: Vec<char> = letters_of(word).collect();
    let unique: BTreeSet<char> = letters.iter().copied().collect();
    unique.len() == letters.len()
}

/// One day's puzzle. The presentation order of `free_letters` carries no
/// meaning, so equality ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    mandatory_letter: char,
    free_letters: Vec<char>,
    source_word: String,
    date: NaiveDate,
}

impl Puzzle {
    pub fn new(
        mandatory_letter: char,
        free_letters: Vec<char>,
        source_word: &str,
        date: NaiveDate,
    ) -> Result<Self> {
        let puzzle = Self {
            mandatory_letter: normalize_letter(mandatory_letter),
            free_letters: free_letters.into_iter().map(normalize_letter).collect(),
            source_word: source_word.to_uppercase(),
            date,
        };
        puzzle.check_invariants()?;
        Ok(puzzle)
    }

    /// Checks that the seven letters are distinct and match the source word.
    pub fn check_invariants(&self) -> Result<()> {
        let source: Vec<char> = letters_of(&self.source_word).collect();
        if source.len() != PUZZLE_SIZE || !has_unique_letters(&self.source_word) {
            return Err(BogstavbiError::word_list(format!(
                "source word '{}' must have {} distinct letters",
                self.source_word, PUZZLE_SIZE
            )));
        }
        if self.free_letters.len() != PUZZLE_SIZE - 1 {
            return Err(BogstavbiError::word_list(format!(
                "puzzle needs {} free letters, got {}",
                PUZZLE_SIZE - 1,
                self.free_letters.len()
            )));
        }

        let letters = self.letters();
        let source_set: BTreeSet<char> = source.into_iter().collect();
        if letters.len() != PUZZLE_SIZE || letters != source_set {
            return Err(BogstavbiError::word_list(format!(
                "puzzle letters do not match source word '{}'",
                self.source_word
            )));
        }
        Ok(())
    }

    pub fn mandatory_letter(&self) -> char {
        self.mandatory_letter
    }

    pub fn free_letters(&self) -> &[char] {
        &self.free_letters
    }

    pub fn source_word(&self) -> &str {
        &self.source_word
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// All seven letters, mandatory included.
    pub fn letters(&self) -> BTreeSet<char> {
        self.free_letters
            .iter()
            .copied()
            .chain(std::iter::once(self.mandatory_letter))
            .collect()
    }

    pub fn contains_letter(&self, letter: char) -> bool {
        let letter = normalize_letter(letter);
        letter == self.mandatory_letter || self.free_letters.contains(&letter)
    }

    pub fn contains_mandatory(&self, word: &str) -> bool {
        letters_of(word).any(|l| l == self.mandatory_letter)
    }

    pub fn uses_only_puzzle_letters(&self, word: &str) -> bool {
        letters_of(word).all(|l| self.contains_letter(l))
    }

    /// Same puzzle with the free letters in a new random order.
    pub fn shuffled(&self) -> Self {
        use rand::seq::SliceRandom;

        let mut puzzle = self.clone();
        puzzle.free_letters.shuffle(&mut rand::thread_rng());
        puzzle
    }
}

impl PartialEq for Puzzle {
    fn eq(&self, other: &Self) -> bool {
        self.mandatory_letter == other.mandatory_letter
            && self.source_word == other.source_word
            && self.date == other.date
            && self.letters() == other.letters()
    }
}

impl Eq for Puzzle {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResponse {
    pub const VALID_MESSAGE: &'static str = "Gyldig";
    pub const INVALID_MESSAGE: &'static str = "Ikke et gyldigt dansk ord";
    pub const UNAVAILABLE_MESSAGE: &'static str = "Kunne ikke validere ordet";

    pub fn from_verdict(is_valid: bool) -> Self {
        Self {
            is_valid,
            message: if is_valid {
                Self::VALID_MESSAGE
            } else {
                Self::INVALID_MESSAGE
            }
            .to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::rejected(Self::UNAVAILABLE_MESSAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreResponse {
    pub high_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 4).unwrap()
    }

    #[test]
    fn test_puzzle_accepts_matching_letters() {
        let puzzle = Puzzle::new('r', vec!['s', 'n', 'ø', 'k', 'l', 'e'], "snørkle", date()).unwrap();

        assert_eq!(puzzle.mandatory_letter(), 'R');
        assert_eq!(puzzle.source_word(), "SNØRKLE");
        assert_eq!(puzzle.letters().len(), 7);
        assert!(puzzle.contains_letter('ø'));
        assert!(!puzzle.contains_letter('a'));
    }

    #[test]
    fn test_puzzle_rejects_mismatched_letters() {
        let result = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L', 'A'], "SNØRKLE", date());
        assert!(result.is_err());

        let result = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L'], "SNØRKLE", date());
        assert!(result.is_err());

        let result = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L', 'L'], "SNØRKLL", date());
        assert!(result.is_err());
    }

    #[test]
    fn test_shuffle_keeps_puzzle_identity() {
        let puzzle = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L', 'E'], "SNØRKLE", date()).unwrap();
        let shuffled = puzzle.shuffled();
        assert_eq!(puzzle, shuffled);
        assert_eq!(puzzle.letters(), shuffled.letters());
    }

    #[test]
    fn test_word_letter_checks_are_case_insensitive() {
        let puzzle = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L', 'E'], "SNØRKLE", date()).unwrap();
        assert!(puzzle.contains_mandatory("snører"));
        assert!(!puzzle.contains_mandatory("snøkle"));
        assert!(puzzle.uses_only_puzzle_letters("SnØrkle"));
        assert!(!puzzle.uses_only_puzzle_letters("snøre1"));
    }

    #[test]
    fn test_puzzle_serializes_in_camel_case() {
        let puzzle = Puzzle::new('R', vec!['S', 'N', 'Ø', 'K', 'L', 'E'], "SNØRKLE", date()).unwrap();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["mandatoryLetter"], "R");
        assert_eq!(json["sourceWord"], "SNØRKLE");
        assert_eq!(json["date"], "2025-02-04");
        assert_eq!(json["freeLetters"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_has_unique_letters() {
        assert!(has_unique_letters("Kraftig"));
        assert!(!has_unique_letters("Klatret"));
    }
}
