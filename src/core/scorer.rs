use crate::domain::model::letters_of;
use std::collections::{BTreeSet, HashSet};

pub const PANGRAM_BONUS: u32 = 5;

/// True when the word uses every letter of the puzzle at least once.
pub fn is_pangram(word: &str, letter_set: &BTreeSet<char>) -> bool {
    let used: HashSet<char> = letters_of(word).collect();
    letter_set.iter().all(|letter| used.contains(letter))
}

/// One point per letter, plus the pangram bonus. Callers are expected to
/// have rejected words below the minimum length already.
pub fn score(word: &str, letter_set: &BTreeSet<char>) -> u32 {
    let length = word.chars().count() as u32;
    if is_pangram(word, letter_set) {
        length + PANGRAM_BONUS
    } else {
        length
    }
}
