use crate::domain::model::{letters_of, Puzzle, PUZZLE_SIZE};
use crate::utils::error::{BogstavbiError, Result};
use chrono::NaiveDate;
use rand::seq::SliceRandom;

/// Version of the mandatory-letter hash. Changing `date_hash` changes the
/// mandatory letter of dates that were already published, so bump this with it.
pub const CENTER_HASH_VERSION: u32 = 1;

/// Sum of the UTF-16 code units of the `YYYY-MM-DD` date string.
pub fn date_hash(date: NaiveDate) -> u32 {
    date.format("%Y-%m-%d")
        .to_string()
        .encode_utf16()
        .map(u32::from)
        .sum()
}

pub fn mandatory_index(date: NaiveDate) -> usize {
    date_hash(date) as usize % PUZZLE_SIZE
}

/// Splits a source word into the mandatory letter (chosen from the date) and
/// six free letters. The free letters come back in random order.
pub fn partition(word: &str, date: NaiveDate) -> Result<Puzzle> {
    let mut letters: Vec<char> = letters_of(word).collect();
    if letters.len() != PUZZLE_SIZE {
        return Err(BogstavbiError::word_list(format!(
            "cannot partition '{}': expected {} letters",
            word, PUZZLE_SIZE
        )));
    }

    let mandatory = letters.remove(mandatory_index(date));
    letters.shuffle(&mut rand::thread_rng());

    tracing::debug!(
        "Partitioned {} for {}: mandatory letter {}",
        word,
        date,
        mandatory
    );
    Puzzle::new(mandatory, letters, word, date)
}
