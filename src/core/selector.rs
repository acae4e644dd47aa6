use crate::domain::word_list::{DailyWord, WordList};
use chrono::{Datelike, NaiveDate};

/// `num_days_from_ce` of the anchor date 2025-02-04, the day the game launched.
pub const ANCHOR_DAYS_FROM_CE: i32 = 739_286;

pub fn days_since_anchor(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - ANCHOR_DAYS_FROM_CE)
}

/// Picks the source word for a date: the curated entry for that date if
/// there is one, otherwise the list is cycled by days since the anchor.
/// Dates before the anchor wrap around as well.
pub fn select_daily_word(date: NaiveDate, words: &WordList) -> &DailyWord {
    if let Some(curated) = words.curated_for(date) {
        return curated;
    }

    let index = days_since_anchor(date).rem_euclid(words.len() as i64) as usize;
    &words.entries()[index]
}

pub fn select_source_word(date: NaiveDate, words: &WordList) -> &str {
    &select_daily_word(date, words).word
}
