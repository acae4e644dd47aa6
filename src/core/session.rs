use crate::core::ledger::{DEFAULT_HIGH_SCORE_FLOOR, DEFAULT_MIN_WORD_LENGTH};
use crate::core::scorer::{is_pangram, score};
use crate::domain::model::{normalize_letter, normalize_word, Puzzle};
use crate::domain::ports::{DictionaryOracle, PuzzleProvider};
use crate::utils::error::GameError;
use chrono::NaiveDate;
use std::fmt;

const LOOKUP_BASE_URL: &str = "https://ordnet.dk/ddo/ordbog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Submitting,
    Error(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
            SessionState::Submitting => "submitting",
            SessionState::Error(_) => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWord {
    pub word: String,
    pub points: u32,
    pub is_pangram: bool,
}

impl AcceptedWord {
    pub fn message(&self) -> String {
        if self.is_pangram {
            format!("Pangram! +{} point!", self.points)
        } else {
            format!("+{} point!", self.points)
        }
    }
}

/// Puts the state back to `Ready` if a submission is dropped mid-lookup.
struct SubmittingGuard<'a>(&'a mut SessionState);

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a mut SessionState) -> Self {
        *state = SessionState::Submitting;
        Self(state)
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if *self.0 == SessionState::Submitting {
            *self.0 = SessionState::Ready;
        }
    }
}

/// One player's game for one page lifetime.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    puzzle: Option<Puzzle>,
    current_input: String,
    found_words: Vec<String>,
    pangrams_found: Vec<String>,
    score: u32,
    high_score_target: u32,
    min_word_length: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self::with_min_word_length(DEFAULT_MIN_WORD_LENGTH)
    }

    pub fn with_min_word_length(min_word_length: usize) -> Self {
        Self {
            state: SessionState::Loading,
            puzzle: None,
            current_input: String::new(),
            found_words: Vec::new(),
            pangrams_found: Vec::new(),
            score: 0,
            high_score_target: DEFAULT_HIGH_SCORE_FLOOR,
            min_word_length,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn found_words(&self) -> &[String] {
        &self.found_words
    }

    pub fn pangrams_found(&self) -> &[String] {
        &self.pangrams_found
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score_target(&self) -> u32 {
        self.high_score_target
    }

    pub fn set_high_score_target(&mut self, target: u32) {
        self.high_score_target = target;
    }

    /// Score relative to the day's high score, capped at 1.0.
    pub fn progress(&self) -> f64 {
        if self.high_score_target == 0 {
            return 1.0;
        }
        (self.score as f64 / self.high_score_target as f64).min(1.0)
    }

    /// The session belongs to another day and should be reloaded.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.puzzle.as_ref().is_some_and(|p| p.date() != today)
    }

    fn require_ready(&self) -> Result<&Puzzle, GameError> {
        match (&self.state, &self.puzzle) {
            (SessionState::Ready, Some(puzzle)) => Ok(puzzle),
            (state, _) => Err(GameError::InvalidState { state: state.name() }),
        }
    }

    /// Loading -> Ready, or Loading -> Error when the puzzle cannot be fetched.
    pub async fn load<P: PuzzleProvider + ?Sized>(&mut self, provider: &P) -> Result<(), GameError> {
        if self.state != SessionState::Loading {
            return Err(GameError::InvalidState {
                state: self.state.name(),
            });
        }

        match provider.todays_puzzle().await {
            Ok(puzzle) => {
                tracing::debug!("Session loaded puzzle for {}", puzzle.date());
                self.puzzle = Some(puzzle);
                self.current_input.clear();
                self.found_words.clear();
                self.pangrams_found.clear();
                self.score = 0;
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not load puzzle: {}", e);
                self.state = SessionState::Error(e.to_string());
                Err(GameError::PuzzleLoadFailure {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Error -> Loading.
    pub fn retry(&mut self) -> Result<(), GameError> {
        match self.state {
            SessionState::Error(_) => {
                self.state = SessionState::Loading;
                Ok(())
            }
            _ => Err(GameError::InvalidState {
                state: self.state.name(),
            }),
        }
    }

    /// Drops the current puzzle and all progress, e.g. when the date changed.
    pub fn reset(&mut self) {
        *self = Self {
            high_score_target: self.high_score_target,
            ..Self::with_min_word_length(self.min_word_length)
        };
    }

    pub fn append_letter(&mut self, letter: char) -> Result<(), GameError> {
        let letter = normalize_letter(letter);
        if !self.require_ready()?.contains_letter(letter) {
            return Err(GameError::LetterNotInPuzzle { letter });
        }
        self.current_input.push(letter);
        Ok(())
    }

    /// Replaces the input with typed text, without filtering letters.
    pub fn set_input(&mut self, text: &str) -> Result<(), GameError> {
        self.require_ready()?;
        self.current_input = text.trim().to_uppercase();
        Ok(())
    }

    pub fn delete_last(&mut self) -> Result<(), GameError> {
        self.require_ready()?;
        self.current_input.pop();
        Ok(())
    }

    pub fn clear_input(&mut self) -> Result<(), GameError> {
        self.require_ready()?;
        self.current_input.clear();
        Ok(())
    }

    /// Shuffles the free letters for display.
    pub fn shuffle_letters(&mut self) -> Result<(), GameError> {
        let shuffled = self.require_ready()?.shuffled();
        self.puzzle = Some(shuffled);
        Ok(())
    }

    /// Validates the current input. Rejections leave the input untouched so
    /// the player can fix it; an accepted word clears it.
    pub async fn submit<O: DictionaryOracle + ?Sized>(
        &mut self,
        oracle: &O,
    ) -> Result<AcceptedWord, GameError> {
        let puzzle = self.require_ready()?.clone();
        let word = normalize_word(&self.current_input);

        if word.chars().count() < self.min_word_length {
            return Err(GameError::InputTooShort {
                min: self.min_word_length,
            });
        }
        if !puzzle.contains_mandatory(&word) {
            return Err(GameError::MissingMandatoryLetter {
                letter: puzzle.mandatory_letter(),
            });
        }
        if self.found_words.contains(&word) {
            return Err(GameError::AlreadyFound { word });
        }
        if !puzzle.uses_only_puzzle_letters(&word) {
            return Err(GameError::LettersNotInPuzzle);
        }

        let verdict = {
            let _guard = SubmittingGuard::enter(&mut self.state);
            oracle.check_word_exists(&word).await
        };

        match verdict {
            Ok(true) => {
                let letters = puzzle.letters();
                let accepted = AcceptedWord {
                    points: score(&word, &letters),
                    is_pangram: is_pangram(&word, &letters),
                    word,
                };
                self.found_words.push(accepted.word.clone());
                if accepted.is_pangram {
                    self.pangrams_found.push(accepted.word.clone());
                }
                self.score += accepted.points;
                self.current_input.clear();
                Ok(accepted)
            }
            Ok(false) => Err(GameError::NotARecognizedWord { word }),
            Err(e) => Err(GameError::ValidationUnavailable {
                reason: e.to_string(),
            }),
        }
    }
}

/// Dictionary page for a found word.
pub fn lookup_url(word: &str) -> String {
    let mut url = match url::Url::parse(LOOKUP_BASE_URL) {
        Ok(url) => url,
        Err(_) => return format!("{}?query={}", LOOKUP_BASE_URL, word),
    };
    url.query_pairs_mut().append_pair("query", word);
    url.to_string()
}
