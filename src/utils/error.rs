use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BogstavbiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Word list error: {message}")]
    WordListError { message: String },

    #[error("Dictionary oracle error: {message}")]
    OracleError { message: String },

    #[error("Dictionary oracle did not answer within {0:?}")]
    OracleTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, BogstavbiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BogstavbiError {
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::OracleError {
            message: message.into(),
        }
    }

    pub fn word_list(message: impl Into<String>) -> Self {
        Self::WordListError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::CsvError(_) | Self::SerializationError(_) | Self::WordListError { .. } => {
                ErrorCategory::Data
            }
            Self::HttpError(_) | Self::OracleError { .. } | Self::OracleTimeout(_) => {
                ErrorCategory::Network
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 字典查詢失敗可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 判斷錯誤是否為暫時性（可重試）
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line flags"
            }
            Self::WordListError { .. } | Self::CsvError(_) => {
                "Every word list entry must have 7 distinct letters; dates use YYYY-MM-DD"
            }
            Self::HttpError(_) | Self::OracleError { .. } | Self::OracleTimeout(_) => {
                "The dictionary service may be unreachable; try again shortly"
            }
            Self::SerializationError(_) => "The server answered with an unexpected payload",
            Self::IoError(_) => "Check that the referenced files exist and are readable",
        }
    }

    /// 給玩家看的訊息（丹麥文）
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => "Kunne ikke validere ordet".to_string(),
            ErrorCategory::Configuration => format!("Ugyldig konfiguration: {}", self),
            ErrorCategory::Data => "Der opstod en fejl ved indlæsning af spillet".to_string(),
            ErrorCategory::System => format!("Systemfejl: {}", self),
        }
    }
}

/// Outcomes a player can run into while playing. Everything except
/// `ValidationUnavailable` and `PuzzleLoadFailure` is the player's own mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("word is shorter than {min} letters")]
    InputTooShort { min: usize },

    #[error("word does not contain the mandatory letter {letter}")]
    MissingMandatoryLetter { letter: char },

    #[error("word '{word}' has already been found")]
    AlreadyFound { word: String },

    #[error("word uses letters outside the puzzle")]
    LettersNotInPuzzle,

    #[error("'{word}' is not a recognized word")]
    NotARecognizedWord { word: String },

    #[error("word validation is unavailable: {reason}")]
    ValidationUnavailable { reason: String },

    #[error("today's puzzle could not be loaded: {reason}")]
    PuzzleLoadFailure { reason: String },

    #[error("letter {letter} is not part of the puzzle")]
    LetterNotInPuzzle { letter: char },

    #[error("action not allowed while the session is {state}")]
    InvalidState { state: &'static str },
}

impl GameError {
    pub fn is_system_fault(&self) -> bool {
        matches!(
            self,
            Self::ValidationUnavailable { .. } | Self::PuzzleLoadFailure { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InputTooShort { min } => {
                format!("Ordet skal være mindst {} bogstaver langt", min)
            }
            Self::MissingMandatoryLetter { .. } => {
                "Ordet skal indeholde midterbogstavet".to_string()
            }
            Self::AlreadyFound { .. } => "Du har allerede fundet dette ord".to_string(),
            Self::LettersNotInPuzzle => {
                "Ordet kan ikke dannes af de givne bogstaver".to_string()
            }
            Self::NotARecognizedWord { .. } => "Ikke et gyldigt dansk ord".to_string(),
            Self::ValidationUnavailable { .. } => "Kunne ikke validere ordet".to_string(),
            Self::PuzzleLoadFailure { .. } => {
                "Der opstod en fejl ved indlæsning af spillet".to_string()
            }
            Self::LetterNotInPuzzle { letter } => format!("{} er ikke et af bogstaverne", letter),
            Self::InvalidState { .. } => "Vent et øjeblik".to_string(),
        }
    }
}

impl From<BogstavbiError> for GameError {
    fn from(err: BogstavbiError) -> Self {
        GameError::ValidationUnavailable {
            reason: err.to_string(),
        }
    }
}
