use crate::domain::model::{HighScoreResponse, Puzzle, ValidationResponse};
use crate::domain::ports::{DictionaryOracle, PuzzleProvider};
use crate::utils::error::{BogstavbiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client side of the HTTP surface: fetches the puzzle and asks the host to
/// validate words, so clients never re-implement the engine.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    client: Client,
    base_url: Url,
}

impl RemoteEngine {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// 每個請求 (連線到讀完 body) 最多等 `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| BogstavbiError::InvalidConfigValueError {
            field: "server".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BogstavbiError::ConfigValidationError {
                field: "server".to_string(),
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn todays_high_score(&self) -> Result<u32> {
        let url = self.endpoint(&["todays-high-score"])?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: HighScoreResponse = response.json().await?;
        Ok(body.high_score)
    }

    pub async fn validate(&self, word: &str) -> Result<ValidationResponse> {
        let url = self.endpoint(&["validate-word", word])?;
        tracing::debug!("Validating '{}' at {}", word, url);

        let response = self.client.get(url).send().await?;
        if response.status().is_server_error() {
            return Err(BogstavbiError::oracle(format!(
                "server answered {} while validating '{}'",
                response.status(),
                word
            )));
        }
        Ok(response.error_for_status()?.json().await?)
    }
}

#[async_trait]
impl PuzzleProvider for RemoteEngine {
    async fn todays_puzzle(&self) -> Result<Puzzle> {
        let url = self.endpoint(&["todays-puzzle"])?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let puzzle: Puzzle = response.json().await?;
        puzzle.check_invariants()?;
        Ok(puzzle)
    }
}

#[async_trait]
impl DictionaryOracle for RemoteEngine {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        Ok(self.validate(word).await?.is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetches_and_checks_puzzle() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/todays-puzzle");
            then.status(200).json_body(serde_json::json!({
                "mandatoryLetter": "R",
                "freeLetters": ["S", "N", "Ø", "K", "L", "E"],
                "sourceWord": "SNØRKLE",
                "date": "2025-02-04"
            }));
        });

        let remote = RemoteEngine::new(&server.base_url()).unwrap();
        let puzzle = remote.todays_puzzle().await.unwrap();
        assert_eq!(puzzle.mandatory_letter(), 'R');
        assert_eq!(puzzle.letters().len(), 7);
    }

    #[tokio::test]
    async fn test_rejects_inconsistent_puzzle() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/todays-puzzle");
            then.status(200).json_body(serde_json::json!({
                "mandatoryLetter": "A",
                "freeLetters": ["S", "N", "Ø", "K", "L", "E"],
                "sourceWord": "SNØRKLE",
                "date": "2025-02-04"
            }));
        });

        let remote = RemoteEngine::new(&server.base_url()).unwrap();
        assert!(remote.todays_puzzle().await.is_err());
    }

    #[tokio::test]
    async fn test_validate_word_and_high_score() {
        let server = MockServer::start();
        let validate = server.mock(|when, then| {
            when.method(GET).path_contains("/api/validate-word/sn");
            then.status(200)
                .json_body(serde_json::json!({"isValid": true, "message": "Gyldig"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/todays-high-score");
            then.status(200).json_body(serde_json::json!({"highScore": 64}));
        });

        let remote = RemoteEngine::new(&server.url("/api/")).unwrap();
        assert!(remote.check_word_exists("snørkle").await.unwrap());
        assert_eq!(remote.todays_high_score().await.unwrap(), 64);
        validate.assert();
    }

    #[tokio::test]
    async fn test_server_failure_is_an_error_not_a_verdict() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("/validate-word/");
            then.status(503).json_body(
                serde_json::json!({"isValid": false, "message": "Kunne ikke validere ordet"}),
            );
        });

        let remote = RemoteEngine::new(&server.base_url()).unwrap();
        let err = remote.check_word_exists("klister").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("/validate-word/");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(serde_json::json!({"isValid": true, "message": "Gyldig"}));
        });

        let remote = RemoteEngine::with_timeout(&server.base_url(), Duration::from_millis(200)).unwrap();
        let err = remote.check_word_exists("klister").await.unwrap_err();
        assert!(matches!(err, BogstavbiError::HttpError(ref e) if e.is_timeout()));
        assert!(err.is_retryable());
    }
}
