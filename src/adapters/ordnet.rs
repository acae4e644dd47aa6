use crate::domain::ports::DictionaryOracle;
use crate::utils::error::{BogstavbiError, Result};
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_ORDNET_URL: &str = "https://ordnet.dk";

/// Text ordnet.dk shows when a search has no hits.
pub const NO_RESULTS_MARKER: &str = "Der er ingen resultater med";

/// Looks words up in Den Danske Ordbog on ordnet.dk.
#[derive(Debug, Clone)]
pub struct OrdnetOracle {
    client: Client,
    base_url: String,
}

impl OrdnetOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/ddo/ordbog", self.base_url)
    }
}

impl Default for OrdnetOracle {
    fn default() -> Self {
        Self::new(DEFAULT_ORDNET_URL)
    }
}

#[async_trait]
impl DictionaryOracle for OrdnetOracle {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        tracing::debug!("Making ordnet request for: {}", word);
        let response = self
            .client
            .get(self.search_url())
            .query(&[("query", word)])
            .send()
            .await?;

        tracing::debug!("Ordnet response status: {}", response.status());
        if !response.status().is_success() {
            return Err(BogstavbiError::oracle(format!(
                "ordnet answered {} for '{}'",
                response.status(),
                word
            )));
        }

        let html = response.text().await?;
        Ok(!html.contains(NO_RESULTS_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_found_word_is_valid() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ddo/ordbog")
                .query_param("query", "snørkle");
            then.status(200)
                .body("<html><h1>snørkle</h1><p>verbum</p></html>");
        });

        let oracle = OrdnetOracle::new(server.base_url());
        assert!(oracle.check_word_exists("snørkle").await.unwrap());
        mock.assert();
    }

    #[tokio::test]
    async fn test_no_results_marker_means_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ddo/ordbog");
            then.status(200)
                .body("<div>Der er ingen resultater med rknes</div>");
        });

        let oracle = OrdnetOracle::new(format!("{}/", server.base_url()));
        assert!(!oracle.check_word_exists("rknes").await.unwrap());
    }

    #[tokio::test]
    async fn test_server_error_is_not_a_verdict() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ddo/ordbog");
            then.status(502);
        });

        let oracle = OrdnetOracle::new(server.base_url());
        let err = oracle.check_word_exists("klister").await.unwrap_err();
        assert!(matches!(err, BogstavbiError::OracleError { .. }));
    }
}
