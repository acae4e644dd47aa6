use crate::core::validation_cache::{CacheStats, ValidationCache};
use crate::domain::model::normalize_word;
use crate::domain::ports::DictionaryOracle;
use crate::utils::error::{BogstavbiError, Result};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum LookupFailure {
    Timeout(Duration),
    Failed(String),
}

impl LookupFailure {
    fn into_error(self) -> BogstavbiError {
        match self {
            LookupFailure::Timeout(limit) => BogstavbiError::OracleTimeout(limit),
            LookupFailure::Failed(message) => BogstavbiError::oracle(message),
        }
    }
}

type Lookup = Shared<BoxFuture<'static, std::result::Result<bool, LookupFailure>>>;

/// Puts a `ValidationCache` in front of a dictionary oracle.
///
/// Concurrent lookups of the same uncached word share one oracle call. Each
/// call is bounded by a timeout. Only successful verdicts are cached, so a
/// failed lookup is retried by the next caller.
pub struct CachedOracle<O: ?Sized> {
    oracle: Arc<O>,
    cache: Arc<ValidationCache>,
    in_flight: Arc<Mutex<HashMap<String, Lookup>>>,
    timeout: Duration,
}

impl<O: DictionaryOracle + ?Sized + 'static> CachedOracle<O> {
    pub fn new(oracle: Arc<O>, cache: ValidationCache, timeout: Duration) -> Self {
        Self {
            oracle,
            cache: Arc::new(cache),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn is_legitimate_word(&self, word: &str) -> Result<bool> {
        let key = normalize_word(word);
        if let Some(is_valid) = self.cache.get(&key) {
            tracing::debug!("Cache hit for '{}': {}", key, is_valid);
            return Ok(is_valid);
        }

        self.lookup_for(&key)
            .await
            .map_err(LookupFailure::into_error)
    }

    fn lookup_for(&self, key: &str) -> Lookup {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(key) {
            tracing::debug!("Joining in-flight lookup for '{}'", key);
            return existing.clone();
        }

        // 另一個查詢可能在我們取鎖之前剛完成
        if let Some(is_valid) = self.cache.peek(key) {
            return futures_util::future::ready(Ok(is_valid)).boxed().shared();
        }

        let lookup = Self::spawn_lookup(
            Arc::clone(&self.oracle),
            Arc::clone(&self.cache),
            Arc::clone(&self.in_flight),
            key.to_string(),
            self.timeout,
        );
        in_flight.insert(key.to_string(), lookup.clone());
        lookup
    }

    /// Runs the oracle call as its own task, so it finishes, caches its
    /// verdict and leaves `in_flight` even if every waiter goes away.
    fn spawn_lookup(
        oracle: Arc<O>,
        cache: Arc<ValidationCache>,
        in_flight: Arc<Mutex<HashMap<String, Lookup>>>,
        word: String,
        timeout: Duration,
    ) -> Lookup {
        let task = tokio::spawn(async move {
            tracing::debug!("Asking dictionary oracle about '{}'", word);
            let result = match tokio::time::timeout(timeout, oracle.check_word_exists(&word)).await
            {
                Ok(Ok(is_valid)) => {
                    cache.insert_if_absent_or_stale(&word, is_valid);
                    Ok(is_valid)
                }
                Ok(Err(e)) => {
                    tracing::warn!("⚠️ Dictionary lookup for '{}' failed: {}", word, e);
                    Err(LookupFailure::Failed(e.to_string()))
                }
                Err(_) => {
                    tracing::warn!(
                        "⏱️ Dictionary lookup for '{}' timed out after {:?}",
                        word,
                        timeout
                    );
                    Err(LookupFailure::Timeout(timeout))
                }
            };
            in_flight.lock().remove(&word);
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(LookupFailure::Failed(format!("lookup task failed: {}", e))))
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl<O: DictionaryOracle + ?Sized + 'static> DictionaryOracle for CachedOracle<O> {
    async fn check_word_exists(&self, word: &str) -> Result<bool> {
        self.is_legitimate_word(word).await
    }
}
