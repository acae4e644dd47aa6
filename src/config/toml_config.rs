use crate::config::ConfigProvider;
use crate::utils::error::{BogstavbiError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub oracle: OracleSection,
    pub cache: CacheSection,
    pub game: GameSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleSection {
    pub url: Option<String>,
    pub lexicon: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSection {
    pub capacity: Option<usize>,
    pub ttl_hours: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSection {
    pub word_list: Option<String>,
    pub high_score_floor: Option<u32>,
    pub min_word_length: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BogstavbiError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ORDNET_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            BogstavbiError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 只檢查檔案裡出現的欄位，缺席的交給 CLI 或預設值
    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.oracle.url {
            validation::validate_url("oracle.url", url)?;
        }
        if let Some(path) = &self.oracle.lexicon {
            validation::validate_path("oracle.lexicon", path)?;
        }
        if let Some(secs) = self.oracle.timeout_seconds {
            validation::validate_positive_number("oracle.timeout_seconds", secs, 1)?;
        }
        if let Some(capacity) = self.cache.capacity {
            validation::validate_positive_number("cache.capacity", capacity as u64, 1)?;
        }
        if let Some(hours) = self.cache.ttl_hours {
            validation::validate_range("cache.ttl_hours", hours, 1, super::MAX_CACHE_TTL_HOURS)?;
        }
        if let Some(path) = &self.game.word_list {
            validation::validate_file_extension("game.word_list", path, &["csv"])?;
        }
        if let Some(length) = self.game.min_word_length {
            validation::validate_range("game.min_word_length", length, 1, 7)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> Option<&str> {
        self.server.host.as_deref()
    }

    fn port(&self) -> Option<u16> {
        self.server.port
    }

    fn oracle_url(&self) -> Option<&str> {
        self.oracle.url.as_deref()
    }

    fn lexicon(&self) -> Option<&str> {
        self.oracle.lexicon.as_deref()
    }

    fn word_list(&self) -> Option<&str> {
        self.game.word_list.as_deref()
    }

    fn cache_capacity(&self) -> Option<usize> {
        self.cache.capacity
    }

    fn cache_ttl_hours(&self) -> Option<u64> {
        self.cache.ttl_hours
    }

    fn oracle_timeout_secs(&self) -> Option<u64> {
        self.oracle.timeout_seconds
    }

    fn high_score_floor(&self) -> Option<u32> {
        self.game.high_score_floor
    }

    fn min_word_length(&self) -> Option<usize> {
        self.game.min_word_length
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
