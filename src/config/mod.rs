pub mod toml_config;

use crate::adapters::ordnet::DEFAULT_ORDNET_URL;
use crate::core::engine::EngineSettings;
use crate::domain::model::PUZZLE_SIZE;
use crate::utils::error::{BogstavbiError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

pub use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365;

/// 設定來源，每個欄位都可以缺席，由下一層補上
pub trait ConfigProvider {
    fn host(&self) -> Option<&str>;
    fn port(&self) -> Option<u16>;
    fn oracle_url(&self) -> Option<&str>;
    fn lexicon(&self) -> Option<&str>;
    fn word_list(&self) -> Option<&str>;
    fn cache_capacity(&self) -> Option<usize>;
    fn cache_ttl_hours(&self) -> Option<u64>;
    fn oracle_timeout_secs(&self) -> Option<u64>;
    fn high_score_floor(&self) -> Option<u32>;
    fn min_word_length(&self) -> Option<usize>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "bogstavbi")]
#[command(about = "Daily Danish spelling bee: puzzle, word validation and high score API")]
pub struct CliConfig {
    #[arg(long, help = "Address to bind (default 0.0.0.0)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (default 3001)")]
    pub port: Option<u16>,

    #[arg(long, help = "Base URL of ordnet.dk")]
    pub oracle_url: Option<String>,

    #[arg(long, help = "Use an offline word list instead of ordnet.dk")]
    pub lexicon: Option<String>,

    #[arg(long, help = "CSV file with the daily source words")]
    pub word_list: Option<String>,

    #[arg(long)]
    pub cache_capacity: Option<usize>,

    #[arg(long)]
    pub cache_ttl_hours: Option<u64>,

    #[arg(long)]
    pub oracle_timeout_secs: Option<u64>,

    #[arg(long)]
    pub high_score_floor: Option<u32>,

    #[arg(long)]
    pub min_word_length: Option<usize>,

    #[arg(long, help = "TOML configuration file; flags override it")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 合併 CLI 與 TOML 設定並驗證
    pub fn load_settings(&self) -> Result<ServerSettings> {
        let settings = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                tracing::info!("📄 Loaded configuration from {}", path);
                let providers: [&dyn ConfigProvider; 2] = [self, &file];
                ServerSettings::layered(&providers)
            }
            None => ServerSettings::layered(&[self as &dyn ConfigProvider]),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl ConfigProvider for CliConfig {
    fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    fn port(&self) -> Option<u16> {
        self.port
    }

    fn oracle_url(&self) -> Option<&str> {
        self.oracle_url.as_deref()
    }

    fn lexicon(&self) -> Option<&str> {
        self.lexicon.as_deref()
    }

    fn word_list(&self) -> Option<&str> {
        self.word_list.as_deref()
    }

    fn cache_capacity(&self) -> Option<usize> {
        self.cache_capacity
    }

    fn cache_ttl_hours(&self) -> Option<u64> {
        self.cache_ttl_hours
    }

    fn oracle_timeout_secs(&self) -> Option<u64> {
        self.oracle_timeout_secs
    }

    fn high_score_floor(&self) -> Option<u32> {
        self.high_score_floor
    }

    fn min_word_length(&self) -> Option<usize> {
        self.min_word_length
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleSource {
    Ordnet { url: String },
    Lexicon { path: PathBuf },
}

/// 解析完成、可直接啟動伺服器的設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub oracle: OracleSource,
    pub word_list: Option<PathBuf>,
    pub engine: EngineSettings,
}

fn first<T>(
    providers: &[&dyn ConfigProvider],
    pick: impl Fn(&dyn ConfigProvider) -> Option<T>,
) -> Option<T> {
    providers.iter().find_map(|p| pick(*p))
}

impl ServerSettings {
    /// 前面的來源優先；全部缺席時使用預設值
    pub fn layered(providers: &[&dyn ConfigProvider]) -> Self {
        let defaults = EngineSettings::default();

        // 同一層同時給了兩者時，離線字典優先
        let oracle = first(providers, |p| match (p.lexicon(), p.oracle_url()) {
            (Some(path), _) => Some(OracleSource::Lexicon {
                path: PathBuf::from(path),
            }),
            (None, Some(url)) => Some(OracleSource::Ordnet {
                url: url.to_string(),
            }),
            (None, None) => None,
        })
        .unwrap_or_else(|| OracleSource::Ordnet {
            url: DEFAULT_ORDNET_URL.to_string(),
        });

        let engine = EngineSettings {
            min_word_length: first(providers, |p| p.min_word_length())
                .unwrap_or(defaults.min_word_length),
            high_score_floor: first(providers, |p| p.high_score_floor())
                .unwrap_or(defaults.high_score_floor),
            cache_capacity: first(providers, |p| p.cache_capacity())
                .unwrap_or(defaults.cache_capacity),
            cache_ttl: first(providers, |p| p.cache_ttl_hours())
                .map(|hours| {
                    // 溢位的值留給 validate 拒絕
                    hours
                        .checked_mul(3600)
                        .map_or(Duration::MAX, Duration::from_secs)
                })
                .unwrap_or(defaults.cache_ttl),
            oracle_timeout: first(providers, |p| p.oracle_timeout_secs())
                .map(Duration::from_secs)
                .unwrap_or(defaults.oracle_timeout),
        };

        Self {
            host: first(providers, |p| p.host().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: first(providers, |p| p.port()).unwrap_or(DEFAULT_PORT),
            oracle,
            word_list: first(providers, |p| p.word_list().map(PathBuf::from)),
            engine,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let mut addrs = (self.host.as_str(), self.port).to_socket_addrs()?;
        addrs.next().ok_or_else(|| {
            BogstavbiError::InvalidConfigValueError {
                field: "host".to_string(),
                value: self.host.clone(),
                reason: "Host did not resolve to any address".to_string(),
            }
        })
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("port", u64::from(self.port), 1)?;

        match &self.oracle {
            OracleSource::Ordnet { url } => validate_url("oracle_url", url)?,
            OracleSource::Lexicon { path } => {
                validate_path("lexicon", &path.to_string_lossy())?;
            }
        }

        if let Some(path) = &self.word_list {
            validate_file_extension("word_list", &path.to_string_lossy(), &["csv"])?;
        }

        validate_positive_number("cache_capacity", self.engine.cache_capacity as u64, 1)?;
        validate_range(
            "cache_ttl_hours",
            self.engine.cache_ttl.as_secs() / 3600,
            1,
            MAX_CACHE_TTL_HOURS,
        )?;
        validate_positive_number("oracle_timeout_secs", self.engine.oracle_timeout.as_secs(), 1)?;
        validate_range("min_word_length", self.engine.min_word_length, 1, PUZZLE_SIZE)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = CliConfig::default().load_settings().unwrap();

        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 3001);
        assert_eq!(
            settings.oracle,
            OracleSource::Ordnet {
                url: "https://ordnet.dk".to_string()
            }
        );
        assert_eq!(settings.word_list, None);
        assert_eq!(settings.engine, EngineSettings::default());
    }

    #[test]
    fn test_parse_flags() {
        let cli = CliConfig::parse_from([
            "bogstavbi",
            "--port",
            "8080",
            "--lexicon",
            "ord.txt",
            "--cache-ttl-hours",
            "2",
            "--verbose",
        ]);
        let settings = cli.load_settings().unwrap();

        assert!(cli.verbose);
        assert_eq!(settings.port, 8080);
        assert_eq!(
            settings.oracle,
            OracleSource::Lexicon {
                path: PathBuf::from("ord.txt")
            }
        );
        assert_eq!(settings.engine.cache_ttl, Duration::from_secs(7200));
    }

    #[test]
    fn test_flags_override_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 4000
host = "127.0.0.1"

[oracle]
lexicon = "ord.txt"

[game]
high_score_floor = 80
"#
        )
        .unwrap();

        let cli = CliConfig {
            port: Some(5000),
            oracle_url: Some("http://localhost:9000".to_string()),
            config: Some(file.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let settings = cli.load_settings().unwrap();

        assert_eq!(settings.port, 5000);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(
            settings.oracle,
            OracleSource::Ordnet {
                url: "http://localhost:9000".to_string()
            }
        );
        assert_eq!(settings.engine.high_score_floor, 80);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cli = CliConfig {
            oracle_url: Some("ftp://ordnet.dk".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            cli.load_settings(),
            Err(BogstavbiError::InvalidConfigValueError { .. })
        ));

        let cli = CliConfig {
            cache_capacity: Some(0),
            ..Default::default()
        };
        assert!(cli.load_settings().is_err());

        let cli = CliConfig {
            word_list: Some("ord.json".to_string()),
            ..Default::default()
        };
        assert!(cli.load_settings().is_err());
    }

    #[test]
    fn test_huge_cache_ttl_is_rejected_not_overflowed() {
        let cli = CliConfig {
            cache_ttl_hours: Some(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            cli.load_settings(),
            Err(BogstavbiError::InvalidConfigValueError { .. })
        ));

        let cli = CliConfig {
            cache_ttl_hours: Some(MAX_CACHE_TTL_HOURS),
            ..Default::default()
        };
        assert!(cli.load_settings().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let settings = CliConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(3001),
            ..Default::default()
        }
        .load_settings()
        .unwrap();
        assert_eq!(
            settings.socket_addr().unwrap(),
            "127.0.0.1:3001".parse().unwrap()
        );
    }
}
