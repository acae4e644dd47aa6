use bogstavbi::adapters::{clock::SystemClock, lexicon::LexiconOracle, ordnet::OrdnetOracle};
use bogstavbi::config::{OracleSource, ServerSettings};
use bogstavbi::domain::ports::DictionaryOracle;
use bogstavbi::utils::error::ErrorSeverity;
use bogstavbi::utils::logger;
use bogstavbi::{server, BogstavbiError, CliConfig, PuzzleEngine, Result, WordList};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting bogstavbi server");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 合併並驗證配置
    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(settings).await {
        report(&e);
        std::process::exit(exit_code(e.severity()));
    }
}

async fn run(settings: ServerSettings) -> Result<()> {
    let words = match &settings.word_list {
        Some(path) => WordList::from_csv_path(path)?,
        None => WordList::builtin(),
    };
    tracing::info!("📚 {} source words available", words.len());

    let oracle: Arc<dyn DictionaryOracle> = match &settings.oracle {
        OracleSource::Ordnet { url } => {
            tracing::info!("🔎 Validating words against {}", url);
            Arc::new(OrdnetOracle::new(url.as_str()))
        }
        OracleSource::Lexicon { path } => Arc::new(LexiconOracle::from_file(path)?),
    };

    let addr = settings.socket_addr()?;
    let engine = Arc::new(PuzzleEngine::new(
        Arc::new(SystemClock),
        words,
        oracle,
        settings.engine.clone(),
    ));

    // 啟動前先確認今天的題目能建立
    let puzzle = engine.todays_puzzle()?;
    tracing::info!(
        "🐝 Puzzle for {} ready, mandatory letter {}",
        puzzle.date(),
        puzzle.mandatory_letter()
    );

    server::serve(engine, addr).await
}

fn report(e: &BogstavbiError) {
    tracing::error!(
        "❌ Server failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
}

/// 根據錯誤嚴重程度決定退出碼
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
