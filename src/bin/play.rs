use bogstavbi::adapters::clock::SystemClock;
use bogstavbi::adapters::remote::RemoteEngine;
use bogstavbi::core::engine::until_next_puzzle;
use bogstavbi::core::session::lookup_url;
use bogstavbi::core::validation_cache::{ValidationCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use bogstavbi::core::validator::CachedOracle;
use bogstavbi::domain::ports::DateProvider;
use bogstavbi::utils::logger;
use bogstavbi::{GameError, GameSession, SessionState};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "play")]
#[command(about = "Play today's Danish spelling bee in the terminal")]
struct PlayArgs {
    #[arg(long, default_value = "http://localhost:3001/api/")]
    server: String,

    #[arg(long, default_value = "4")]
    min_word_length: usize,

    #[arg(long, default_value = "5", help = "Seconds to wait for a word check")]
    timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

const HELP: &str = "Skriv bogstaver og tryk Enter. Tom linje = indsend, '-' = slet, '!' = ryd, '?' = bland";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = PlayArgs::parse();
    logger::init_cli_logger(args.verbose);

    let timeout = Duration::from_secs(args.timeout_secs.max(1));
    let remote = RemoteEngine::with_timeout(&args.server, timeout)?;
    // 同一個字只問伺服器一次，卡住的請求在 timeout 後放棄
    let checker = CachedOracle::new(
        Arc::new(remote.clone()),
        ValidationCache::new(DEFAULT_CAPACITY, DEFAULT_TTL),
        timeout,
    );
    let clock = SystemClock;
    let mut session = GameSession::with_min_word_length(args.min_word_length);

    load(&mut session, &remote).await;
    println!("{}", HELP);
    print_board(&session, &clock);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(session.state(), SessionState::Error(_)) {
            session.retry()?;
            load(&mut session, &remote).await;
            print_board(&session, &clock);
            continue;
        }

        if session.is_stale(clock.today()) {
            println!("🌅 Et nyt ord er klar!");
            session.reset();
            load(&mut session, &remote).await;
            print_board(&session, &clock);
            continue;
        }

        match line.trim() {
            "" => submit(&mut session, &checker, &remote).await,
            "-" => report(session.delete_last()),
            "!" => report(session.clear_input()),
            "?" => report(session.shuffle_letters()),
            letters => {
                for letter in letters.chars().filter(|c| !c.is_whitespace()) {
                    if let Err(e) = session.append_letter(letter) {
                        println!("❌ {}", e.user_message());
                        break;
                    }
                }
            }
        }
        print_board(&session, &clock);
    }

    println!("Farvel! Du fik {} point.", session.score());
    Ok(())
}

async fn load(session: &mut GameSession, remote: &RemoteEngine) {
    if let Err(e) = session.load(remote).await {
        println!("❌ {}", e.user_message());
        println!("Tryk Enter for at prøve igen.");
        return;
    }
    refresh_high_score(session, remote).await;
}

async fn refresh_high_score(session: &mut GameSession, remote: &RemoteEngine) {
    match remote.todays_high_score().await {
        Ok(high_score) => session.set_high_score_target(high_score),
        Err(e) => tracing::warn!("⚠️ Could not fetch high score: {}", e),
    }
}

async fn submit(
    session: &mut GameSession,
    checker: &CachedOracle<RemoteEngine>,
    remote: &RemoteEngine,
) {
    match session.submit(checker).await {
        Ok(accepted) => {
            println!("✅ {}  {}", accepted.message(), lookup_url(&accepted.word));
            refresh_high_score(session, remote).await;
        }
        Err(e) => println!("❌ {}", e.user_message()),
    }
}

fn report(result: Result<(), GameError>) {
    if let Err(e) = result {
        println!("❌ {}", e.user_message());
    }
}

fn print_board(session: &GameSession, clock: &impl DateProvider) {
    let Some(puzzle) = session.puzzle() else {
        return;
    };
    if *session.state() != SessionState::Ready {
        return;
    }

    let free: Vec<String> = puzzle.free_letters().iter().map(char::to_string).collect();
    println!();
    println!("  [{}]  {}", puzzle.mandatory_letter(), free.join(" "));
    println!("  > {}", session.current_input());
    println!(
        "  Point: {} / {} ({:.0}%)  Fundne ord: {}",
        session.score(),
        session.high_score_target(),
        session.progress() * 100.0,
        session.found_words().join(", ")
    );
    println!("  Nyt ord om {}", countdown(clock));
}

fn countdown(clock: &impl DateProvider) -> String {
    let secs = until_next_puzzle(clock).as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
