// Stat hub entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config (stathub.toml, defaults when absent)
// 3. Build the engine and load the tables once
// 4. Render standings, leaders, ticker, and the record book as text

use stat_hub::config;
use stat_hub::engine::{StatEngine, Tables};
use stat_hub::queries::{self, StatCategory};

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("stat hub starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: source={}, ttl={}s, timeout={}s",
        config.source_url,
        config.cache_ttl.as_secs(),
        config.fetch_timeout.as_secs()
    );

    let mut engine = StatEngine::from_config(&config);
    let tables = engine.load_or_empty().await;

    if tables.is_empty() {
        // The engine logs the cause; the reader just sees the state.
        println!("Box scores unavailable right now. Try again shortly.");
        return Ok(());
    }

    render(&tables);
    Ok(())
}

fn render(tables: &Tables) {
    for line in queries::ticker_lines(&tables.players) {
        println!("  {line}");
    }

    println!("\nSTANDINGS");
    let mut standings = tables.teams.clone();
    standings.sort_by(|a, b| b.wins.cmp(&a.wins));
    for t in &standings {
        println!(
            "  {:<20} {:>6}  PTS {:>6.1}  REB {:>6.1}  AST {:>6.1}",
            t.team, t.record, t.pts, t.reb, t.ast
        );
    }

    println!("\nLEADERS");
    for cat in StatCategory::ALL {
        print!("  {:<6}", cat.label());
        for (rank, l) in queries::leaders(&tables.players, cat, 3).iter().enumerate() {
            print!("  {}. {} ({})", rank + 1, l.name, l.value);
        }
        println!();
    }

    if let Some(book) = queries::record_book(&tables.raw_players) {
        println!("\nRECORD BOOK");
        println!("  Points   {:>5.0}  {}", book.pts.value, book.pts.name);
        println!("  Rebounds {:>5.0}  {}", book.reb.value, book.reb.name);
        println!("  Steals   {:>5.0}  {}", book.stl.value, book.stl.name);
        println!("  Blocks   {:>5.0}  {}", book.blk.value, book.blk.name);
    }
}

/// Initialize tracing to stderr so the rendered tables on stdout stay clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stat_hub=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
