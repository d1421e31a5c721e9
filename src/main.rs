//! # News Portal
//!
//! A terminal news portal that pulls category headlines from NewsAPI and
//! renders them as a card grid or a single-column digest.
//!
//! ## Features
//!
//! - Six fixed sections: Headlines, Politics, Business, Sports,
//!   Entertainment, Health
//! - Per-section in-memory cache: revisiting a section never re-fetches it
//! - Manual refresh of the active section
//! - Loading indicator and a persistent error banner until the next fetch
//! - Two themes over the same state, switchable at runtime
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... news_portal --theme cards
//! ```
//!
//! Then type `1`-`6` (or a section id) to switch sections, `r` to refresh,
//! `t` to switch theme, and `q` to quit.
//!
//! ## Architecture
//!
//! 1. **Store** ([`store`]): owns the session state and decides when to fetch
//! 2. **Source** ([`api`]): performs one request per fetch ticket
//! 3. **Driver** ([`app`]): feeds user input and fetch completions to the store
//! 4. **Render** ([`render`]): turns the state into a frame after every change

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod app;
mod cli;
mod models;
mod render;
mod store;
mod utils;

#[cfg(test)]
mod testing;

use api::NewsApiClient;
use app::App;
use cli::Cli;
use render::Masthead;
use store::NewsStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Frames go to stdout, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_portal starting up");

    let args = Cli::parse();
    debug!(
        base_url = %args.base_url,
        topic = %args.topic,
        theme = ?args.theme,
        stale_policy = ?args.stale_policy,
        timeout_secs = ?args.timeout_secs,
        "Parsed CLI arguments"
    );

    let client = NewsApiClient::new(args.client_config())?;
    let store = NewsStore::new(args.stale_policy);
    let masthead = Masthead::new(
        args.brand.clone(),
        args.tagline.clone(),
        Local::now().date_naive(),
    );

    let mut app = App::new(store, client, args.theme, masthead, std::io::stdout());
    app.run(BufReader::new(tokio::io::stdin())).await?;

    let cached = app
        .state()
        .categories()
        .iter()
        .filter(|c| app.state().is_cached(c.id))
        .count();
    let elapsed = start_time.elapsed();
    info!(?elapsed, cached_sections = cached, "Session ended");

    Ok(())
}
