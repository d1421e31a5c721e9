//! Command-line interface definitions for the news portal.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be provided through an environment variable; the
//! API key in particular is normally supplied as `NEWS_API_KEY` so it never
//! appears in shell history.

use crate::api::ClientConfig;
use crate::render::Theme;
use crate::store::StalePolicy;
use clap::Parser;
use std::time::Duration;
use url::Url;

/// Command-line arguments for the news portal.
///
/// # Examples
///
/// ```sh
/// # Key from the environment, default theme
/// NEWS_API_KEY=... news_portal
///
/// # Digest theme, searching a different topic for headlines
/// news_portal --theme digest --topic "monsoon"
///
/// # Drop late responses from superseded refreshes
/// news_portal --stale-policy last-issued-wins
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the news provider
    #[arg(long, env = "NEWS_API_BASE_URL", default_value = "https://newsapi.org")]
    pub base_url: Url,

    /// Search term used for the Headlines section
    #[arg(long, env = "NEWS_TOPIC", default_value = "india")]
    pub topic: String,

    /// Visual theme
    #[arg(short, long, env = "NEWS_THEME", value_enum, default_value = "cards")]
    pub theme: Theme,

    /// Which response wins when two fetches for one section overlap
    #[arg(long, env = "NEWS_STALE_POLICY", value_enum, default_value = "last-arrived-wins")]
    pub stale_policy: StalePolicy,

    /// Per-request timeout in seconds (no timeout when unset)
    #[arg(long, env = "NEWS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Masthead title
    #[arg(long, env = "NEWS_BRAND", default_value = "Bharat News")]
    pub brand: String,

    /// Masthead tagline
    #[arg(long, env = "NEWS_TAGLINE", default_value = "India's Premier News Portal")]
    pub tagline: String,
}

impl Cli {
    /// Connection settings for the API client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            topic: self.topic.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
