use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bundesliga_ticker::config::TickerConfig;
use bundesliga_ticker::discord::{Discord, DiscordRenderer};
use bundesliga_ticker::openliga::OpenLiga;
use bundesliga_ticker::render::{Renderer, TerminalRenderer};
use bundesliga_ticker::ticker::Ticker;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    // Initialize structured logging with tracing
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_current_span(false)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();

    let config = TickerConfig::from_env().context("invalid ticker configuration")?;
    info!(
        competition = %config.competition,
        season = ?config.season,
        timezone = %config.feed.home_tz,
        "Loaded configuration"
    );

    let mut renderers: Vec<Box<dyn Renderer>> = vec![Box::new(TerminalRenderer)];
    if let Some(hook_url) = config.discord_hook_url.clone() {
        renderers.push(Box::new(DiscordRenderer::new(Discord::new(hook_url, config.http_timeout))));
    }

    let source = Arc::new(OpenLiga::new(&config));
    let ticker = Arc::new(Ticker::new(source, renderers, config.feed));
    ticker.run(config.refresh_interval).await;
    Ok(())
}
