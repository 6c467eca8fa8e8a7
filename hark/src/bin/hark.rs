//! Demo client: answers `ping` with `pong` and logs every event.
//!
//! ```text
//! hark [config.toml]
//! ```

use hark::{Bot, Captures, Config, Event, Filter, HttpHandshake, handlers::LoggingHandler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "hark.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "failed to load config");
        e
    })?;

    let bot = Bot::from_config(&config);

    let replies = bot.clone();
    bot.hears(
        "ping",
        Filter::new().field("type", "message").field("text", "ping"),
        move |event: &Event, _: &Captures| replies.say("pong", event.channel()).map(|_| ()),
    );
    bot.on_event("log", LoggingHandler::new());

    let session = bot.start(&HttpHandshake::from_config(&config)?).await?;
    info!(me = ?bot.me().map(|me| me.name), "listening");

    tokio::select! {
        _ = session.closed() => info!("connection closed"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    Ok(())
}
