//! linkbot - channel-logging IRC bot.

use linkbot::config::Config;
use linkbot::error::{EXIT_LOG_SINK, SessionError};
use linkbot::factory::SessionFactory;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.as_slice() {
        [flag, path] if flag == "--config" => Config::load(path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        [channel, log_path] => Config::from_args(channel.clone(), log_path.into()),
        _ => anyhow::bail!("usage: linkbot <channel> <logfile> | linkbot --config <config.toml>"),
    };

    info!(
        server = %config.server,
        channel = %config.channel,
        nickname = %config.nickname,
        track_users = config.track_users,
        "Starting linkbot"
    );

    let factory = SessionFactory::new(config);
    match factory.run().await {
        Ok(()) => Ok(()),
        Err(e @ SessionError::LogSink(_)) => {
            error!(error = %e, "Cannot use activity log");
            std::process::exit(EXIT_LOG_SINK);
        }
        Err(e) => Err(e.into()),
    }
}
