use std::time::Duration;

use anyhow::Result;
use wayback_archive::WaybackClient;
use wayback_common::BOT_USER_AGENT;
use wayback_common::observability::{LogConfig, init_logging};
use wayback_config::BotConfigLoader;
use wayback_http::Fetcher;
use wayback_social::twitter::{TwitterApi, TwitterCredentials};

mod instructions;
mod links;
mod pipeline;
mod replies;
mod runner;

use pipeline::Bot;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var("WAYBACK_CONFIG").unwrap_or_else(|_| "wayback.yaml".to_string());
    let cfg = BotConfigLoader::new().with_file(&config_path).load()?;

    init_logging(LogConfig::default())?;
    tracing::info!(config = %config_path, handle = %cfg.handle, "starting searchwayback");

    let api = TwitterApi::connect(TwitterCredentials {
        consumer_key: cfg.twitter.consumer_key,
        consumer_secret: cfg.twitter.consumer_secret,
        access_token: cfg.twitter.access_token,
        access_secret: cfg.twitter.access_secret,
    })
    .await?;

    let user_agent = cfg
        .archive
        .user_agent
        .clone()
        .unwrap_or_else(|| BOT_USER_AGENT.to_string());
    let timeout = Duration::from_secs(cfg.archive.timeout_secs);
    let archive = WaybackClient::new(&user_agent, timeout)?;
    let fetcher = Fetcher::new(&user_agent)?.with_timeout(timeout);

    let bot = Bot::new(
        api.clone(),
        archive,
        fetcher,
        cfg.handle.clone(),
        cfg.reply_style,
    );
    runner::run(bot, &api, &cfg.handle).await
}
