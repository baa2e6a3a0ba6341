//! Long-lived stream loop: install the tracked-term rule, consume the
//! filtered stream, and reconnect with exponential backoff when it drops.
//! Runs until ctrl-c.

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use wayback_social::twitter::{FilteredStream, TwitterApi};

use crate::pipeline::Bot;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub async fn run(bot: Bot, api: &TwitterApi, handle: &str) -> Result<()> {
    api.ensure_stream_rule(&format!("@{handle}"), "mentions")
        .await?;

    let stream = FilteredStream::new(api.bearer().to_string())?;
    let mut backoff = INITIAL_BACKOFF;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                return Ok(());
            }
            res = consume(&stream, &bot) => {
                match res {
                    Ok(()) => {
                        tracing::info!("stream ended, reconnecting");
                        backoff = INITIAL_BACKOFF;
                    }
                    Err(err) => {
                        tracing::warn!(error = ?err, backoff_ms = backoff.as_millis() as u64, "stream failed, reconnecting");
                    }
                }
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// Drain one stream connection. Returns when the server closes it cleanly,
/// errors when the connection breaks.
async fn consume(stream: &FilteredStream, bot: &Bot) -> Result<()> {
    let posts = stream.posts();
    tokio::pin!(posts);
    while let Some(item) = posts.next().await {
        let post = item?;
        bot.process_post(&post).await;
    }
    Ok(())
}
