//! Per-post processing: mention filter, base-post resolution, link
//! extraction, archive operation, reply.
//!
//! One post at a time; every failure past the mention filter degrades to a
//! reply from the catalogue, except reply posting itself, which is logged
//! and aborts that post's processing only.

use crate::instructions::Instruction;
use crate::{links, replies};
use wayback_archive::{ArchiveHandle, WaybackClient};
use wayback_config::ReplyStyle;
use wayback_http::Fetcher;
use wayback_social::twitter::TwitterApi;
use wayback_social::twitter::types::{StreamPost, Tweet};

pub struct Bot {
    api: TwitterApi,
    archive: WaybackClient,
    fetcher: Fetcher,
    handle: String,
    reply_style: ReplyStyle,
}

impl Bot {
    pub fn new(
        api: TwitterApi,
        archive: WaybackClient,
        fetcher: Fetcher,
        handle: String,
        reply_style: ReplyStyle,
    ) -> Self {
        Self {
            api,
            archive,
            fetcher,
            handle,
            reply_style,
        }
    }

    /// Handle one delivered post end to end.
    pub async fn process_post(&self, post: &StreamPost) {
        let author = post.author_username().unwrap_or("-");
        tracing::info!(id = %post.data.id, author, "received post");

        if !post.data.is_mention_of(&self.handle) {
            tracing::debug!(id = %post.data.id, "not a qualifying mention");
            return;
        }

        let message = self.derive_response(&post.data).await;
        let text = replies::compose(self.reply_style, post.author_username(), &message);

        match self.api.post_reply(&post.data.id, &text).await {
            Ok(sent) => {
                tracing::info!(id = %sent.id, author, reply = %text, "sent response");
            }
            Err(err) => {
                // fatal for this post only, never for the stream
                tracing::error!(id = %post.data.id, error = ?err, "reply delivery failed");
            }
        }
    }

    /// Work out what to say: resolve the post carrying the link, extract and
    /// canonicalise it, then run the requested archive operation.
    async fn derive_response(&self, mention: &Tweet) -> String {
        let source_text = self.link_source_text(mention).await;

        let Some(candidate) = links::extract_candidate(&source_text) else {
            return replies::no_link();
        };
        let Some(resolved) = links::resolve(&self.fetcher, candidate).await else {
            return replies::no_link();
        };

        let handle = self.archive.handle(resolved);
        // instructions come from the mentioning post, the link may not
        let instruction = Instruction::parse(&mention.text);
        self.execute(instruction, &handle).await
    }

    /// When the mention is a reply, the replied-to post carries the link.
    /// Lookup failures fall back to the mention's own text.
    async fn link_source_text(&self, mention: &Tweet) -> String {
        let Some(base_id) = mention.replied_to_id() else {
            return mention.text.clone();
        };
        match self.api.get_tweet(base_id).await {
            Ok(lookup) => match lookup.data {
                Some(base) => base.text,
                None => mention.text.clone(),
            },
            Err(err) => {
                tracing::warn!(base_id, error = ?err, "base post lookup failed");
                mention.text.clone()
            }
        }
    }

    async fn execute(&self, instruction: Instruction, handle: &ArchiveHandle) -> String {
        match instruction {
            Instruction::Save => match handle.save().await {
                Ok(()) => replies::saved(handle.url()),
                Err(err) => {
                    tracing::warn!(url = %handle.url(), error = ?err, "auto-save failed");
                    replies::save_fallback(handle.url())
                }
            },
            Instruction::Nearest {
                month,
                day,
                year,
                raw,
            } => match handle.nearest(month, day, year).await {
                Ok(Some(snapshot)) => replies::nearest(&raw, &snapshot),
                Ok(None) => replies::not_archived(),
                Err(err) => {
                    tracing::warn!(url = %handle.url(), error = ?err, "nearest lookup failed");
                    replies::lookup_failed()
                }
            },
            Instruction::Oldest => match handle.oldest().await {
                Ok(Some(snapshot)) => replies::oldest(&snapshot),
                Ok(None) => replies::not_archived(),
                Err(err) => {
                    tracing::warn!(url = %handle.url(), error = ?err, "oldest lookup failed");
                    replies::lookup_failed()
                }
            },
            Instruction::Newest => match handle.newest().await {
                Ok(Some(snapshot)) => replies::newest(&snapshot),
                Ok(None) => replies::not_archived(),
                Err(err) => {
                    tracing::warn!(url = %handle.url(), error = ?err, "newest lookup failed");
                    replies::lookup_failed()
                }
            },
        }
    }
}
