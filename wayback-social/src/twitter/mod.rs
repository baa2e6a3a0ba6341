//! Twitter/X API v2 integration surface.
//!
//! Submodules provide the HTTP client wrapper, the filtered-stream reader,
//! OAuth 1.0a request signing for the posting path, and strongly typed
//! response models.

pub mod client;
pub mod oauth;
pub mod stream;
pub mod types;

pub use client::{TwitterApi, TwitterCredentials};
pub use stream::FilteredStream;

/// Tweet fields requested on both the stream and lookup paths, so the two
/// cannot drift apart.
pub(crate) const TWEET_FIELDS: &str =
    "author_id,conversation_id,created_at,entities,in_reply_to_user_id,referenced_tweets";

#[cfg(test)]
mod tests {
    use super::TWEET_FIELDS;

    #[test]
    fn requested_fields_cover_the_pipeline_needs() {
        for field in ["author_id", "entities", "referenced_tweets"] {
            assert!(TWEET_FIELDS.split(',').any(|f| f == field), "missing {field}");
        }
    }
}
