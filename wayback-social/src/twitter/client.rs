//! Twitter/X API v2 client: tweet lookup, reply posting, and stream rule
//! management.
//!
//! The app-only bearer token (exchanged from the consumer key/secret at
//! connect time) authenticates the read paths; replies are signed with
//! OAuth 1.0a user context.

use crate::twitter::TWEET_FIELDS;
use crate::twitter::oauth::OAuth1;
use crate::twitter::types::{
    AddRules, BearerToken, DeleteIds, DeleteRules, NewTweet, PostedTweet, PostedTweetData,
    ReplyTarget, RuleSpec, RulesResponse, StreamRule, TweetLookup,
};
use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use wayback_http::{Auth, HttpClient, RequestOpts};

const API_BASE: &str = "https://api.twitter.com";

/// The four platform credential strings, loaded from configuration.
#[derive(Clone)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    signer: OAuth1,
    bearer: String,
}

impl TwitterApi {
    /// Exchange the consumer key/secret for an app-only bearer token and
    /// return a ready client.
    pub async fn connect(creds: TwitterCredentials) -> Result<Self> {
        let http = HttpClient::new(API_BASE)?;

        let token: BearerToken = http
            .post_form(
                "oauth2/token",
                &[("grant_type", "client_credentials")],
                RequestOpts {
                    auth: Some(Auth::Basic {
                        user: &creds.consumer_key,
                        pass: &creds.consumer_secret,
                    }),
                    ..Default::default()
                },
            )
            .await
            .context("bearer token exchange failed")?;

        tracing::info!("connected to twitter");
        Ok(Self {
            http,
            signer: OAuth1::new(
                creds.consumer_key,
                creds.consumer_secret,
                creds.access_token,
                creds.access_secret,
            ),
            bearer: token.access_token,
        })
    }

    /// Bearer token for the filtered-stream connection.
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    /// Fetch one tweet with the entities the pipeline needs.
    pub async fn get_tweet(&self, id: &str) -> Result<TweetLookup> {
        let lookup: TweetLookup = self
            .http
            .get_json(
                &format!("2/tweets/{id}"),
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(vec![
                        ("tweet.fields", TWEET_FIELDS.into()),
                        ("expansions", "author_id".into()),
                        ("user.fields", "username".into()),
                    ]),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("tweet lookup failed for {id}"))?;
        Ok(lookup)
    }

    /// Post `text` as a reply to `in_reply_to`.
    pub async fn post_reply(&self, in_reply_to: &str, text: &str) -> Result<PostedTweetData> {
        // JSON bodies contribute no parameters to the OAuth signature.
        let header = self
            .signer
            .authorization_header("POST", &format!("{API_BASE}/2/tweets"), &[]);
        let value = HeaderValue::from_str(&header)
            .context("signed Authorization header is not a valid header value")?;

        let body = NewTweet {
            text,
            reply: Some(ReplyTarget {
                in_reply_to_tweet_id: in_reply_to,
            }),
        };
        let posted: PostedTweet = self
            .http
            .post_json(
                "2/tweets",
                &body,
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: AUTHORIZATION,
                        value,
                    }),
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .context("reply posting failed")?;

        tracing::debug!(id = %posted.data.id, "reply posted");
        Ok(posted.data)
    }

    /// Current filtered-stream rules.
    pub async fn stream_rules(&self) -> Result<Vec<StreamRule>> {
        let resp: RulesResponse = self
            .http
            .get_json(
                "2/tweets/search/stream/rules",
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    ..Default::default()
                },
            )
            .await
            .context("stream rule fetch failed")?;
        Ok(resp.data.unwrap_or_default())
    }

    /// Reconcile stream rules so exactly the tracked-term rule is installed:
    /// stale rules are deleted and the desired one added if missing.
    pub async fn ensure_stream_rule(&self, value: &str, tag: &str) -> Result<()> {
        let existing = self.stream_rules().await?;

        let stale: Vec<String> = existing
            .iter()
            .filter(|r| r.value != value)
            .map(|r| r.id.clone())
            .collect();
        if !stale.is_empty() {
            tracing::info!(count = stale.len(), "deleting stale stream rules");
            let _: serde_json::Value = self
                .http
                .post_json(
                    "2/tweets/search/stream/rules",
                    &DeleteRules {
                        delete: DeleteIds { ids: stale },
                    },
                    RequestOpts {
                        auth: Some(Auth::Bearer(&self.bearer)),
                        ..Default::default()
                    },
                )
                .await
                .context("stream rule deletion failed")?;
        }

        if existing.iter().any(|r| r.value == value) {
            tracing::debug!(rule = value, "stream rule already installed");
            return Ok(());
        }

        tracing::info!(rule = value, "installing stream rule");
        let _: serde_json::Value = self
            .http
            .post_json(
                "2/tweets/search/stream/rules",
                &AddRules {
                    add: vec![RuleSpec { value, tag }],
                },
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    ..Default::default()
                },
            )
            .await
            .context("stream rule creation failed")?;
        Ok(())
    }
}
