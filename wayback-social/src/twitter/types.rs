use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,

    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_user_id: Option<String>,

    #[serde(default)]
    pub entities: Option<Entities>,
    #[serde(default)]
    pub referenced_tweets: Option<Vec<ReferencedTweet>>,
}

impl Tweet {
    /// A reshare (retweet or quote) never counts as a mention, whatever its
    /// entities say.
    pub fn is_reshare(&self) -> bool {
        self.referenced_tweets
            .iter()
            .flatten()
            .any(|r| matches!(r.kind.as_str(), "retweeted" | "quoted"))
    }

    /// Case-insensitive check for a user-mention entity naming `handle`.
    pub fn mentions(&self, handle: &str) -> bool {
        self.entities
            .iter()
            .filter_map(|e| e.mentions.as_ref())
            .flatten()
            .any(|m| m.username.eq_ignore_ascii_case(handle))
    }

    /// The mention-filter predicate: a qualifying mention of `handle`.
    pub fn is_mention_of(&self, handle: &str) -> bool {
        !self.is_reshare() && self.mentions(handle)
    }

    /// Id of the tweet this one replies to, if any.
    pub fn replied_to_id(&self) -> Option<&str> {
        self.referenced_tweets
            .iter()
            .flatten()
            .find(|r| r.kind == "replied_to")
            .map(|r| r.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Entities {
    #[serde(default)]
    pub urls: Option<Vec<UrlEntity>>,
    #[serde(default)]
    pub mentions: Option<Vec<MentionEntity>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlEntity {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionEntity {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Includes {
    #[serde(default)]
    pub users: Option<Vec<User>>,
}

fn author_username<'a>(
    author_id: Option<&str>,
    includes: Option<&'a Includes>,
) -> Option<&'a str> {
    let aid = author_id?;
    includes?
        .users
        .as_ref()?
        .iter()
        .find(|u| u.id == aid)
        .map(|u| u.username.as_str())
}

/// One element of the filtered stream: a tweet plus its expansions.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamPost {
    pub data: Tweet,
    #[serde(default)]
    pub includes: Option<Includes>,
}

impl StreamPost {
    pub fn author_username(&self) -> Option<&str> {
        author_username(self.data.author_id.as_deref(), self.includes.as_ref())
    }
}

/// Response of `GET /2/tweets/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetLookup {
    #[serde(default)]
    pub data: Option<Tweet>,
    #[serde(default)]
    pub includes: Option<Includes>,
}

// ---- stream rules ----

#[derive(Debug, Clone, Deserialize)]
pub struct StreamRule {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RulesResponse {
    #[serde(default)]
    pub data: Option<Vec<StreamRule>>,
}

#[derive(Debug, Serialize)]
pub struct AddRules<'a> {
    pub add: Vec<RuleSpec<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RuleSpec<'a> {
    pub value: &'a str,
    pub tag: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DeleteRules {
    pub delete: DeleteIds,
}

#[derive(Debug, Serialize)]
pub struct DeleteIds {
    pub ids: Vec<String>,
}

// ---- posting ----

#[derive(Debug, Serialize)]
pub struct NewTweet<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyTarget<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ReplyTarget<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostedTweet {
    pub data: PostedTweetData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostedTweetData {
    pub id: String,
    pub text: String,
}

// ---- token exchange ----

#[derive(Debug, Clone, Deserialize)]
pub struct BearerToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tweet_with(entities: serde_json::Value, referenced: serde_json::Value) -> Tweet {
        serde_json::from_value(json!({
            "id": "100",
            "text": "@searchwayback https://example.com",
            "author_id": "42",
            "entities": entities,
            "referenced_tweets": referenced,
        }))
        .unwrap()
    }

    #[test]
    fn reshare_is_never_a_mention() {
        let tw = tweet_with(
            json!({ "mentions": [{ "username": "searchwayback" }] }),
            json!([{ "type": "retweeted", "id": "99" }]),
        );
        assert!(tw.is_reshare());
        assert!(!tw.is_mention_of("searchwayback"));
    }

    #[test]
    fn quote_counts_as_reshare() {
        let tw = tweet_with(
            json!({ "mentions": [{ "username": "searchwayback" }] }),
            json!([{ "type": "quoted", "id": "99" }]),
        );
        assert!(!tw.is_mention_of("searchwayback"));
    }

    #[test]
    fn mixed_case_mention_is_recognised() {
        let tw = tweet_with(json!({ "mentions": [{ "username": "SearchWayback" }] }), json!(null));
        assert!(tw.is_mention_of("searchwayback"));
    }

    #[test]
    fn missing_mention_entities_do_not_qualify() {
        let tw = tweet_with(json!(null), json!(null));
        assert!(!tw.is_mention_of("searchwayback"));
    }

    #[test]
    fn reply_reference_is_not_a_reshare() {
        let tw = tweet_with(
            json!({ "mentions": [{ "username": "searchwayback" }] }),
            json!([{ "type": "replied_to", "id": "55" }]),
        );
        assert!(tw.is_mention_of("searchwayback"));
        assert_eq!(tw.replied_to_id(), Some("55"));
    }

    #[test]
    fn stream_post_resolves_author_from_includes() {
        let post: StreamPost = serde_json::from_value(json!({
            "data": {
                "id": "123",
                "text": "@searchwayback save https://example.com",
                "author_id": "42",
                "entities": { "mentions": [{ "username": "searchwayback" }] }
            },
            "includes": {
                "users": [{ "id": "42", "username": "alice", "name": "Alice" }]
            },
            "matching_rules": [{ "id": "1", "tag": "mentions" }]
        }))
        .unwrap();
        assert_eq!(post.author_username(), Some("alice"));
        assert!(post.data.is_mention_of("SEARCHWAYBACK"));
    }

    #[test]
    fn lookup_without_data_deserializes() {
        let lookup: TweetLookup =
            serde_json::from_str(r#"{"errors":[{"detail":"not found"}]}"#).unwrap();
        assert!(lookup.data.is_none());
    }
}
