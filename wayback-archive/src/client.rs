use crate::types::{ArchiveSnapshot, AvailabilityResponse};
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use thiserror::Error;
use url::Url;
use wayback_http::{Fetcher, HttpClient, HttpError, RequestOpts};

const AVAILABILITY_BASE: &str = "https://archive.org";
const SAVE_BASE: &str = "https://web.archive.org/save/";

/// Anchor timestamp for "oldest" lookups; the archive holds nothing older
/// than its 1994 crawls, so the closest capture to this is the first one.
const EPOCH_TIMESTAMP: &str = "19940101";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive request failed: {0}")]
    Http(#[from] HttpError),
    #[error("save request was rejected with status {0}")]
    SaveRejected(StatusCode),
}

/// Client for the Wayback Machine endpoints.
#[derive(Clone)]
pub struct WaybackClient {
    http: HttpClient,
    fetcher: Fetcher,
    user_agent: HeaderValue,
}

impl WaybackClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ArchiveError> {
        let http = HttpClient::new(AVAILABILITY_BASE)?.with_timeout(timeout);
        let fetcher = Fetcher::new(user_agent)?.with_timeout(timeout);
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| HttpError::Build(format!("invalid user agent: {e}")))?;
        Ok(Self {
            http,
            fetcher,
            user_agent,
        })
    }

    /// Bind a resolved URL to the service for one processing cycle.
    pub fn handle(&self, url: Url) -> ArchiveHandle {
        ArchiveHandle {
            client: self.clone(),
            url,
        }
    }
}

/// A resolved URL bound to the archive service. Not retained beyond the
/// processing of a single post.
pub struct ArchiveHandle {
    client: WaybackClient,
    url: Url,
}

impl ArchiveHandle {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Snapshot closest to the given calendar day.
    pub async fn nearest(
        &self,
        month: u32,
        day: u32,
        year: i32,
    ) -> Result<Option<ArchiveSnapshot>, ArchiveError> {
        self.closest(&format!("{year:04}{month:02}{day:02}")).await
    }

    /// Earliest capture the archive holds.
    pub async fn oldest(&self) -> Result<Option<ArchiveSnapshot>, ArchiveError> {
        self.closest(EPOCH_TIMESTAMP).await
    }

    /// Most recent capture.
    pub async fn newest(&self) -> Result<Option<ArchiveSnapshot>, ArchiveError> {
        let now = Utc::now().format("%Y%m%d%H%M%S").to_string();
        self.closest(&now).await
    }

    async fn closest(&self, timestamp: &str) -> Result<Option<ArchiveSnapshot>, ArchiveError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.client.user_agent.clone());

        let resp: AvailabilityResponse = self
            .client
            .http
            .get_json(
                "wayback/available",
                RequestOpts {
                    query: Some(vec![
                        ("url", self.url.as_str().into()),
                        ("timestamp", timestamp.into()),
                    ]),
                    headers: Some(headers),
                    ..Default::default()
                },
            )
            .await?;

        let snapshot = resp
            .archived_snapshots
            .closest
            .and_then(ArchiveSnapshot::from_closest);
        tracing::debug!(
            target = %self.url,
            timestamp,
            found = snapshot.is_some(),
            "availability lookup"
        );
        Ok(snapshot)
    }

    /// Ask SavePageNow to capture the URL now.
    pub async fn save(&self) -> Result<(), ArchiveError> {
        let target = Url::parse(&format!("{SAVE_BASE}{}", self.url))
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let resolved = self.client.fetcher.resolve(&target).await?;
        if !resolved.status.is_success() {
            return Err(ArchiveError::SaveRejected(resolved.status));
        }
        tracing::info!(
            target = %self.url,
            capture = resolved.content_location.as_deref().unwrap_or("-"),
            "save requested"
        );
        Ok(())
    }
}
