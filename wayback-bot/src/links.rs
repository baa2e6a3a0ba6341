//! Link extraction: first URL in a post's text, canonicalised by following
//! redirects. Multiple links in one post are not supported; only the first
//! match is considered.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use wayback_http::Fetcher;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*(),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("url pattern compiles")
});

/// First URL-looking substring of `text`, if any. Pure; no network.
pub fn extract_candidate(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// Follow redirects to the canonical URL. Any failure, including a non-2xx
/// landing page, means "no usable link".
pub async fn resolve(fetcher: &Fetcher, candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    match fetcher.resolve(&url).await {
        Ok(resolved) if resolved.status.is_success() => Some(resolved.final_url),
        Ok(resolved) => {
            tracing::debug!(candidate, status = %resolved.status, "link target not usable");
            None
        }
        Err(err) => {
            tracing::debug!(candidate, error = %err, "link resolution failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_url_followed_by_text() {
        let text = "look at https://example.com/page?id=3 when you get a chance";
        assert_eq!(
            extract_candidate(text),
            Some("https://example.com/page?id=3")
        );
    }

    #[test]
    fn no_url_means_no_candidate() {
        assert_eq!(extract_candidate("no links here, sorry"), None);
        assert_eq!(extract_candidate(""), None);
    }

    #[test]
    fn only_the_first_of_two_urls_is_taken() {
        let text = "http://first.example.org and https://second.example.org";
        assert_eq!(extract_candidate(text), Some("http://first.example.org"));
    }

    #[test]
    fn plain_http_is_accepted() {
        assert_eq!(
            extract_candidate("see http://example.com."),
            Some("http://example.com.")
        );
    }

    #[test]
    fn percent_escapes_are_part_of_the_match() {
        assert_eq!(
            extract_candidate("https://example.com/a%20b end"),
            Some("https://example.com/a%20b")
        );
    }
}
