//! The reply text catalogue. Every per-post failure degrades to one of
//! these strings instead of crashing the stream.

use url::Url;
use wayback_archive::ArchiveSnapshot;
use wayback_config::ReplyStyle;

pub fn no_link() -> String {
    "I couldn't find a link in that tweet.".to_string()
}

pub fn not_archived() -> String {
    "I couldn't find that link on the Wayback Machine.".to_string()
}

pub fn lookup_failed() -> String {
    "I had problems parsing the link and/or instructions from the tweet.".to_string()
}

pub fn saved(url: &Url) -> String {
    format!("I saved that link to the Wayback Machine: https://web.archive.org/web/{url}")
}

pub fn save_fallback(url: &Url) -> String {
    format!(
        "Sorry, I couldn't save that link automatically. Click here to manually save it: https://web.archive.org/save/{url}"
    )
}

pub fn nearest(date_as_written: &str, snapshot: &ArchiveSnapshot) -> String {
    format!(
        "Here you go, the archive entry closest to {date_as_written}: {}",
        snapshot.archive_url
    )
}

pub fn oldest(snapshot: &ArchiveSnapshot) -> String {
    format!(
        "Here you go, the oldest archive entry: {}",
        snapshot.archive_url
    )
}

pub fn newest(snapshot: &ArchiveSnapshot) -> String {
    format!(
        "Here you go, the most recent archive entry: {}",
        snapshot.archive_url
    )
}

/// Final reply text: `@<author> <message>` or the message alone, depending
/// on the configured style. Falls back to the bare message when the author
/// handle is unknown.
pub fn compose(style: ReplyStyle, author: Option<&str>, message: &str) -> String {
    match (style, author) {
        (ReplyStyle::AtPrefix, Some(author)) => format!("@{author} {message}"),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(archive_url: &str) -> ArchiveSnapshot {
        ArchiveSnapshot {
            archive_url: archive_url.to_string(),
            captured_at: None,
        }
    }

    #[test]
    fn save_reply_differs_from_lookup_replies() {
        let url = Url::parse("https://example.com/page").unwrap();
        let snap = snapshot("http://web.archive.org/web/20200415000000/https://example.com/page");
        let save = saved(&url);
        for lookup in [
            nearest("04-15-2020", &snap),
            oldest(&snap),
            newest(&snap),
            not_archived(),
        ] {
            assert_ne!(save, lookup);
        }
        assert!(save.contains("https://web.archive.org/web/https://example.com/page"));
    }

    #[test]
    fn save_fallback_points_at_manual_save() {
        let url = Url::parse("https://example.com/page").unwrap();
        assert!(save_fallback(&url).contains("https://web.archive.org/save/https://example.com/page"));
    }

    #[test]
    fn nearest_echoes_the_date_as_written() {
        let snap = snapshot("http://web.archive.org/web/20200415000000/x");
        let text = nearest("04-15-2020", &snap);
        assert!(text.contains("closest to 04-15-2020"));
        assert!(text.ends_with(&snap.archive_url));
    }

    #[test]
    fn compose_prefixes_author_by_default() {
        assert_eq!(
            compose(ReplyStyle::AtPrefix, Some("alice"), "hi"),
            "@alice hi"
        );
        assert_eq!(compose(ReplyStyle::Bare, Some("alice"), "hi"), "hi");
        assert_eq!(compose(ReplyStyle::AtPrefix, None, "hi"), "hi");
    }
}
