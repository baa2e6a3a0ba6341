use chrono::NaiveDateTime;
use serde::Deserialize;

/// Response shape of `GET /wayback/available`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ArchivedSnapshots {
    #[serde(default)]
    pub closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClosestSnapshot {
    #[serde(default)]
    pub available: bool,
    pub url: String,
    pub timestamp: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A historical capture: permanent archive URL plus capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSnapshot {
    pub archive_url: String,
    /// Parsed from the service's `YYYYMMDDhhmmss` timestamp; `None` when the
    /// service hands back something unparseable.
    pub captured_at: Option<NaiveDateTime>,
}

impl ArchiveSnapshot {
    pub fn from_closest(closest: ClosestSnapshot) -> Option<Self> {
        if !closest.available {
            return None;
        }
        let captured_at =
            NaiveDateTime::parse_from_str(&closest.timestamp, "%Y%m%d%H%M%S").ok();
        Some(Self {
            archive_url: closest.url,
            captured_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn availability_payload_deserializes() {
        let json = r#"{
            "url": "https://example.com/",
            "archived_snapshots": {
                "closest": {
                    "status": "200",
                    "available": true,
                    "url": "http://web.archive.org/web/20200415123456/https://example.com/",
                    "timestamp": "20200415123456"
                }
            }
        }"#;
        let resp: AvailabilityResponse = serde_json::from_str(json).unwrap();
        let snap = ArchiveSnapshot::from_closest(resp.archived_snapshots.closest.unwrap()).unwrap();
        assert!(snap.archive_url.contains("/web/20200415123456/"));
        let at = snap.captured_at.unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2020, 4, 15));
        assert_eq!((at.hour(), at.minute()), (12, 34));
    }

    #[test]
    fn missing_closest_means_not_archived() {
        let resp: AvailabilityResponse =
            serde_json::from_str(r#"{"archived_snapshots": {}}"#).unwrap();
        assert!(resp.archived_snapshots.closest.is_none());
    }

    #[test]
    fn unavailable_snapshot_is_discarded() {
        let closest = ClosestSnapshot {
            available: false,
            url: "http://web.archive.org/web/0/https://example.com/".into(),
            timestamp: "0".into(),
            status: None,
        };
        assert!(ArchiveSnapshot::from_closest(closest).is_none());
    }

    #[test]
    fn garbage_timestamp_still_yields_a_snapshot() {
        let closest = ClosestSnapshot {
            available: true,
            url: "http://web.archive.org/web/x/https://example.com/".into(),
            timestamp: "not-a-date".into(),
            status: Some("200".into()),
        };
        let snap = ArchiveSnapshot::from_closest(closest).unwrap();
        assert!(snap.captured_at.is_none());
    }
}
