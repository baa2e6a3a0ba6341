//! Wayback Machine client used by searchwayback.
//!
//! Covers the two endpoints the bot needs: the availability API for
//! nearest/oldest/newest snapshot lookups and SavePageNow for on-demand
//! captures. A handle binds one resolved URL to the service for the
//! duration of a single processing cycle.

pub mod client;
pub mod types;

pub use client::{ArchiveError, ArchiveHandle, WaybackClient};
pub use types::ArchiveSnapshot;
