//! Shared pieces of the searchwayback workspace.
//!
//! Deliberately tiny: the logging initialiser lives here so the bot binary
//! and integration tests emit into the same sink, plus a couple of constants
//! every crate agrees on. Nothing in this crate talks to the network.

pub mod observability;

/// User agent sent with outbound requests that identify the bot to the
/// archive service and to link targets during redirect resolution.
pub const BOT_USER_AGENT: &str =
    "searchwayback/0.1 (+https://github.com/searchwayback) reqwest";
