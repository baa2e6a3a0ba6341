//! Social platform client used by searchwayback.
//!
//! Only the Twitter/X pipeline is implemented: the filtered stream the bot
//! listens on, tweet lookup for resolving replied-to posts, and the signed
//! reply path.

pub mod twitter;
