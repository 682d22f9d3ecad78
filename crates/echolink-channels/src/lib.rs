//! Chat platform access for EchoLink.
//!
//! # Main types
//!
//! - [`ChatClient`] — Trait for the chat operations the outreach loop needs.
//! - [`SlackChannel`] — Slack Web API implementation.
//! - [`TextNormalizer`] — Undoes platform formatting on inbound text.

/// Chat client trait and message type.
pub mod chat;
/// Inbound text normalization.
pub mod normalize;
/// Slack channel integration.
pub mod slack;

pub use chat::{ChatClient, ChatMessage};
pub use normalize::TextNormalizer;
pub use slack::SlackChannel;
