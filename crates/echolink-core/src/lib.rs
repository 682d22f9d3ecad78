//! Core types and error definitions for EchoLink.
//!
//! This crate provides the foundational types shared across all EchoLink
//! crates: the error type, the conversation stage table, utterances and the
//! turn terminator, persona configuration, and the retry/backoff policy used
//! at every external-call boundary.
//!
//! # Main types
//!
//! - [`EchoLinkError`] — Unified error enum for all EchoLink subsystems.
//! - [`EchoLinkResult`] — Convenience alias for `Result<T, EchoLinkError>`.
//! - [`Stage`] — The 8 fixed conversation stages.
//! - [`Utterance`] — One turn of the conversation, tagged with its [`Speaker`].
//! - [`Persona`] — Identity and purpose strings injected into prompts.
//! - [`RetryPolicy`] — Bounded exponential backoff configuration.

/// Error type shared by every crate.
pub mod error;
/// Persona configuration injected into generation prompts.
pub mod persona;
/// Retry policy and backoff computation.
pub mod retry;
/// The conversation stage table.
pub mod stage;
/// Utterances, speakers and the turn terminator.
pub mod utterance;

pub use error::{EchoLinkError, EchoLinkResult};
pub use persona::Persona;
pub use retry::{compute_backoff, is_retryable, RetryPolicy};
pub use stage::Stage;
pub use utterance::{strip_terminator, with_terminator, Speaker, Utterance, TURN_TERMINATOR};
