//! Conversation session state and transcript archiving.
//!
//! # Main types
//!
//! - [`ConversationSession`] — History, current stage and persona of one conversation.
//! - [`Transcript`] — Frozen copy of a session taken when the sync loop exits.
//! - [`SessionOutcome`] — How a session ended.
//! - [`TranscriptStore`] / [`FileTranscriptStore`] — Transcript persistence.

/// Mutable per-conversation state.
pub mod session;
/// Transcript archive trait and file-backed implementation.
pub mod store;
/// Frozen transcripts and session outcomes.
pub mod transcript;

pub use session::ConversationSession;
pub use store::{FileTranscriptStore, TranscriptStore};
pub use transcript::{SessionOutcome, Transcript};
