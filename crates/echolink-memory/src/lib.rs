//! Memory stream used to summarize finished conversations.
//!
//! # Main types
//!
//! - [`MemoryStore`] — Trait for storing and listing observations.
//! - [`InMemoryMemoryStore`] — Process-local store.
//! - [`FileMemoryStore`] — JSONL-backed persistent store.

/// Memory entry type and store implementations.
pub mod store;

pub use store::{FileMemoryStore, InMemoryMemoryStore, MemoryEntry, MemoryStore};
