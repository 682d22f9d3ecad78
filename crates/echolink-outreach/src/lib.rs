//! Outreach orchestration: polling a direct channel, deciding when a
//! conversation is over, and following up once it is.
//!
//! # Main types
//!
//! - [`MessageSyncLoop`] — Drives one conversation over a chat channel.
//! - [`TimingPolicy`] / [`decide`] — Per-tick exit and reply rules.
//! - [`SessionSummarizer`] — Demo link and operator summary after a session.
//! - [`SchedulingLinkProvider`] / [`CalendlyClient`] — Booking links.
//! - [`RecordStore`] / [`DatasetRecordStore`] — Professional records.
//! - [`PersonaTemplate`] — Builds a per-professional persona.

/// Professional records loaded from the training dataset.
pub mod dataset;
/// Persona template rendering.
pub mod persona;
/// Timing policy and tick decision table.
pub mod policy;
/// Booking link providers.
pub mod scheduling;
/// Post-session summary and demo follow-up.
pub mod summarizer;
/// Channel polling loop.
pub mod sync;

pub use dataset::{DatasetRecordStore, DatasetRow, ProfessionalRecord, RecordStore};
pub use persona::PersonaTemplate;
pub use policy::{decide, Inbound, TickDecision, TickObservation, TimingPolicy};
pub use scheduling::{CalendlyClient, SchedulingLinkProvider};
pub use summarizer::{FollowUpTarget, OperatorContact, SessionSummarizer, SummaryReport};
pub use sync::{collect_new_reply, MessageSyncLoop, SessionReport};
