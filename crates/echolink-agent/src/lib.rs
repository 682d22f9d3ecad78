//! Language-model side of EchoLink.
//!
//! Provider configuration and backends, the stage classifier, the reply
//! generator and the [`ConversationEngine`] state machine that ties them to a
//! [`echolink_session::ConversationSession`].

pub mod backends;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod failover;
pub mod generator;
pub mod llm;
pub mod prompts;

pub use backends::LlmBackend;
pub use classifier::StageClassifier;
pub use config::{LlmProvider, ModelConfig};
pub use engine::ConversationEngine;
pub use failover::FailoverBackend;
pub use generator::{Generated, ResponseGenerator};
pub use llm::LlmClient;
