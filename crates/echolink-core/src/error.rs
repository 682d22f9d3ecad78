use thiserror::Error;

/// A convenience `Result` alias using [`EchoLinkError`].
pub type EchoLinkResult<T> = Result<T, EchoLinkError>;

/// Top-level error type for EchoLink.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Error, Debug)]
pub enum EchoLinkError {
    /// An error from the conversation engine or a model call.
    #[error("Agent error: {0}")]
    Agent(String),

    /// An error from an outbound HTTP request (e.g. LLM API call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error from the chat platform.
    #[error("Channel error: {0}")]
    Channel(String),

    /// An error related to session state or transcript persistence.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the scheduling-link provider.
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// An error while loading professional records.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
