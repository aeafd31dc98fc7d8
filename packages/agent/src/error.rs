/// Errors raised by the print agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("config error: {0}")]
    Config(String),

    /// The coordinator could not be reached; retried on the next poll.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl AgentError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}
