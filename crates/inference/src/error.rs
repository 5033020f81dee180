use thiserror::Error;

/// Errors raised by a [`TextGenerator`](crate::TextGenerator) while producing fragments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The cancellation token fired before generation finished.
    #[error("generation cancelled")]
    Cancelled,
    /// The model backend reported a failure.
    #[error("generator backend failure: {0}")]
    Backend(String),
    /// Network or connection failure talking to a remote generator.
    #[error("generator transport failure: {0}")]
    Transport(String),
    /// The generator answered with something we could not decode.
    #[error("generator protocol violation: {0}")]
    Protocol(String),
}
