use std::io;
use thiserror::Error;

/// Errors surfaced by tokenizers, decoders, and embedders.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Tokenizer could not be loaded or failed to encode/decode.
    #[error("tokenizer failure: {0}")]
    Tokenizer(String),
    /// Configuration is inconsistent (e.g., API mode without a URL).
    #[error("invalid embed config: {0}")]
    InvalidConfig(String),
    /// The remote embedding request could not be completed.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The remote embedding service answered with an unusable body.
    #[error("unexpected embedding response: {0}")]
    Response(String),
    /// Model-side failure while producing the vector.
    #[error("inference failure: {0}")]
    Inference(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Clone for EmbedError {
    fn clone(&self) -> Self {
        match self {
            EmbedError::Tokenizer(s) => EmbedError::Tokenizer(s.clone()),
            EmbedError::InvalidConfig(s) => EmbedError::InvalidConfig(s.clone()),
            EmbedError::Request(s) => EmbedError::Request(s.clone()),
            EmbedError::Response(s) => EmbedError::Response(s.clone()),
            EmbedError::Inference(s) => EmbedError::Inference(s.clone()),
            EmbedError::Io(err) => EmbedError::Io(io::Error::new(err.kind(), err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = EmbedError::Tokenizer("vocab missing".into());
        assert!(err.to_string().contains("tokenizer failure"));
        assert!(err.to_string().contains("vocab missing"));

        let err = EmbedError::Request("HTTP error 503".into());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: EmbedError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn error_clone_keeps_io_kind() {
        let err: EmbedError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        match err.clone() {
            EmbedError::Io(cloned) => assert_eq!(cloned.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected clone {other:?}"),
        }
    }
}
