//! Error types for PulseMap

/// Result type alias using PulseMap's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the observer-side stream subscription.
///
/// Connect failures are kept distinct from mid-stream failures so the
/// reconnect loop can tell "endpoint unreachable" (keep backing off)
/// from "established stream died" (reset backoff).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The streaming endpoint could not be reached
    #[error("connect error: {0}")]
    Connect(String),

    /// An established stream failed mid-flight
    #[error("stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Create a new connect error
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    /// Create a new stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Whether the failure happened before a connection was established
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_classification() {
        let err = Error::connect("refused");
        assert_eq!(err.to_string(), "connect error: refused");
        assert!(err.is_connect());

        let err = Error::stream("reset");
        assert_eq!(err.to_string(), "stream error: reset");
        assert!(!err.is_connect());
    }
}
