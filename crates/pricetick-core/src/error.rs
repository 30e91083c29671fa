//! Error types shared by every pricetick crate.

/// Failure of a single upstream retrieval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The decoded value is not a finite positive number.
    #[error("invalid price value: {0}")]
    InvalidValue(String),
}

/// Errors surfaced to callers of the price pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TickerError {
    /// Neither a fresh nor a cached sample could be produced.
    #[error("upstream unavailable for {symbol}: {source}")]
    UpstreamUnavailable {
        symbol: String,
        #[source]
        source: FeedError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error (thread spawn, terminal, socket).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_unavailable_message_names_symbol_and_cause() {
        let err = TickerError::UpstreamUnavailable {
            symbol: "BTCUSDT".into(),
            source: FeedError::Status(503),
        };
        let msg = err.to_string();
        assert!(msg.contains("BTCUSDT"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn upstream_unavailable_exposes_source() {
        use std::error::Error as _;
        let err = TickerError::UpstreamUnavailable {
            symbol: "ETHUSDT".into(),
            source: FeedError::Transport("connection refused".into()),
        };
        let source = err.source().expect("source");
        assert!(source.to_string().contains("connection refused"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: TickerError = io.into();
        assert!(matches!(err, TickerError::Io(_)));
    }
}
