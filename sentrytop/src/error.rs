//! Error types for frame decoding, rate derivation and TLS setup.

use std::path::PathBuf;

/// Why an inbound WebSocket frame was dropped.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("malformed '{event}' payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RateError {
    /// Two cumulative samples arrived too close together (or out of order).
    #[error("sample interval of {elapsed_ms} ms is below the 1 ms floor")]
    IntervalTooShort { elapsed_ms: i64 },
}

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read CA file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),
    #[error("rejected CA certificate: {0}")]
    Invalid(#[from] rustls::Error),
}
