use thiserror::Error;

/// Failure reported by a delivery callback or the transport behind it.
///
/// The scheduler logs these and moves on to the next notification.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("client {0} is not connected")]
    ClientGone(String),

    #[error("payload encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("token not found: {0}")]
    UnknownToken(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Socket handshake failures. Each one is also sent to the client as an
/// `auth` frame before it is disconnected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No stream key provided")]
    MissingStreamKey,

    #[error("Invalid stream key")]
    InvalidStreamKey,
}
