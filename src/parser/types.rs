use thiserror::Error;

/// Why a single descriptor could not be turned into a profile.
///
/// A failed decode never yields a partially populated profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unrecognized protocol")]
    UnrecognizedProtocol,

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Malformed encoding")]
    InvalidEncoding,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing host")]
    MissingHost,

    #[error("Invalid port: {0:?}")]
    InvalidPort(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson(err.to_string())
    }
}

impl From<url::ParseError> for DecodeError {
    fn from(err: url::ParseError) -> Self {
        DecodeError::InvalidUri(err.to_string())
    }
}
