//! Error types for the DSV action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("{0}")]
    Configuration(String),

    // Retrieve-spec errors
    #[error(
        "failed to parse '{line}'. each 'retrieve' row must contain \
         '<secret path> <secret data key> as <output key>' separated by spaces"
    )]
    MalformedRetrieveLine { line: String },

    #[error(
        "failed to parse secret path '{path}': secret path may contain only letters, numbers, \
         underscores, dashes, @, pluses and periods separated by colon or slash"
    )]
    InvalidSecretPath { path: String },

    // Transport and protocol errors
    #[error("API call failed: {0}")]
    Transport(String),

    #[error("{method} {url}: {status}")]
    HttpStatus {
        method: String,
        url: String,
        status: String,
    },

    #[error("could not unmarshal response body: {0}")]
    Decode(String),

    // Schema errors
    #[error("could not read {field} from response")]
    MissingField { field: String },

    #[error("cannot get secret data from '{path}' secret")]
    MissingSecretData { path: String },

    #[error("cannot get '{field}' from '{path}' secret data")]
    MissingSecretField { field: String, path: String },

    // Output errors
    #[error("{0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub fn sink(message: impl Into<String>) -> Self {
        Error::Sink(message.into())
    }
}
