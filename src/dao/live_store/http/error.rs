//! Error types shared by the HTTP live-store implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`LiveDaoError`] failures.
pub type LiveResult<T> = Result<T, LiveDaoError>;

/// Failures that can occur while interacting with the live store.
#[derive(Debug, Error)]
pub enum LiveDaoError {
    /// Required environment variable is missing.
    #[error("missing live-store environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build live-store client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a tree path could not be sent.
    #[error("failed to send live-store request to `{path}`")]
    RequestSend {
        /// Tree path.
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The store returned an unexpected status code for a tree path.
    #[error("unexpected live-store response status {status} for `{path}`")]
    RequestStatus {
        /// Tree path.
        path: String,
        /// Returned status.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode live-store response for `{path}`")]
    DecodeResponse {
        /// Tree path.
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
