//! Errors raised while delivering a batch to the remote store.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`DeliveryError`] failures.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Failures that can occur while talking to the remote store.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build remote client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or the connection dropped.
    #[error("failed to send request to `{url}`")]
    Send {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The remote store did not answer within the configured timeout.
    #[error("request to `{url}` timed out")]
    Timeout {
        /// Target URL.
        url: String,
    },
    /// The remote store answered with a non-success HTTP status.
    #[error("unexpected status {status} from `{url}`: {body}")]
    Status {
        /// Target URL.
        url: String,
        /// Status returned.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The response body was not a valid receive response.
    #[error("failed to decode response from `{url}`")]
    Decode {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The remote store answered but refused the batch.
    #[error("remote store rejected the transfer: {message}")]
    Rejected {
        /// Reason given by the remote store.
        message: String,
    },
}
