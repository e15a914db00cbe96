//! Error types for client operations

use thiserror::Error;

use crate::outcome::FetchFailure;

/// Failure reported by a connection when a request is handed to it
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No live link to the node right now; the request may be resubmitted
    #[error("No node connection available: {0}")]
    NoNode(String),

    /// The link is permanently closed
    #[error("Connection to node terminated")]
    Terminated,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection to node closed")]
    ConnectionClosed,

    #[error("Bad input: {reason}")]
    BadInput {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("{0}")]
    FetchFailed(Box<FetchFailure>),

    #[error("Too many redirects fetching {name}: gave up after {hops} hops")]
    TooManyRedirects { name: String, hops: u32 },

    #[error("Client shut down")]
    Shutdown,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn bad_input(reason: impl Into<String>) -> Self {
        Self::BadInput {
            reason: reason.into(),
            source: None,
        }
    }

    /// Whether the error means the client cannot make further progress.
    ///
    /// Fatal errors come from the connection being closed or the client being
    /// shut down; every later call on the same connection fails the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::Shutdown)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
