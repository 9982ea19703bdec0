//! Error model shared by every layer of the runtime.
//!
//! The variants are behavioral categories rather than transport details: a
//! caller awaiting a request sees exactly one of these, and a handler error
//! maps back onto a JSON-RPC error object via [`Error::to_wire`].

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::error_codes;
use crate::jsonrpc::JsonRpcError;

/// A specialized `Result` type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the session API.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The session terminated while the operation was in flight.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A request deadline fired before the response arrived.
    #[error("request timed out after {elapsed:?}{}", if *hard { " (hard ceiling)" } else { "" })]
    RequestTimeout {
        /// Time between the request hitting the wire and the deadline firing
        elapsed: Duration,
        /// Whether the hard ceiling (rather than the base timeout) expired
        hard: bool,
    },

    /// The caller cancelled the request before a response arrived.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// The peer violated the wire contract.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer answered `initialize` with a protocol version this
    /// implementation does not support.
    #[error("unsupported protocol version: requested {requested}, received {received}")]
    VersionMismatch {
        /// Version this side asked for
        requested: String,
        /// Version the peer answered with
        received: String,
    },

    /// The peer reported that the method does not exist (-32601).
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Request parameters were rejected (-32602).
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Unexpected internal failure, locally or on the peer (-32603).
    #[error("internal error: {0}")]
    Internal(String),

    /// The peer returned an application-level error response.
    #[error("remote error {code}: {message}")]
    Remote {
        /// Numeric JSON-RPC error code
        code: i32,
        /// Human-readable message from the peer
        message: String,
        /// Optional structured data attached by the peer
        data: Option<Value>,
    },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Classify a peer error response by its numeric code.
    ///
    /// The standard codes for method-not-found, invalid-params, and
    /// internal-error get their dedicated variants; everything else is a
    /// generic [`Error::Remote`].
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            error_codes::METHOD_NOT_FOUND => Self::MethodNotFound(message),
            error_codes::INVALID_PARAMS => Self::InvalidParams(message),
            error_codes::INTERNAL_ERROR => Self::Internal(message),
            _ => Self::Remote {
                code,
                message,
                data: None,
            },
        }
    }

    /// Build an error from a wire-level error object, preserving `data`.
    pub fn from_wire(error: &JsonRpcError) -> Self {
        match Self::rpc(error.code, error.message.clone()) {
            Self::Remote { code, message, .. } => Self::Remote {
                code,
                message,
                data: error.data.clone(),
            },
            other => other,
        }
    }

    /// The JSON-RPC error code this error maps to when it is sent back to
    /// the peer as an error response.
    pub fn code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) | Self::Serialization(_) => error_codes::INVALID_PARAMS,
            Self::Protocol(_) => error_codes::INVALID_REQUEST,
            Self::Remote { code, .. } => *code,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// Convert into a wire-level error object for an error response.
    pub fn to_wire(&self) -> JsonRpcError {
        let data = match self {
            Self::Remote { data, .. } => data.clone(),
            _ => None,
        };
        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
