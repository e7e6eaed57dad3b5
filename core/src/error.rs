//! Error types for the CRUD engine.
//!
//! # Design
//! Encoding failures live in their own `EncodeError` because the encoder is a
//! `serde::Serializer` and serde needs an error type it can construct. The
//! engine wraps it in `ModelError::Encode`.
//!
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Status` with the raw status
//! code and body. Both count as transport failures.

use std::fmt;

use thiserror::Error;

use crate::http::HttpMethod;

/// Boxed error returned by a `Transport` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for CRUD operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors produced while turning a model into a form-encoded body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The model itself was `None`.
    #[error("cannot encode model: model was None")]
    NilObject,

    /// The model does not serialize as a struct of named fields.
    #[error("cannot encode model: expected a struct, got {kind}")]
    NotAStruct { kind: &'static str },

    /// A field holds a value with no defined textual form.
    #[error("cannot encode field `{field}`: don't know how to convert a {kind} to a string")]
    UnsupportedFieldKind { field: String, kind: &'static str },

    /// Raised by a hand-written `Serialize` impl.
    #[error("cannot encode model: {0}")]
    Custom(String),
}

impl serde::ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

/// Errors returned by `ModelClient` operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The arguments do not satisfy the model contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The model could not be form-encoded. Nothing was sent.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The request could not be built, sent, or its body read.
    #[error("{method} request to {url} failed: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server returned 404.
    #[error("{method} {url}: resource not found")]
    NotFound { method: HttpMethod, url: String },

    /// The server returned a non-2xx status other than 404.
    #[error("{method} {url}: HTTP {status}: {body}")]
    Status {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body is not valid JSON for the target type.
    #[error("could not decode response to {method} {url}: {source}")]
    Decode {
        method: HttpMethod,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ModelError {
    /// True for every failure of the request itself, including non-2xx
    /// statuses.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ModelError::Transport { .. } | ModelError::NotFound { .. } | ModelError::Status { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }

    /// The HTTP status the server answered with, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::NotFound { .. } => Some(404),
            ModelError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
