//! Generic REST persistence for typed domain objects.
//!
//! # Overview
//! Any type implementing [`Model`] can be created, read, listed, updated and
//! deleted on a RESTful server without per-type request code. Models are sent
//! as form-encoded fields and read back from JSON, overwriting the caller's
//! value in place.
//!
//! # Design
//! - [`Model`] is the only coupling to domain types: an id accessor and a
//!   type-level root endpoint.
//! - [`encode_fields`] walks a model through serde and accepts only integer,
//!   boolean, text and byte-string fields.
//! - [`ModelClient`] is stateless; each operation is split into `build_*`
//!   (produces an [`HttpRequest`]) and an executing method that hands the
//!   request to a [`Transport`].
//! - The free functions ([`create`], [`read`], [`read_all`], [`update`],
//!   [`delete`]) use a process-wide client configured from the environment.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod model;
pub mod resolve;
pub mod transport;

pub use client::{
    create, decode_response, default_client, delete, read, read_all, set_default_client, update,
    ModelClient,
};
pub use config::ClientConfig;
pub use encode::encode_fields;
pub use error::{BoxError, EncodeError, ModelError, ModelResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
pub use model::{Collection, Model};
pub use resolve::resolve_root_url;
pub use transport::{Transport, UreqTransport};
