//! The contract a domain type implements to be persisted by `ModelClient`.
//!
//! # Design
//! The engine needs exactly two things from a type: its identity and the root
//! endpoint of its resource family. The root endpoint is a type-level function
//! so a collection's endpoint can be found without a live instance; the
//! instance accessor defaults to it and can be overridden for resources whose
//! root depends on instance state.
//!
//! Fields are discovered through `Serialize` (for the form body) and
//! `Deserialize` (for the JSON response); nothing else about the type is
//! inspected.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A domain type backed by a RESTful resource.
///
/// ```
/// use rest_model::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Todo {
///     id: String,
///     title: String,
///     is_completed: bool,
/// }
///
/// impl Model for Todo {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn collection_url() -> String {
///         "/todos".to_string()
///     }
/// }
///
/// assert_eq!(Todo::default().root_url(), "/todos");
/// ```
pub trait Model: Serialize + DeserializeOwned {
    /// Server-assigned identifier. Empty until the model has been created.
    fn id(&self) -> &str;

    /// Root endpoint shared by every instance of this type, e.g. `/todos` or
    /// `http://localhost:3000/todos`.
    fn collection_url() -> String;

    /// Root endpoint for this instance.
    fn root_url(&self) -> String {
        Self::collection_url()
    }
}

impl<M: Model> Model for Box<M> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn collection_url() -> String {
        M::collection_url()
    }

    fn root_url(&self) -> String {
        (**self).root_url()
    }
}

/// An ordered sequence of models that a listing can be decoded into.
///
/// Only the element type matters for endpoint resolution; the current
/// contents are replaced wholesale by `read_all`.
pub trait Collection: DeserializeOwned {
    type Element: Model;
}

impl<M: Model> Collection for Vec<M> {
    type Element = M;
}

impl<M: Model> Collection for VecDeque<M> {
    type Element = M;
}
