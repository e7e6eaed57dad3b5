//! Root endpoint resolution for collections.
//!
//! The element type's `collection_url` is looked up through the `Collection`
//! bound, however many `Box` layers wrap it, so no throwaway instance is ever
//! built. Passing something that is not a collection of models is rejected
//! at compile time:
//!
//! ```compile_fail
//! use rest_model::{resolve_root_url, Model};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Todo {
//!     id: String,
//! }
//!
//! impl Model for Todo {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn collection_url() -> String {
//!         "/todos".to_string()
//!     }
//! }
//!
//! // a single model is not a collection
//! let _ = resolve_root_url::<Todo>();
//! ```

use std::any::type_name;

use crate::error::{ModelError, ModelResult};
use crate::model::{Collection, Model};

/// Root endpoint of the resource family `C` holds.
pub fn resolve_root_url<C: Collection>() -> ModelResult<String> {
    checked_root_url(C::Element::collection_url(), type_name::<C::Element>())
}

/// Root endpoint of a single model instance.
pub(crate) fn instance_root_url<M: Model>(model: &M) -> ModelResult<String> {
    checked_root_url(model.root_url(), type_name::<M>())
}

fn checked_root_url(url: String, owner: &str) -> ModelResult<String> {
    if url.trim().is_empty() {
        return Err(ModelError::ContractViolation(format!(
            "{owner} declares an empty root url"
        )));
    }
    Ok(url)
}
