//! CRUD operations mapping models onto RESTful resources.
//!
//! # Design
//! `ModelClient` holds a base URL and a `Transport` and carries no mutable
//! state between calls, so one client can serve any number of threads. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! without I/O and an executing method that sends it and writes the decoded
//! response back into the caller's model.
//!
//! The response is decoded into a fresh value first and only then moved into
//! the caller's model, so a failed call never leaves a half-updated model.
//!
//! | Operation | Method | URL         | Body   |
//! |-----------|--------|-------------|--------|
//! | create    | POST   | `root`      | form   |
//! | read      | GET    | `root/{id}` | none   |
//! | read_all  | GET    | `root`      | none   |
//! | update    | PUT    | `root/{id}` | form   |
//! | delete    | DELETE | `root/{id}` | none   |

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::encode::encode_fields;
use crate::error::{ModelError, ModelResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::model::{Collection, Model};
use crate::resolve::{instance_root_url, resolve_root_url};
use crate::transport::{Transport, UreqTransport};

/// Synchronous, stateless client for model resources.
#[derive(Debug, Clone)]
pub struct ModelClient<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl ModelClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(&config.base_url, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> ModelClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_create<M: Model>(&self, model: &M) -> ModelResult<HttpRequest> {
        let url = self.endpoint(&instance_root_url(model)?);
        let body = encode_fields(model)?;
        Ok(HttpRequest::with_form_body(HttpMethod::Post, url, body))
    }

    pub fn build_read<M: Model>(&self, id: &str, model: &M) -> ModelResult<HttpRequest> {
        let url = self.member_url(&instance_root_url(model)?, id)?;
        Ok(HttpRequest::without_body(HttpMethod::Get, url))
    }

    pub fn build_read_all<C: Collection>(&self) -> ModelResult<HttpRequest> {
        let root = resolve_root_url::<C>()?;
        Ok(HttpRequest::without_body(HttpMethod::Get, self.endpoint(&root)))
    }

    pub fn build_update<M: Model>(&self, model: &M) -> ModelResult<HttpRequest> {
        let url = self.member_url(&instance_root_url(model)?, model.id())?;
        let body = encode_fields(model)?;
        Ok(HttpRequest::with_form_body(HttpMethod::Put, url, body))
    }

    pub fn build_delete<M: Model>(&self, model: &M) -> ModelResult<HttpRequest> {
        let url = self.member_url(&instance_root_url(model)?, model.id())?;
        Ok(HttpRequest::without_body(HttpMethod::Delete, url))
    }

    /// POST the model's fields to its root endpoint and overwrite the model
    /// with the server's copy, including the assigned id.
    pub fn create<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        let request = self.build_create(model)?;
        *model = self.send_and_decode(&request)?;
        Ok(())
    }

    /// GET `root/{id}` into `model`. The model's prior contents only matter
    /// for its root endpoint.
    pub fn read<M: Model>(&self, id: &str, model: &mut M) -> ModelResult<()> {
        let request = self.build_read(id, model)?;
        *model = self.send_and_decode(&request)?;
        Ok(())
    }

    /// GET the element type's root endpoint and replace the whole collection
    /// with the listing, in server order.
    pub fn read_all<C: Collection>(&self, models: &mut C) -> ModelResult<()> {
        let request = self.build_read_all::<C>()?;
        *models = self.send_and_decode(&request)?;
        Ok(())
    }

    /// PUT the model's fields to `root/{id}` and overwrite the model with the
    /// server's copy.
    pub fn update<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        let request = self.build_update(model)?;
        *model = self.send_and_decode(&request)?;
        Ok(())
    }

    /// DELETE `root/{id}`. The response body is discarded.
    pub fn delete<M: Model>(&self, model: &M) -> ModelResult<()> {
        let request = self.build_delete(model)?;
        self.send(&request)?;
        Ok(())
    }

    /// Roots that are already absolute URLs are used as they are.
    fn endpoint(&self, root: &str) -> String {
        let absolute = root.starts_with("http://") || root.starts_with("https://");
        if self.base_url.is_empty() || absolute {
            return root.to_string();
        }
        format!("{}/{}", self.base_url, root.trim_start_matches('/'))
    }

    /// The id is percent-encoded as a single path segment.
    fn member_url(&self, root: &str, id: &str) -> ModelResult<String> {
        if id.is_empty() {
            return Err(ModelError::ContractViolation(
                "operation requires a model with a non-empty id".to_string(),
            ));
        }
        Ok(format!(
            "{}/{}",
            self.endpoint(root).trim_end_matches('/'),
            urlencoding::encode(id)
        ))
    }

    fn send(&self, request: &HttpRequest) -> ModelResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .map_err(|source| ModelError::Transport {
                method: request.method,
                url: request.url.clone(),
                source,
            })?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );
        check_status(request, response)
    }

    fn send_and_decode<D: DeserializeOwned>(&self, request: &HttpRequest) -> ModelResult<D> {
        let response = self.send(request)?;
        decode_response(request, &response)
    }
}

/// Map non-success status codes to the appropriate `ModelError` variant.
fn check_status(request: &HttpRequest, response: HttpResponse) -> ModelResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(
        method = %request.method,
        url = %request.url,
        status = response.status,
        "request was not successful"
    );
    if response.status == 404 {
        return Err(ModelError::NotFound {
            method: request.method,
            url: request.url.clone(),
        });
    }
    Err(ModelError::Status {
        method: request.method,
        url: request.url.clone(),
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

/// Decode a JSON response body into `D`.
pub fn decode_response<D: DeserializeOwned>(
    request: &HttpRequest,
    response: &HttpResponse,
) -> ModelResult<D> {
    serde_json::from_slice(&response.body).map_err(|source| ModelError::Decode {
        method: request.method,
        url: request.url.clone(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Process-wide default client
// ---------------------------------------------------------------------------

static DEFAULT_CLIENT: OnceLock<ModelClient> = OnceLock::new();

/// The shared client behind the crate-level CRUD functions, configured from
/// the environment on first use.
pub fn default_client() -> &'static ModelClient {
    DEFAULT_CLIENT.get_or_init(|| ModelClient::from_config(&ClientConfig::from_env()))
}

/// Install the shared client. Fails, handing the client back, if the default
/// client has already been set or used.
pub fn set_default_client(client: ModelClient) -> Result<(), ModelClient> {
    DEFAULT_CLIENT.set(client)
}

pub fn create<M: Model>(model: &mut M) -> ModelResult<()> {
    default_client().create(model)
}

pub fn read<M: Model>(id: &str, model: &mut M) -> ModelResult<()> {
    default_client().read(id, model)
}

pub fn read_all<C: Collection>(models: &mut C) -> ModelResult<()> {
    default_client().read_all(models)
}

pub fn update<M: Model>(model: &mut M) -> ModelResult<()> {
    default_client().update(model)
}

pub fn delete<M: Model>(model: &M) -> ModelResult<()> {
    default_client().delete(model)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::error::{BoxError, EncodeError};
    use crate::http::FORM_CONTENT_TYPE;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Todo {
        id: String,
        title: String,
        is_completed: bool,
    }

    impl Model for Todo {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_url() -> String {
            "/todos".to_string()
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Priced {
        id: String,
        price: f64,
    }

    impl Model for Priced {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_url() -> String {
            "http://shop.example/items".to_string()
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Unrouted {
        id: String,
    }

    impl Model for Unrouted {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_url() -> String {
            String::new()
        }
    }

    /// Replays canned responses and records every request it is handed.
    #[derive(Default)]
    struct StubTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self::replying_bytes(status, body.as_bytes())
        }

        fn replying_bytes(status: u16, body: &[u8]) -> Self {
            let stub = Self::default();
            stub.push(status, body);
            stub
        }

        fn failing(message: &str) -> Self {
            let stub = Self::default();
            stub.responses.lock().unwrap().push_back(Err(message.to_string()));
            stub
        }

        fn push(&self, status: u16, body: &[u8]) {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                body: body.to_vec(),
            }));
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(message.into()),
                None => Err("no canned response".into()),
            }
        }
    }

    fn client(stub: StubTransport) -> ModelClient<StubTransport> {
        ModelClient::with_transport("http://localhost:3000/", stub)
    }

    fn todo(id: &str, title: &str) -> Todo {
        Todo {
            id: id.to_string(),
            title: title.to_string(),
            is_completed: false,
        }
    }

    #[test]
    fn create_posts_form_and_takes_server_state() {
        let client = client(StubTransport::replying(
            201,
            r#"{"Id":"42","Title":"Buy milk","IsCompleted":false}"#,
        ));
        let mut model = todo("", "Buy milk");

        client.create(&mut model).unwrap();

        assert_eq!(model.id, "42");
        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "http://localhost:3000/todos");
        assert_eq!(
            requests[0].body.as_deref(),
            Some("Id=&Title=Buy+milk&IsCompleted=false")
        );
        assert_eq!(
            requests[0].headers,
            vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())]
        );
    }

    #[test]
    fn unsupported_field_aborts_before_network() {
        let client = client(StubTransport::default());
        let mut model = Priced {
            id: String::new(),
            price: 2.5,
        };

        let err = client.create(&mut model).unwrap_err();

        assert!(matches!(
            err,
            ModelError::Encode(EncodeError::UnsupportedFieldKind { kind: "float", .. })
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn failed_decode_leaves_model_untouched() {
        let client = client(StubTransport::replying(200, "not json"));
        let mut model = todo("7", "Keep me");

        let err = client.update(&mut model).unwrap_err();

        assert!(matches!(err, ModelError::Decode { method: HttpMethod::Put, .. }));
        assert_eq!(model, todo("7", "Keep me"));
    }

    #[test]
    fn read_targets_member_url() {
        let client = client(StubTransport::replying(
            200,
            r#"{"Id":"9","Title":"Read me","IsCompleted":true}"#,
        ));
        let mut model = Todo::default();

        client.read("9", &mut model).unwrap();

        assert_eq!(model.title, "Read me");
        assert!(model.is_completed);
        let requests = client.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "http://localhost:3000/todos/9");
        assert!(requests[0].body.is_none());
        assert!(requests[0].headers.is_empty());
    }

    #[test]
    fn read_not_found_is_classified() {
        let client = client(StubTransport::replying(404, ""));
        let err = client.read("missing", &mut Todo::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_id_is_a_contract_violation() {
        let client = client(StubTransport::default());
        let mut model = Todo::default();

        assert!(matches!(
            client.read("", &mut model).unwrap_err(),
            ModelError::ContractViolation(_)
        ));
        assert!(matches!(
            client.update(&mut model).unwrap_err(),
            ModelError::ContractViolation(_)
        ));
        assert!(matches!(
            client.delete(&model).unwrap_err(),
            ModelError::ContractViolation(_)
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn read_all_replaces_contents_in_server_order() {
        let client = client(StubTransport::replying(
            200,
            concat!(
                r#"[{"Id":"2","Title":"b","IsCompleted":false},"#,
                r#"{"Id":"1","Title":"a","IsCompleted":true}]"#,
            ),
        ));
        let mut models = vec![todo("old", "stale")];

        client.read_all(&mut models).unwrap();

        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(client.transport().requests()[0].url, "http://localhost:3000/todos");
    }

    #[test]
    fn read_all_into_boxed_elements() {
        let client = client(StubTransport::replying(
            200,
            r#"[{"Id":"1","Title":"a","IsCompleted":false}]"#,
        ));
        let mut models: Vec<Box<Todo>> = Vec::new();

        client.read_all(&mut models).unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].title, "a");
    }

    #[test]
    fn update_puts_to_member_url() {
        let client = client(StubTransport::replying(
            200,
            r#"{"Id":"5","Title":"Done","IsCompleted":true}"#,
        ));
        let mut model = todo("5", "Done");
        model.is_completed = true;

        client.update(&mut model).unwrap();

        let requests = client.transport().requests();
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, "http://localhost:3000/todos/5");
        assert_eq!(request.body.as_deref(), Some("Id=5&Title=Done&IsCompleted=true"));
    }

    #[test]
    fn delete_discards_body_and_keeps_model() {
        let client = client(StubTransport::replying(200, "whatever"));
        let model = todo("3", "Bye");

        client.delete(&model).unwrap();

        let requests = client.transport().requests();
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.url, "http://localhost:3000/todos/3");
        assert!(request.body.is_none());
        assert_eq!(model, todo("3", "Bye"));
    }

    #[test]
    fn delete_with_error_status_fails() {
        let client = client(StubTransport::replying(500, "db down"));
        let err = client.delete(&todo("3", "Bye")).unwrap_err();
        assert!(matches!(err, ModelError::Status { status: 500, .. }));
        assert!(err.is_transport());
    }

    #[test]
    fn transport_failure_carries_method_and_url() {
        let client = client(StubTransport::failing("connection refused"));
        let err = client.read("1", &mut Todo::default()).unwrap_err();
        match err {
            ModelError::Transport { method, url, source } => {
                assert_eq!(method, HttpMethod::Get);
                assert_eq!(url, "http://localhost:3000/todos/1");
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn absolute_roots_ignore_base_url() {
        let client = client(StubTransport::default());
        let request = client.build_read("1", &Priced::default()).unwrap();
        assert_eq!(request.url, "http://shop.example/items/1");
    }

    #[test]
    fn ids_are_path_escaped() {
        let client = client(StubTransport::default());
        let request = client.build_delete(&todo("a b/c", "x")).unwrap();
        assert_eq!(request.url, "http://localhost:3000/todos/a%20b%2Fc");
    }

    #[test]
    fn without_base_url_roots_are_used_verbatim() {
        let client = ModelClient::with_transport("", StubTransport::default());
        let request = client.build_read_all::<Vec<Todo>>().unwrap();
        assert_eq!(request.url, "/todos");
    }

    #[test]
    fn delete_ignores_non_utf8_body() {
        let client = client(StubTransport::replying_bytes(200, b"\xff\xfe"));
        let model = todo("1", "Bye");

        client.delete(&model).unwrap();

        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn non_utf8_error_body_is_reported_lossily() {
        let client = client(StubTransport::replying_bytes(500, b"bad \xff"));
        let err = client.delete(&todo("1", "Bye")).unwrap_err();
        match err {
            ModelError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "bad \u{FFFD}");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn every_builder_rejects_an_empty_root_url() {
        let client = client(StubTransport::default());
        let model = Unrouted {
            id: "1".to_string(),
        };
        let is_violation = |result: ModelResult<HttpRequest>| {
            matches!(result, Err(ModelError::ContractViolation(msg)) if msg.contains("Unrouted"))
        };

        assert!(is_violation(client.build_create(&model)));
        assert!(is_violation(client.build_read("1", &model)));
        assert!(is_violation(client.build_read_all::<Vec<Unrouted>>()));
        assert!(is_violation(client.build_update(&model)));
        assert!(is_violation(client.build_delete(&model)));
    }

    #[test]
    fn empty_root_url_aborts_before_network() {
        let client = client(StubTransport::default());
        let mut model = Unrouted::default();

        let err = client.create(&mut model).unwrap_err();

        assert!(matches!(err, ModelError::ContractViolation(_)));
        assert!(client.transport().requests().is_empty());
    }
}
