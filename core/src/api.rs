//! Transport wrapper for the cliente API.
//!
//! # Design
//! `ApiClient` holds the base URL, the session, and a `Transport`. The verb
//! methods build an `HttpRequest` and funnel it through `send`, which is the
//! single interception point: default headers and the bearer token go in on
//! the way out, failures are classified and logged on the way back. Logging
//! never swallows an error; every failure is returned to the caller.

use tracing::{debug, error};

use crate::error::{ApiError, StatusClass};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::transport::{Transport, TransportError};

pub struct ApiClient<T> {
    base_url: String,
    transport: T,
    session: Session,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T, session: Session) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.send(self.request(HttpMethod::Get, path, None))
    }

    pub fn post(&self, path: &str, body: String) -> Result<HttpResponse, ApiError> {
        self.send(self.request(HttpMethod::Post, path, Some(body)))
    }

    pub fn put(&self, path: &str, body: String) -> Result<HttpResponse, ApiError> {
        self.send(self.request(HttpMethod::Put, path, Some(body)))
    }

    pub fn patch(&self, path: &str, body: String) -> Result<HttpResponse, ApiError> {
        self.send(self.request(HttpMethod::Patch, path, Some(body)))
    }

    pub fn delete(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.send(self.request(HttpMethod::Delete, path, None))
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    /// Attach credentials, execute, and classify the outcome.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(token) = self.session.bearer_token() {
            request
                .headers
                .push(("authorization".to_string(), format!("Bearer {token}")));
        }
        debug!(method = %request.method, url = %request.path, "sending request");

        match self.transport.execute(&request) {
            Ok(response) if response.is_success() => {
                debug!(status = response.status, url = %request.path, "response received");
                Ok(response)
            }
            Ok(response) => Err(self.reject(&request, response)),
            Err(TransportError::NoResponse(message)) => {
                error!(
                    url = %request.path,
                    base_url = %self.base_url,
                    error = %message,
                    "network error: could not reach the API, check that the backend is running"
                );
                Err(ApiError::NoResponse {
                    base_url: self.base_url.clone(),
                    message,
                })
            }
            Err(TransportError::Request(message)) => {
                error!(url = %request.path, error = %message, "request error");
                Err(ApiError::Request(message))
            }
        }
    }

    fn reject(&self, request: &HttpRequest, response: HttpResponse) -> ApiError {
        let class = StatusClass::of(response.status);
        error!(
            status = response.status,
            method = %request.method,
            url = %request.path,
            body = %response.body,
            "API error: {}",
            class.describe()
        );
        if class == StatusClass::Unauthorized {
            self.session.redirect_to_login();
        }
        ApiError::from_status(response.status, response.body)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::session::Navigator;

    /// Replays one canned outcome and remembers what was sent.
    struct Canned {
        outcome: RefCell<Option<Result<HttpResponse, TransportError>>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Canned {
        fn status(status: u16, body: &str) -> Self {
            Self::outcome(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }))
        }

        fn outcome(outcome: Result<HttpResponse, TransportError>) -> Self {
            Self {
                outcome: RefCell::new(Some(outcome)),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.borrow_mut().push(request.clone());
            self.outcome.borrow_mut().take().expect("one request per test")
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl Navigator for Recorder {
        fn navigate(&self, route: &str) {
            self.0.borrow_mut().push(route.to_string());
        }
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let transport = Canned::status(200, "[]");
        let api = ApiClient::new("http://localhost:5185/api/", &transport, Session::anonymous());
        api.get("/Clientes").unwrap();
        assert_eq!(transport.sent.borrow()[0].path, "http://localhost:5185/api/Clientes");
    }

    #[test]
    fn token_is_attached_as_bearer() {
        let transport = Canned::status(200, "[]");
        let api = ApiClient::new("http://h", &transport, Session::with_token("abc"));
        api.get("/Clientes").unwrap();
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].header("authorization"), Some("Bearer abc"));
        assert_eq!(sent[0].header("content-type"), None);
    }

    #[test]
    fn anonymous_requests_carry_no_authorization() {
        let transport = Canned::status(201, "{}");
        let api = ApiClient::new("http://h", &transport, Session::anonymous());
        api.post("/Clientes", "{}".to_string()).unwrap();
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].header("authorization"), None);
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[0].body.as_deref(), Some("{}"));
    }

    #[test]
    fn unauthorized_redirects_to_login_and_still_fails() {
        let transport = Canned::status(401, "");
        let recorder = Rc::new(Recorder::default());
        let session = Session::with_token("expired").navigator(recorder.clone());
        let api = ApiClient::new("http://h", &transport, session);

        let err = api.get("/Clientes").unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
        assert_eq!(*recorder.0.borrow(), vec!["/login".to_string()]);
    }

    #[test]
    fn other_statuses_do_not_redirect() {
        for status in [400, 403, 404, 409, 500] {
            let transport = Canned::status(status, "boom");
            let recorder = Rc::new(Recorder::default());
            let api = ApiClient::new(
                "http://h",
                &transport,
                Session::anonymous().navigator(recorder.clone()),
            );
            let err = api.delete("/Clientes/1").unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert!(recorder.0.borrow().is_empty());
        }
    }

    #[test]
    fn no_response_names_the_base_url() {
        let transport = Canned::outcome(Err(TransportError::NoResponse("refused".to_string())));
        let api = ApiClient::new("http://backend:5185/api", &transport, Session::anonymous());
        let err = api.get("/Clientes").unwrap_err();
        match err {
            ApiError::NoResponse { base_url, message } => {
                assert_eq!(base_url, "http://backend:5185/api");
                assert_eq!(message, "refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn construction_errors_are_returned() {
        let transport = Canned::outcome(Err(TransportError::Request("bad uri".to_string())));
        let api = ApiClient::new("http://h", &transport, Session::anonymous());
        let err = api
            .patch("/Clientes/1/status", r#"{"status":"Ativo"}"#.to_string())
            .unwrap_err();
        assert!(matches!(err, ApiError::Request(ref m) if m == "bad uri"));
    }
}
